//! Application services

pub mod auth;
pub mod logging;
pub mod posts;

pub use auth::{AuthConfig, AuthError, AuthService, AuthUser};
pub use logging::init_tracing;
pub use posts::{PostQueryError, PostService};
