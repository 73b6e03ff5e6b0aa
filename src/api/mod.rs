//! REST API route definitions
//!
//! Everything under `/api` requires an access token; the health endpoints do not.

pub mod error;
pub mod health;
pub mod middleware;
pub mod posts;

pub use error::ApiError;
