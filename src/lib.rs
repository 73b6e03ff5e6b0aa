//! Blog posts backend
//!
//! Serves `GET /api/posts`: posts by one or more authors, optionally sorted.
//! The binary in `main.rs` wires configuration, logging and the database
//! around [`build_app`].

pub mod api;
pub mod app;
pub mod config;
pub mod db;
pub mod services;

pub use app::{AppState, build_app};
