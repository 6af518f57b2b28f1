//! HTTP service for user accounts and their posts
//!
//! Exposes signup and login, which hand out bearer tokens, and token
//! protected endpoints to create, list and delete posts. Post listings are
//! cached per user and invalidated on every write.

pub mod config;
pub mod error;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod state;

pub use config::AppConfig;
pub use routes::create_router;
pub use state::AppState;
