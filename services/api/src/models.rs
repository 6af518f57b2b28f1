//! API models for request and response payloads

use serde::Serialize;

pub mod post;

pub use post::{CreatePostRequest, Post};

/// Response for the service banner
#[derive(Debug, Serialize)]
pub struct ServiceInfo {
    pub message: &'static str,
    pub version: &'static str,
}

/// Response for the health endpoint
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub database: bool,
}
