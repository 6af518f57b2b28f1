//! Authentication models

pub mod user;

// Re-export for convenience
pub use user::{LoginCredentials, NewUser, SignupRequest, TokenResponse, User};
