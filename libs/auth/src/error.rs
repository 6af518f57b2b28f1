//! Error types for credential handling and token verification

use common::error::DatabaseError;
use thiserror::Error;

/// Failures while issuing credentials or tokens
#[derive(Error, Debug)]
pub enum AuthError {
    /// Password hashing failed
    #[error("Failed to hash password: {0}")]
    Hashing(String),

    /// A signed token could not be produced
    #[error("Failed to sign token: {0}")]
    Signing(#[from] jsonwebtoken::errors::Error),

    /// System clock is before the unix epoch
    #[error("Failed to get current time: {0}")]
    Clock(#[from] std::time::SystemTimeError),

    /// Storage failure
    #[error(transparent)]
    Database(#[from] DatabaseError),
}

/// Reasons a bearer token was rejected
///
/// Callers at the HTTP boundary must not surface the variant; every case
/// becomes the same unauthorized response.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    /// Not a registered opaque token and not shaped like a signed one
    #[error("Unknown token")]
    Unknown,

    /// Signed token failed signature or claim checks
    #[error("Malformed or tampered token")]
    Malformed,

    /// Signed token is past its expiry
    #[error("Token expired")]
    Expired,
}

/// Type alias for Result with AuthError
pub type AuthResult<T> = Result<T, AuthError>;
