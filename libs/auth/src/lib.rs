//! Authentication library for the posts service
//!
//! Provides password hashing, bearer token issuance and verification (opaque
//! and signed), credential validation rules, and access to the users table.

pub mod error;
pub mod jwt;
pub mod models;
pub mod password;
pub mod repositories;
pub mod tokens;
pub mod validation;

pub use error::{AuthError, AuthResult, TokenError};
pub use jwt::{JwtConfig, JwtService};
pub use repositories::UserRepository;
pub use tokens::{BearerToken, OpaqueTokenStore, TokenKind, TokenService};
