//! Authentication middleware for bearer token validation

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};
use tracing::warn;

use crate::{error::ApiError, state::AppState};

/// Authenticated user information
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthUser {
    pub id: i64,
}

/// Authentication middleware
///
/// Resolves `Authorization: Bearer <token>` to a user id and stores an
/// [`AuthUser`] in the request extensions. Every failure is reported as the
/// same unauthorized response.
pub async fn auth_middleware(
    State(state): State<AppState>,
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let Some(TypedHeader(Authorization(bearer))) = bearer else {
        warn!("Missing or malformed Authorization header");
        return Err(ApiError::Unauthorized);
    };

    let user_id = state
        .tokens
        .verify(bearer.token())
        .await
        .map_err(|_| ApiError::Unauthorized)?;

    // Insert the user into the request extensions
    req.extensions_mut().insert(AuthUser { id: user_id });

    Ok(next.run(req).await)
}
