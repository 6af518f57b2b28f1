//! API service routes

use auth::{
    models::{LoginCredentials, NewUser, SignupRequest, TokenResponse},
    password,
    validation::{validate_email, validate_login, validate_password, validate_post_text},
};
use axum::{
    Extension, Json, Router,
    body::Bytes,
    extract::{DefaultBodyLimit, Path, State},
    http::{StatusCode, header},
    middleware,
    response::IntoResponse,
    routing::{delete, get, post},
};
use axum_extra::extract::WithRejection;
use common::{database, error::DatabaseError};
use tracing::{error, info, warn};

use crate::{
    error::{ApiError, ApiResult},
    middleware::{AuthUser, auth_middleware},
    models::{CreatePostRequest, HealthResponse, ServiceInfo},
    state::AppState,
};

/// Cache endpoint name of the post listing
pub const LIST_POSTS: &str = "get_posts";

/// Create the router for the API service
pub fn create_router(state: AppState, max_body_bytes: usize) -> Router {
    let protected_routes = Router::new()
        .route("/api/posts", post(add_post).get(get_posts))
        .route("/api/posts/:post_id", delete(remove_post))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .route("/api/signup", post(signup))
        .route("/api/login", post(login))
        .merge(protected_routes)
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .with_state(state)
}

/// Service banner
pub async fn root() -> impl IntoResponse {
    Json(ServiceInfo {
        message: "User posts API",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let database = database::health_check(&state.db_pool)
        .await
        .unwrap_or(false);

    let status = if database {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        Json(HealthResponse {
            status: if database { "ok" } else { "degraded" },
            service: "api-service",
            database,
        }),
    )
}

/// Register a new user and hand out a token
pub async fn signup(
    State(state): State<AppState>,
    WithRejection(Json(payload), _): WithRejection<Json<SignupRequest>, ApiError>,
) -> ApiResult<impl IntoResponse> {
    validate_email(&payload.email)?;
    validate_password(&payload.password)?;

    if state
        .user_repository
        .find_by_email(&payload.email)
        .await?
        .is_some()
    {
        warn!("Signup rejected, email already registered: {}", payload.email);
        return Err(ApiError::EmailTaken);
    }

    let password = payload.password;
    let password_hash = run_blocking(move || password::hash_password(&password)).await??;

    let new_user = NewUser {
        email: payload.email,
        password_hash,
    };
    // A concurrent signup can still win the race to the unique index
    let user = state
        .user_repository
        .create(&new_user)
        .await
        .map_err(|e| match e {
            DatabaseError::Conflict(_) => ApiError::EmailTaken,
            other => ApiError::Database(other),
        })?;

    let token = state.tokens.issue(user.id).await?;
    info!("User {} signed up", user.id);

    Ok((StatusCode::CREATED, Json(TokenResponse { token })))
}

/// Exchange email and password for a token
pub async fn login(
    State(state): State<AppState>,
    WithRejection(Json(payload), _): WithRejection<Json<LoginCredentials>, ApiError>,
) -> ApiResult<impl IntoResponse> {
    validate_login(&payload.email, &payload.password)?;

    let Some(user) = state.user_repository.find_by_email(&payload.email).await? else {
        warn!("Login failed for unknown email");
        return Err(ApiError::Unauthorized);
    };

    let password = payload.password;
    let password_hash = user.password_hash.clone();
    let verified =
        run_blocking(move || password::verify_password(&password, &password_hash)).await?;

    if !verified {
        warn!("Login failed for user {}", user.id);
        return Err(ApiError::Unauthorized);
    }

    let token = state.tokens.issue(user.id).await?;
    info!("User {} logged in", user.id);

    Ok((StatusCode::OK, Json(TokenResponse { token })))
}

/// Create a post for the authenticated user
pub async fn add_post(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    WithRejection(Json(payload), _): WithRejection<Json<CreatePostRequest>, ApiError>,
) -> ApiResult<impl IntoResponse> {
    validate_post_text(&payload.text)?;
    ensure_user_exists(&state, user).await?;

    let post = state.post_repository.create(user.id, &payload.text).await?;
    state.cache.invalidate(user.id, LIST_POSTS).await;

    Ok((StatusCode::CREATED, Json(post)))
}

/// List the authenticated user's posts, served from the cache when fresh
pub async fn get_posts(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<impl IntoResponse> {
    // A cached listing is served before the user check
    if let Some(body) = state.cache.get(user.id, LIST_POSTS).await {
        return Ok(json_bytes(body));
    }

    ensure_user_exists(&state, user).await?;

    let posts = state.post_repository.list_by_user(user.id).await?;
    let body = Bytes::from(serde_json::to_vec(&posts)?);
    state.cache.set(user.id, LIST_POSTS, body.clone()).await;

    Ok(json_bytes(body))
}

/// Delete one of the authenticated user's posts
pub async fn remove_post(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    WithRejection(Path(post_id), _): WithRejection<Path<i64>, ApiError>,
) -> ApiResult<impl IntoResponse> {
    ensure_user_exists(&state, user).await?;

    let post = state
        .post_repository
        .find(post_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Post with id {} not found", post_id)))?;

    if post.user_id != user.id {
        warn!(
            "User {} attempted to delete post {} owned by {}",
            user.id, post_id, post.user_id
        );
        return Err(ApiError::Forbidden);
    }

    state.post_repository.delete(post_id).await?;
    state.cache.invalidate(user.id, LIST_POSTS).await;

    Ok(StatusCode::NO_CONTENT)
}

async fn ensure_user_exists(state: &AppState, user: AuthUser) -> ApiResult<()> {
    if state.user_repository.exists(user.id).await? {
        Ok(())
    } else {
        warn!("Token resolved to missing user {}", user.id);
        Err(ApiError::Unauthorized)
    }
}

fn json_bytes(body: Bytes) -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "application/json")], body)
}

/// Run CPU-bound password work off the async workers
async fn run_blocking<T, F>(f: F) -> ApiResult<T>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f).await.map_err(|e| {
        error!("Blocking task failed: {}", e);
        ApiError::InternalServerError
    })
}
