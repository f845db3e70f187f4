use axum::{
    Json,
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::IntoResponse,
};
use serde::Deserialize;
use std::sync::Arc;
use tower_sessions::Session;

use super::{ApiError, ApiResponse, AppState, MessageResponse, UserDto};
use crate::constants::{roles, session as session_keys};
use crate::models::user::Principal;

#[derive(Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

// ============================================================================
// Middleware
// ============================================================================

/// Resolves the session login to an account holding `ROLE_USER` and hands the
/// handlers a [`Principal`] through the request extensions.
pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    session: Session,
    mut request: Request,
    next: Next,
) -> Result<impl IntoResponse, ApiError> {
    let Some(login) = session
        .get::<String>(session_keys::USER_KEY)
        .await
        .map_err(|e| ApiError::internal(format!("Session error: {e}")))?
    else {
        return Err(ApiError::Unauthorized("Not authenticated".to_string()));
    };

    let principal = Principal::new(login);
    let user = state
        .account_service()
        .get_user_with_authorities(&principal)
        .await?;

    if !user.has_authority(roles::USER) {
        return Err(ApiError::Forbidden(format!("Requires {}", roles::USER)));
    }

    tracing::Span::current().record("user_id", principal.login());
    request.extensions_mut().insert(principal);
    Ok(next.run(request).await)
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /authenticate
pub async fn authenticate(
    State(state): State<Arc<AppState>>,
    session: Session,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<ApiResponse<UserDto>>, ApiError> {
    if payload.username.is_empty() {
        return Err(ApiError::validation("Username is required"));
    }
    if payload.password.is_empty() {
        return Err(ApiError::validation("Password is required"));
    }

    let user = state
        .account_service()
        .authenticate(&payload.username, &payload.password)
        .await?;

    session
        .cycle_id()
        .await
        .map_err(|e| ApiError::internal(format!("Failed to rotate session: {e}")))?;
    session
        .insert(session_keys::USER_KEY, &user.login)
        .await
        .map_err(|e| ApiError::internal(format!("Failed to create session: {e}")))?;

    tracing::info!(event = "login_succeeded", login = %user.login, "User authenticated");

    Ok(Json(ApiResponse::success(UserDto::from(user))))
}

/// POST /logout
pub async fn logout(session: Session) -> impl IntoResponse {
    let _ = session.flush().await;
    (
        StatusCode::OK,
        Json(ApiResponse::success(MessageResponse::new("Logged out"))),
    )
}
