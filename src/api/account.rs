use axum::{
    Extension, Json,
    extract::{Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use std::sync::Arc;

use super::{
    ApiError, ApiResponse, AppState, ChangePasswordRequest, MessageResponse, ProfileRequest,
    RegisterRequest, ResetFinishRequest, ResetInitRequest, UserDto,
};
use crate::api::validation::{validate_email, validate_login, validate_password};
use crate::constants::account::DEFAULT_LANG_KEY;
use crate::models::user::{NewAccount, Principal, ProfileUpdate};

const RESET_INIT_MESSAGE: &str =
    "If the address belongs to an activated account, a reset key has been issued";
const RESET_FINISH_REJECTED: &str = "No user was found for this reset key";

#[derive(Deserialize)]
pub struct ActivationQuery {
    #[serde(default)]
    pub key: String,
}

fn lang_or_default(lang_key: Option<String>) -> String {
    lang_key
        .filter(|l| !l.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_LANG_KEY.to_string())
}

/// POST /register
pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<ApiResponse<UserDto>>), ApiError> {
    validate_login(&payload.login)?;
    validate_password(&payload.password)?;
    let email = validate_email(&payload.email)?.to_string();

    let user = state
        .account_service()
        .create_user_information(NewAccount {
            login: payload.login,
            password: payload.password,
            first_name: payload.first_name,
            last_name: payload.last_name,
            email,
            lang_key: lang_or_default(payload.lang_key),
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(UserDto::from(user))),
    ))
}

/// GET /activate?key=
pub async fn activate(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ActivationQuery>,
) -> Result<Json<ApiResponse<UserDto>>, ApiError> {
    let user = state
        .account_service()
        .activate_registration(&query.key)
        .await?
        .ok_or_else(|| ApiError::NotFound("No user was found for this activation key".into()))?;

    Ok(Json(ApiResponse::success(UserDto::from(user))))
}

/// GET /account
pub async fn get_account(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
) -> Result<Json<ApiResponse<UserDto>>, ApiError> {
    let user = state
        .account_service()
        .get_user_with_authorities(&principal)
        .await?;

    Ok(Json(ApiResponse::success(UserDto::from(user))))
}

/// POST /account
pub async fn save_account(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    Json(payload): Json<ProfileRequest>,
) -> Result<Json<ApiResponse<UserDto>>, ApiError> {
    let email = validate_email(&payload.email)?.to_string();

    let user = state
        .account_service()
        .update_user_information(
            &principal,
            ProfileUpdate {
                first_name: payload.first_name,
                last_name: payload.last_name,
                email,
                lang_key: lang_or_default(payload.lang_key),
            },
        )
        .await?;

    Ok(Json(ApiResponse::success(UserDto::from(user))))
}

/// POST /account/change_password
pub async fn change_password(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    Json(payload): Json<ChangePasswordRequest>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    validate_password(&payload.password)?;

    state
        .account_service()
        .change_password(&principal, &payload.password)
        .await?;

    Ok(Json(ApiResponse::success(MessageResponse::new(
        "Password updated successfully",
    ))))
}

/// POST /account/reset_password/init
///
/// Answers the same way whether or not the address matched.
pub async fn request_password_reset(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ResetInitRequest>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    state
        .account_service()
        .request_password_reset(payload.email.trim())
        .await?;

    Ok(Json(ApiResponse::success(MessageResponse::new(
        RESET_INIT_MESSAGE,
    ))))
}

/// POST /account/reset_password/finish
pub async fn finish_password_reset(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ResetFinishRequest>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    validate_password(&payload.new_password)?;

    state
        .account_service()
        .complete_password_reset(&payload.new_password, &payload.key)
        .await?
        .ok_or_else(|| ApiError::validation(RESET_FINISH_REJECTED))?;

    Ok(Json(ApiResponse::success(MessageResponse::new(
        "Password has been reset",
    ))))
}
