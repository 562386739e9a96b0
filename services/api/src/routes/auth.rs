//! Authentication and account-recovery routes

use axum::{Extension, Json, extract::State, response::IntoResponse};
use axum_extra::extract::CookieJar;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info, warn};

use crate::error::ApiError;
use crate::jwt::Claims;
use crate::models::NewUser;
use crate::state::AppState;
use crate::validation::{validate_email, validate_password, validate_username};

/// Request for user registration
#[derive(Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Request for user login
#[derive(Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Request for a password-reset code
#[derive(Deserialize)]
pub struct RequestResetCodeRequest {
    pub username: String,
    pub email: String,
}

/// Request to reset a password with a previously issued code
#[derive(Deserialize)]
pub struct ResetPasswordRequest {
    pub username: String,
    #[serde(rename = "resetCode")]
    pub reset_code: String,
    #[serde(rename = "newPassword")]
    pub new_password: String,
}

/// Request for a username reminder
#[derive(Deserialize)]
pub struct RequestUsernameRequest {
    pub email: String,
}

/// User registration endpoint
pub async fn register(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(payload): Json<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if !state.rate_limiter.is_allowed("auth", &payload.username).await {
        return Err(ApiError::RateLimited);
    }

    validate_username(&payload.username).map_err(ApiError::Validation)?;
    validate_email(&payload.email).map_err(ApiError::Validation)?;
    validate_password(&payload.password).map_err(ApiError::Validation)?;

    if state
        .user_repository
        .find_by_username(&payload.username)
        .await
        .map_err(ApiError::internal)?
        .is_some()
    {
        warn!("Registration failed: username {} already in use", payload.username);
        return Err(ApiError::Conflict(
            "This username is already in use, please use another.".to_string(),
        ));
    }

    if state
        .user_repository
        .find_by_email(&payload.email)
        .await
        .map_err(ApiError::internal)?
        .is_some()
    {
        warn!("Registration failed: email already in use");
        return Err(ApiError::Conflict(
            "This email is already in use, please use another.".to_string(),
        ));
    }

    let user = state
        .user_repository
        .create(&NewUser {
            username: payload.username,
            email: payload.email,
            password: payload.password,
        })
        .await
        .map_err(ApiError::internal)?;

    let token = state
        .jwt_service
        .issue_session_token(&user)
        .map_err(ApiError::internal)?;

    info!("User {} registered successfully", user.username);

    let jar = jar.add(state.jwt_service.session_cookie(token));
    Ok((
        jar,
        Json(json!({
            "message": "Logged in successfully",
            "username": user.username,
        })),
    ))
}

/// User login endpoint
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if !state.rate_limiter.is_allowed("auth", &payload.username).await {
        return Err(ApiError::RateLimited);
    }

    let user = state
        .user_repository
        .authenticate(&payload.username, &payload.password)
        .await
        .map_err(ApiError::internal)?
        .ok_or_else(|| ApiError::Unauthorized("Invalid credentials".to_string()))?;

    let token = state
        .jwt_service
        .issue_session_token(&user)
        .map_err(ApiError::internal)?;

    info!("User {} logged in", user.username);

    let jar = jar.add(state.jwt_service.session_cookie(token));
    Ok((
        jar,
        Json(json!({
            "message": "Logged in successfully",
            "username": user.username,
        })),
    ))
}

/// Logout endpoint: drops the session cookie.
pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> impl IntoResponse {
    info!("User logged out");
    let jar = jar.remove(state.jwt_service.blank_session_cookie());
    (jar, Json(json!({"message": "Logged out successfully"})))
}

/// Issue a password-reset code.
///
/// Delivery is the outbound-mail boundary's job; here the code is handed
/// to the log at debug level. The response does not reveal whether the
/// account exists.
pub async fn request_reset_code(
    State(state): State<AppState>,
    Json(payload): Json<RequestResetCodeRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if !state
        .rate_limiter
        .is_allowed("password-reset", &payload.username)
        .await
    {
        return Err(ApiError::RateLimited);
    }

    let code = state
        .user_repository
        .request_new_reset_code(&payload.username, &payload.email)
        .await
        .map_err(ApiError::internal)?;

    match code {
        Some(code) => {
            info!("Issued password reset code for {}", payload.username);
            debug!("Reset code for {} <{}>: {}", payload.username, payload.email, code);
        }
        None => {
            warn!("Reset code requested for unknown account");
        }
    }

    Ok(Json(json!({
        "message": "If the account exists, a reset code has been sent to its email"
    })))
}

/// Reset a password with a previously issued code. Codes are single-use:
/// the stored code is cleared before the new password lands.
pub async fn reset_password(
    State(state): State<AppState>,
    Json(payload): Json<ResetPasswordRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if !state
        .rate_limiter
        .is_allowed("password-reset", &payload.username)
        .await
    {
        return Err(ApiError::RateLimited);
    }

    let user = state
        .user_repository
        .find_by_username(&payload.username)
        .await
        .map_err(ApiError::internal)?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    let valid = state
        .user_repository
        .validate_reset_code(user.id, &payload.reset_code)
        .await
        .map_err(ApiError::internal)?;

    if !valid {
        warn!("Rejected reset code for {}", user.username);
        return Err(ApiError::Unauthorized("Invalid reset code".to_string()));
    }

    validate_password(&payload.new_password).map_err(ApiError::Validation)?;

    if !state
        .user_repository
        .clear_reset_code(user.id)
        .await
        .map_err(ApiError::internal)?
    {
        return Err(ApiError::InternalServerError);
    }

    if !state
        .user_repository
        .update_password(user.id, &payload.new_password)
        .await
        .map_err(ApiError::internal)?
    {
        return Err(ApiError::InternalServerError);
    }

    info!("Password reset for {}", user.username);
    Ok(Json(json!({"message": "Password has been successfully reset"})))
}

/// Username recovery by email. Same external-delivery model as the reset
/// code, same non-committal response.
pub async fn request_username(
    State(state): State<AppState>,
    Json(payload): Json<RequestUsernameRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if !state
        .rate_limiter
        .is_allowed("password-reset", &payload.email)
        .await
    {
        return Err(ApiError::RateLimited);
    }

    let username = state
        .user_repository
        .username_by_email(&payload.email)
        .await
        .map_err(ApiError::internal)?;

    match username {
        Some(username) => {
            info!("Username reminder issued for {}", username);
            debug!("Username for <{}>: {}", payload.email, username);
        }
        None => {
            warn!("Username reminder requested for unknown email");
        }
    }

    Ok(Json(json!({
        "message": "If the account exists, the username has been sent to its email"
    })))
}

/// Refresh the session cookie from the authoritative online flag in the
/// database. This is the reconciliation point for the cached presence
/// flag.
pub async fn sync_status(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    jar: CookieJar,
) -> Result<impl IntoResponse, ApiError> {
    let user = state
        .user_repository
        .find_by_username(&claims.username)
        .await
        .map_err(ApiError::internal)?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    let token = state
        .jwt_service
        .issue_session_token(&user)
        .map_err(ApiError::internal)?;

    debug!(
        "Synced online status for {}: {}",
        user.username, user.is_online
    );

    let jar = jar.add(state.jwt_service.session_cookie(token));
    Ok((jar, Json(json!({"isOnline": user.is_online}))))
}
