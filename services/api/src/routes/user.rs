//! Current-user routes

use axum::{Extension, Json, extract::State, response::IntoResponse};
use serde_json::json;

use crate::error::ApiError;
use crate::jwt::Claims;
use crate::state::AppState;

/// Who am I, and is anything waiting for me?
pub async fn current_user(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    if !state
        .rate_limiter
        .is_allowed("current-user", &claims.sub.to_string())
        .await
    {
        return Err(ApiError::RateLimited);
    }

    let has_new_requests = state
        .friend_request_repository
        .has_pending_received(claims.sub)
        .await
        .map_err(ApiError::internal)?;

    Ok(Json(json!({
        "user": claims.username,
        "hasNewRequests": has_new_requests,
    })))
}
