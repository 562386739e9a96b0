//! Community feed routes
//!
//! Reading the feed is plain HTTP; posting happens over the realtime
//! gateway.

use axum::{Extension, Json, extract::State, response::IntoResponse};
use tracing::info;

use crate::error::ApiError;
use crate::jwt::Claims;
use crate::middleware::ensure_online;
use crate::state::AppState;

/// The latest community messages, newest first.
pub async fn get_messages(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    ensure_online(&claims)?;

    if !state
        .rate_limiter
        .is_allowed("community", &claims.sub.to_string())
        .await
    {
        return Err(ApiError::RateLimited);
    }

    let messages = state
        .community_repository
        .latest()
        .await
        .map_err(ApiError::internal)?;

    info!("Fetched {} community messages", messages.len());

    Ok(Json(messages))
}
