//! Profile routes

use axum::{
    Extension, Json,
    extract::{Path, State},
    response::IntoResponse,
};
use axum_extra::extract::CookieJar;
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use crate::error::ApiError;
use crate::jwt::Claims;
use crate::middleware::ensure_online;
use crate::models::ProductView;
use crate::state::AppState;
use crate::validation::validate_description;

/// Request for editing a profile description
#[derive(Deserialize)]
pub struct EditDescriptionRequest {
    pub description: String,
}

/// Fetch a profile: the target's public details, their favorited
/// products, and how the viewer relates to them (friend, pending request
/// in either direction).
pub async fn view_profile(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(username): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    ensure_online(&claims)?;

    if !state
        .rate_limiter
        .is_allowed("profile-view", &claims.sub.to_string())
        .await
    {
        return Err(ApiError::RateLimited);
    }

    let target = state
        .user_repository
        .find_by_username(&username)
        .await
        .map_err(ApiError::internal)?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    let mut is_friend = false;
    let mut sent_request = false;
    let mut received_request = false;

    if target.id != claims.sub {
        if state
            .friendship_repository
            .exists(target.id, claims.sub)
            .await
            .map_err(ApiError::internal)?
        {
            is_friend = true;
        } else if state
            .friend_request_repository
            .find_pending(claims.sub, target.id)
            .await
            .map_err(ApiError::internal)?
            .is_some()
        {
            sent_request = true;
        } else if state
            .friend_request_repository
            .find_pending(target.id, claims.sub)
            .await
            .map_err(ApiError::internal)?
            .is_some()
        {
            received_request = true;
        }
    }

    let favorites = state
        .product_repository
        .favorited_products(target.id)
        .await
        .map_err(ApiError::internal)?;
    let favorites: Vec<ProductView> = favorites.into_iter().map(Into::into).collect();

    Ok(Json(json!({
        "favoriteProducts": favorites,
        "user": {
            "username": target.username,
            "description": target.description,
        },
        "isFriend": is_friend,
        "sentRequest": sent_request,
        "receivedRequest": received_request,
    })))
}

/// Edit the authenticated user's own profile description.
pub async fn edit_description(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(username): Path<String>,
    Json(payload): Json<EditDescriptionRequest>,
) -> Result<impl IntoResponse, ApiError> {
    ensure_online(&claims)?;

    if !state
        .rate_limiter
        .is_allowed("profile-edit", &claims.sub.to_string())
        .await
    {
        return Err(ApiError::RateLimited);
    }

    let target = state
        .user_repository
        .find_by_username(&username)
        .await
        .map_err(ApiError::internal)?;

    let owns_profile = target.map(|user| user.id == claims.sub).unwrap_or(false);
    if !owns_profile {
        return Err(ApiError::Forbidden(
            "You can only edit your own description".to_string(),
        ));
    }

    validate_description(&payload.description).map_err(ApiError::Validation)?;

    let updated = state
        .user_repository
        .update_description(claims.sub, &payload.description)
        .await
        .map_err(ApiError::internal)?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    info!("User {} updated their description", claims.username);

    Ok(Json(json!({
        "message": "Description updated successfully!",
        "description": updated.description,
    })))
}

/// Delete the authenticated user's account and everything attached to it.
pub async fn delete_account(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    jar: CookieJar,
) -> Result<impl IntoResponse, ApiError> {
    if !state
        .rate_limiter
        .is_allowed("account-delete", &claims.sub.to_string())
        .await
    {
        return Err(ApiError::RateLimited);
    }

    let deleted = state
        .user_repository
        .delete_account(claims.sub)
        .await
        .map_err(ApiError::internal)?;

    if !deleted {
        return Err(ApiError::NotFound("User not found".to_string()));
    }

    info!("User {} deleted their account", claims.username);

    let jar = jar.remove(state.jwt_service.blank_session_cookie());
    Ok((
        jar,
        Json(json!({"message": "User account deleted successfully."})),
    ))
}
