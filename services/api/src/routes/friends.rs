//! Friendship and friend-request routes

use axum::{Extension, Json, extract::State, response::IntoResponse};
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use crate::error::ApiError;
use crate::jwt::Claims;
use crate::middleware::ensure_online;
use crate::realtime::ServerEvent;
use crate::state::AppState;

/// Request naming the other party of a friend operation
#[derive(Deserialize)]
pub struct FriendActionRequest {
    pub friend_username: String,
}

/// Send a friend request.
pub async fn make_request(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<FriendActionRequest>,
) -> Result<impl IntoResponse, ApiError> {
    ensure_online(&claims)?;

    if !state
        .rate_limiter
        .is_allowed("friend-mutate", &claims.sub.to_string())
        .await
    {
        return Err(ApiError::RateLimited);
    }

    let receiver = state
        .user_repository
        .find_by_username(&payload.friend_username)
        .await
        .map_err(ApiError::internal)?
        .ok_or_else(|| ApiError::NotFound("User not found.".to_string()))?;

    if receiver.id == claims.sub {
        return Err(ApiError::Validation(
            "You cannot send a friend request to yourself.".to_string(),
        ));
    }

    if state
        .friendship_repository
        .exists(claims.sub, receiver.id)
        .await
        .map_err(ApiError::internal)?
    {
        return Err(ApiError::Conflict("You are already friends.".to_string()));
    }

    if state
        .friend_request_repository
        .pending_between(claims.sub, receiver.id)
        .await
        .map_err(ApiError::internal)?
    {
        return Err(ApiError::Conflict(
            "A friend request is already pending.".to_string(),
        ));
    }

    state
        .friend_request_repository
        .create(claims.sub, receiver.id)
        .await
        .map_err(ApiError::internal)?;

    info!(
        "User {} sent a friend request to {}",
        claims.username, receiver.username
    );

    state.dispatcher.broadcast(ServerEvent::NewFriendRequest {
        requester: claims.username.clone(),
        receiver: receiver.username,
    });

    Ok(Json(json!({"message": "Friend request sent successfully!"})))
}

/// Accept a pending friend request from the named user.
pub async fn accept_friend(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<FriendActionRequest>,
) -> Result<impl IntoResponse, ApiError> {
    ensure_online(&claims)?;

    if !state
        .rate_limiter
        .is_allowed("friend-mutate", &claims.sub.to_string())
        .await
    {
        return Err(ApiError::RateLimited);
    }

    let friend = state
        .user_repository
        .find_by_username(&payload.friend_username)
        .await
        .map_err(ApiError::internal)?
        .ok_or_else(|| ApiError::NotFound("User not found.".to_string()))?;

    // Accepting re-validates the request inside one transaction; a
    // concurrent decline shows up here as "not found".
    let accepted = state
        .friend_request_repository
        .accept(friend.id, claims.sub)
        .await
        .map_err(ApiError::internal)?;

    if accepted.is_none() {
        return Err(ApiError::NotFound(
            "No pending friend request found.".to_string(),
        ));
    }

    info!(
        "User {} accepted a friend request from {}",
        claims.username, friend.username
    );

    state.dispatcher.broadcast(ServerEvent::NewFriend {
        requester: friend.username.clone(),
        receiver: claims.username.clone(),
    });

    Ok(Json(json!({
        "message": "Friend request accepted successfully!",
        "friend": {"id": friend.id, "username": friend.username},
    })))
}

/// Decline a pending friend request from the named user.
pub async fn decline_friend(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<FriendActionRequest>,
) -> Result<impl IntoResponse, ApiError> {
    ensure_online(&claims)?;

    if !state
        .rate_limiter
        .is_allowed("friend-mutate", &claims.sub.to_string())
        .await
    {
        return Err(ApiError::RateLimited);
    }

    let other = state
        .user_repository
        .find_by_username(&payload.friend_username)
        .await
        .map_err(ApiError::internal)?
        .ok_or_else(|| ApiError::NotFound("User not found.".to_string()))?;

    let declined = state
        .friend_request_repository
        .decline(other.id, claims.sub)
        .await
        .map_err(ApiError::internal)?;

    if !declined {
        return Err(ApiError::NotFound(
            "No pending friend request found.".to_string(),
        ));
    }

    info!(
        "User {} declined a friend request from {}",
        claims.username, other.username
    );

    state.dispatcher.broadcast(ServerEvent::DeclinedFriend {
        requester: other.username,
        receiver: claims.username.clone(),
    });

    Ok(Json(json!({"message": "Friend request declined successfully!"})))
}

/// Remove an existing friendship. Either party can do this unilaterally.
pub async fn remove_friend(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<FriendActionRequest>,
) -> Result<impl IntoResponse, ApiError> {
    ensure_online(&claims)?;

    if !state
        .rate_limiter
        .is_allowed("friend-mutate", &claims.sub.to_string())
        .await
    {
        return Err(ApiError::RateLimited);
    }

    let friend = state
        .user_repository
        .find_by_username(&payload.friend_username)
        .await
        .map_err(ApiError::internal)?
        .ok_or_else(|| ApiError::NotFound("User not found.".to_string()))?;

    let removed = state
        .friendship_repository
        .delete(claims.sub, friend.id)
        .await
        .map_err(ApiError::internal)?;

    if !removed {
        return Err(ApiError::NotFound(
            "You are not friends with this user.".to_string(),
        ));
    }

    info!(
        "Friendship removed: {} -> {}",
        claims.username, friend.username
    );

    state.dispatcher.broadcast(ServerEvent::RemovedFriend {
        remover: claims.username.clone(),
        removed: friend.username,
    });

    Ok(Json(json!({"message": "Friend removed successfully!"})))
}

/// Usernames of everyone with a pending request to the authenticated
/// user.
pub async fn list_friend_requests(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    ensure_online(&claims)?;

    if !state
        .rate_limiter
        .is_allowed("friend-list", &claims.sub.to_string())
        .await
    {
        return Err(ApiError::RateLimited);
    }

    let sender_usernames = state
        .friend_request_repository
        .pending_received_senders(claims.sub)
        .await
        .map_err(ApiError::internal)?;

    Ok(Json(json!({"sender_usernames": sender_usernames})))
}

/// The authenticated user's friend list.
pub async fn list_friends(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    ensure_online(&claims)?;

    if !state
        .rate_limiter
        .is_allowed("friend-list", &claims.sub.to_string())
        .await
    {
        return Err(ApiError::RateLimited);
    }

    let friends = state
        .friendship_repository
        .list_friends(claims.sub)
        .await
        .map_err(ApiError::internal)?;

    info!(
        "Friend list retrieved for {} ({} friends)",
        claims.username,
        friends.len()
    );

    Ok(Json(json!({"friends": friends})))
}
