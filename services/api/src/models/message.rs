//! Community feed message models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Username substituted when a message's author account no longer exists.
pub const DELETED_USER: &str = "Deleted User";

/// Community message entity. `user_id` is NULL once the author deletes
/// their account; the message itself is kept.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CommunityMessage {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// A community message joined with its author's username, as returned
/// to clients.
#[derive(Debug, Clone, Serialize)]
pub struct CommunityMessageView {
    pub id: Uuid,
    pub username: String,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}
