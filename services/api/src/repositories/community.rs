//! Community feed repository for database operations

use anyhow::Result;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::models::message::DELETED_USER;
use crate::models::{CommunityMessage, CommunityMessageView};

/// How many messages a feed read returns.
pub const FEED_WINDOW: i64 = 30;

/// Community feed repository
#[derive(Clone)]
pub struct CommunityRepository {
    pool: PgPool,
}

impl CommunityRepository {
    /// Create a new community repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Append a message to the feed.
    pub async fn append(&self, author_id: Uuid, content: &str) -> Result<CommunityMessage> {
        let row = sqlx::query(
            r#"
            INSERT INTO community_messages (user_id, content)
            VALUES ($1, $2)
            RETURNING id, user_id, content, created_at
            "#,
        )
        .bind(author_id)
        .bind(content)
        .fetch_one(&self.pool)
        .await?;

        Ok(CommunityMessage {
            id: row.get("id"),
            user_id: row.get("user_id"),
            content: row.get("content"),
            created_at: row.get("created_at"),
        })
    }

    /// The latest messages, newest first, with author usernames resolved.
    /// Messages whose author was deleted show up under the placeholder
    /// name.
    pub async fn latest(&self) -> Result<Vec<CommunityMessageView>> {
        let rows = sqlx::query(
            r#"
            SELECT m.id, COALESCE(u.username, $2) AS username, m.content, m.created_at
            FROM community_messages m
            LEFT JOIN users u ON u.id = m.user_id
            ORDER BY m.created_at DESC
            LIMIT $1
            "#,
        )
        .bind(FEED_WINDOW)
        .bind(DELETED_USER)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| CommunityMessageView {
                id: row.get("id"),
                username: row.get("username"),
                content: row.get("content"),
                timestamp: row.get("created_at"),
            })
            .collect())
    }
}
