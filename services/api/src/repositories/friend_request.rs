//! Friend request repository for database operations
//!
//! Requests only ever exist in the pending state; accepting or declining
//! deletes the row. Acceptance also creates the friendship edge inside the
//! same transaction, so a request that was concurrently declined simply
//! comes back as "not found".

use anyhow::Result;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::models::social::REQUEST_PENDING;
use crate::models::{FriendRequest, Friendship, canonical_pair};

/// Friend request repository
#[derive(Clone)]
pub struct FriendRequestRepository {
    pool: PgPool,
}

impl FriendRequestRepository {
    /// Create a new friend request repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a pending friend request. Callers are expected to have
    /// checked for an existing friendship and a pending request first; the
    /// partial unique index backs those checks up under concurrency.
    pub async fn create(&self, sender_id: Uuid, receiver_id: Uuid) -> Result<FriendRequest> {
        let row = sqlx::query(
            r#"
            INSERT INTO friend_requests (sender_id, receiver_id)
            VALUES ($1, $2)
            RETURNING id, sender_id, receiver_id, status, created_at
            "#,
        )
        .bind(sender_id)
        .bind(receiver_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(request_from_row(&row))
    }

    /// Find the pending request from `sender_id` to `receiver_id`, if any.
    pub async fn find_pending(
        &self,
        sender_id: Uuid,
        receiver_id: Uuid,
    ) -> Result<Option<FriendRequest>> {
        let row = sqlx::query(
            r#"
            SELECT id, sender_id, receiver_id, status, created_at
            FROM friend_requests
            WHERE sender_id = $1 AND receiver_id = $2 AND status = $3
            "#,
        )
        .bind(sender_id)
        .bind(receiver_id)
        .bind(REQUEST_PENDING)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(request_from_row))
    }

    /// Check whether a pending request exists between two users in either
    /// direction.
    pub async fn pending_between(&self, a: Uuid, b: Uuid) -> Result<bool> {
        let (lo, hi) = canonical_pair(a, b);
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM friend_requests
                WHERE LEAST(sender_id, receiver_id) = $1
                  AND GREATEST(sender_id, receiver_id) = $2
                  AND status = $3
            )
            "#,
        )
        .bind(lo)
        .bind(hi)
        .bind(REQUEST_PENDING)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    /// Usernames of everyone with a pending request to `receiver_id`,
    /// oldest first. Drives the notification badge.
    pub async fn pending_received_senders(&self, receiver_id: Uuid) -> Result<Vec<String>> {
        let rows = sqlx::query(
            r#"
            SELECT u.username
            FROM friend_requests fr
            JOIN users u ON u.id = fr.sender_id
            WHERE fr.receiver_id = $1 AND fr.status = $2
            ORDER BY fr.created_at
            "#,
        )
        .bind(receiver_id)
        .bind(REQUEST_PENDING)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|row| row.get("username")).collect())
    }

    /// Whether any pending request is waiting on `receiver_id`.
    pub async fn has_pending_received(&self, receiver_id: Uuid) -> Result<bool> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM friend_requests
                WHERE receiver_id = $1 AND status = $2
            )
            "#,
        )
        .bind(receiver_id)
        .bind(REQUEST_PENDING)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    /// Accept the pending request from `sender_id` to `receiver_id`:
    /// delete the request and create the friendship as one atomic unit.
    /// Returns `None` when no pending request exists anymore, e.g. after a
    /// concurrent decline.
    pub async fn accept(&self, sender_id: Uuid, receiver_id: Uuid) -> Result<Option<Friendship>> {
        let mut tx = self.pool.begin().await?;

        let deleted = sqlx::query(
            r#"
            DELETE FROM friend_requests
            WHERE sender_id = $1 AND receiver_id = $2 AND status = $3
            RETURNING id
            "#,
        )
        .bind(sender_id)
        .bind(receiver_id)
        .bind(REQUEST_PENDING)
        .fetch_optional(&mut *tx)
        .await?;

        if deleted.is_none() {
            tx.rollback().await?;
            return Ok(None);
        }

        let (lo, hi) = canonical_pair(sender_id, receiver_id);
        let row = sqlx::query(
            r#"
            INSERT INTO friendships (user_lo, user_hi)
            VALUES ($1, $2)
            RETURNING id, user_lo, user_hi, created_at
            "#,
        )
        .bind(lo)
        .bind(hi)
        .fetch_one(&mut *tx)
        .await?;

        let friendship = Friendship {
            id: row.get("id"),
            user_lo: row.get("user_lo"),
            user_hi: row.get("user_hi"),
            created_at: row.get("created_at"),
        };

        tx.commit().await?;
        Ok(Some(friendship))
    }

    /// Decline the pending request from `sender_id` to `receiver_id` by
    /// deleting it. Returns false when it no longer exists.
    pub async fn decline(&self, sender_id: Uuid, receiver_id: Uuid) -> Result<bool> {
        let result = sqlx::query(
            r#"
            DELETE FROM friend_requests
            WHERE sender_id = $1 AND receiver_id = $2 AND status = $3
            "#,
        )
        .bind(sender_id)
        .bind(receiver_id)
        .bind(REQUEST_PENDING)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}

fn request_from_row(row: &PgRow) -> FriendRequest {
    FriendRequest {
        id: row.get("id"),
        sender_id: row.get("sender_id"),
        receiver_id: row.get("receiver_id"),
        status: row.get("status"),
        created_at: row.get("created_at"),
    }
}
