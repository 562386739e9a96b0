//! Friendship repository for database operations
//!
//! Friendships are symmetric: every query normalizes its argument pair to
//! the canonical storage order, so callers never need to probe both
//! directions.

use anyhow::Result;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::models::{FriendSummary, Friendship, canonical_pair};

/// Friendship repository
#[derive(Clone)]
pub struct FriendshipRepository {
    pool: PgPool,
}

impl FriendshipRepository {
    /// Create a new friendship repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a friendship edge between two users.
    pub async fn create(&self, a: Uuid, b: Uuid) -> Result<Friendship> {
        if a == b {
            anyhow::bail!("A user cannot befriend themselves");
        }

        let (lo, hi) = canonical_pair(a, b);
        let row = sqlx::query(
            r#"
            INSERT INTO friendships (user_lo, user_hi)
            VALUES ($1, $2)
            RETURNING id, user_lo, user_hi, created_at
            "#,
        )
        .bind(lo)
        .bind(hi)
        .fetch_one(&self.pool)
        .await?;

        Ok(Friendship {
            id: row.get("id"),
            user_lo: row.get("user_lo"),
            user_hi: row.get("user_hi"),
            created_at: row.get("created_at"),
        })
    }

    /// Check whether a friendship exists between two users, in either
    /// argument order.
    pub async fn exists(&self, a: Uuid, b: Uuid) -> Result<bool> {
        let (lo, hi) = canonical_pair(a, b);
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM friendships WHERE user_lo = $1 AND user_hi = $2)",
        )
        .bind(lo)
        .bind(hi)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    /// Delete the friendship between two users, in either argument order.
    pub async fn delete(&self, a: Uuid, b: Uuid) -> Result<bool> {
        let (lo, hi) = canonical_pair(a, b);
        let result = sqlx::query("DELETE FROM friendships WHERE user_lo = $1 AND user_hi = $2")
            .bind(lo)
            .bind(hi)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// List a user's friends, resolving each edge to the other endpoint's
    /// id and username in a single joined query.
    pub async fn list_friends(&self, user_id: Uuid) -> Result<Vec<FriendSummary>> {
        let rows = sqlx::query(
            r#"
            SELECT u.id, u.username
            FROM friendships f
            JOIN users u
              ON u.id = CASE WHEN f.user_lo = $1 THEN f.user_hi ELSE f.user_lo END
            WHERE f.user_lo = $1 OR f.user_hi = $1
            ORDER BY u.username
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| FriendSummary {
                id: row.get("id"),
                username: row.get("username"),
            })
            .collect())
    }
}
