//! Friendship and friend-request models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Status value a friend request holds while it waits for a decision.
/// Accepted and declined requests are deleted rather than kept around.
pub const REQUEST_PENDING: &str = "pending";

/// A symmetric friendship edge, stored once per pair with the smaller
/// uuid in `user_lo`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Friendship {
    pub id: Uuid,
    pub user_lo: Uuid,
    pub user_hi: Uuid,
    pub created_at: DateTime<Utc>,
}

/// A directed, pending proposal to form a friendship.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct FriendRequest {
    pub id: Uuid,
    pub sender_id: Uuid,
    pub receiver_id: Uuid,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

/// The shape friends take in listing responses.
#[derive(Debug, Clone, Serialize)]
pub struct FriendSummary {
    pub id: Uuid,
    pub username: String,
}

/// Normalize an unordered user pair to its storage order.
///
/// Every friendship query goes through this, so `(a, b)` and `(b, a)`
/// always address the same edge.
pub fn canonical_pair(a: Uuid, b: Uuid) -> (Uuid, Uuid) {
    if a <= b { (a, b) } else { (b, a) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_pair_is_order_independent() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        assert_eq!(canonical_pair(a, b), canonical_pair(b, a));
    }

    #[test]
    fn canonical_pair_puts_the_smaller_id_first() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let (lo, hi) = canonical_pair(a, b);
        assert!(lo <= hi);
    }

    #[test]
    fn canonical_pair_keeps_equal_ids() {
        let a = Uuid::new_v4();
        assert_eq!(canonical_pair(a, a), (a, a));
    }
}
