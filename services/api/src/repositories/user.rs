//! User repository for database operations

use anyhow::Result;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString};
use chrono::{Duration, Utc};
use rand::Rng;
use rand::distributions::Alphanumeric;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use tracing::info;
use uuid::Uuid;

use crate::models::{NewUser, User};

/// How long an issued password-reset code stays valid.
const RESET_CODE_TTL_MINUTES: i64 = 15;

/// Length of the generated reset code.
const RESET_CODE_LEN: usize = 24;

const USER_COLUMNS: &str = "id, username, email, password_hash, description, is_online, \
     reset_code_hash, reset_code_expires_at, created_at, updated_at";

/// User repository
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    /// Create a new user repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new user with a hashed password and the default description.
    /// New accounts start out online.
    pub async fn create(&self, new_user: &NewUser) -> Result<User> {
        info!("Creating new user: {}", new_user.username);

        let password_hash = hash_secret(&new_user.password)?;

        let row = sqlx::query(&format!(
            r#"
            INSERT INTO users (username, email, password_hash)
            VALUES ($1, $2, $3)
            RETURNING {USER_COLUMNS}
            "#,
        ))
        .bind(&new_user.username)
        .bind(&new_user.email)
        .bind(&password_hash)
        .fetch_one(&self.pool)
        .await?;

        Ok(user_from_row(&row))
    }

    /// Find a user by ID
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<User>> {
        let row = sqlx::query(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1",
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(user_from_row))
    }

    /// Find a user by username
    pub async fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        let row = sqlx::query(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = $1",
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(user_from_row))
    }

    /// Find a user by email
    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let row = sqlx::query(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1",
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(user_from_row))
    }

    /// Verify a user's password
    pub fn verify_password(&self, user: &User, password: &str) -> Result<bool> {
        verify_secret(&user.password_hash, password)
    }

    /// Verify credentials, returning the user on success.
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<Option<User>> {
        let Some(user) = self.find_by_username(username).await? else {
            return Ok(None);
        };

        if self.verify_password(&user, password)? {
            Ok(Some(user))
        } else {
            Ok(None)
        }
    }

    /// Update a user's profile description.
    pub async fn update_description(
        &self,
        user_id: Uuid,
        description: &str,
    ) -> Result<Option<User>> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE users
            SET description = $2, updated_at = now()
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#,
        ))
        .bind(user_id)
        .bind(description)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(user_from_row))
    }

    /// Toggle the online/offline flag.
    pub async fn set_online(&self, user_id: Uuid, online: bool) -> Result<Option<User>> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE users
            SET is_online = $2, updated_at = now()
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#,
        ))
        .bind(user_id)
        .bind(online)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(user_from_row))
    }

    /// Generate and store a hashed reset code with an expiration timestamp.
    /// Returns the plaintext code for delivery; only the hash is persisted.
    pub async fn issue_reset_code(&self, user_id: Uuid) -> Result<Option<String>> {
        let code = generate_reset_code();
        let code_hash = hash_secret(&code)?;
        let expires_at = Utc::now() + Duration::minutes(RESET_CODE_TTL_MINUTES);

        let result = sqlx::query(
            r#"
            UPDATE users
            SET reset_code_hash = $2, reset_code_expires_at = $3, updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .bind(&code_hash)
        .bind(expires_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() > 0 {
            Ok(Some(code))
        } else {
            Ok(None)
        }
    }

    /// Issue a fresh reset code for the account matching both username and
    /// email, replacing any previous one.
    pub async fn request_new_reset_code(
        &self,
        username: &str,
        email: &str,
    ) -> Result<Option<String>> {
        let row = sqlx::query("SELECT id FROM users WHERE username = $1 AND email = $2")
            .bind(username)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => self.issue_reset_code(row.get("id")).await,
            None => Ok(None),
        }
    }

    /// Check that the provided reset code matches the stored hash and has
    /// not expired. A missing code, an expired code, and a wrong code all
    /// produce the same `false`.
    pub async fn validate_reset_code(&self, user_id: Uuid, provided_code: &str) -> Result<bool> {
        let Some(user) = self.find_by_id(user_id).await? else {
            return Ok(false);
        };

        let (Some(code_hash), Some(expires_at)) =
            (user.reset_code_hash, user.reset_code_expires_at)
        else {
            return Ok(false);
        };

        if Utc::now() > expires_at {
            return Ok(false);
        }

        verify_secret(&code_hash, provided_code)
    }

    /// Remove the reset code after a successful password reset, making it
    /// single-use.
    pub async fn clear_reset_code(&self, user_id: Uuid) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET reset_code_hash = NULL, reset_code_expires_at = NULL, updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Drop reset codes whose expiry has passed. Run periodically by the
    /// maintenance job.
    pub async fn clear_expired_reset_codes(&self) -> Result<u64> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET reset_code_hash = NULL, reset_code_expires_at = NULL
            WHERE reset_code_expires_at IS NOT NULL AND reset_code_expires_at < now()
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    /// Replace a user's password with a fresh hash.
    pub async fn update_password(&self, user_id: Uuid, password: &str) -> Result<bool> {
        let password_hash = hash_secret(password)?;

        let result = sqlx::query(
            "UPDATE users SET password_hash = $2, updated_at = now() WHERE id = $1",
        )
        .bind(user_id)
        .bind(&password_hash)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Look up the username registered under an email address.
    pub async fn username_by_email(&self, email: &str) -> Result<Option<String>> {
        let row = sqlx::query("SELECT username FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|row| row.get("username")))
    }

    /// Delete an account and everything that hangs off it, in one
    /// transaction: community messages are anonymized, friend requests,
    /// friendships, and products are removed, then the user row itself.
    /// A failure anywhere rolls the whole thing back.
    pub async fn delete_account(&self, user_id: Uuid) -> Result<bool> {
        let mut tx = self.pool.begin().await?;

        let anonymized = sqlx::query(
            r#"
            UPDATE community_messages
            SET user_id = NULL, content = 'Deleted User: ' || content
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        let requests = sqlx::query(
            "DELETE FROM friend_requests WHERE sender_id = $1 OR receiver_id = $1",
        )
        .bind(user_id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        let friendships = sqlx::query(
            "DELETE FROM friendships WHERE user_lo = $1 OR user_hi = $1",
        )
        .bind(user_id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        let products = sqlx::query("DELETE FROM products WHERE user_id = $1")
            .bind(user_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        let deleted = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(user_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        if deleted == 0 {
            tx.rollback().await?;
            return Ok(false);
        }

        tx.commit().await?;

        info!(
            "Deleted account {}: {} messages anonymized, {} requests, {} friendships, {} products removed",
            user_id, anonymized, requests, friendships, products
        );
        Ok(true)
    }
}

fn user_from_row(row: &PgRow) -> User {
    User {
        id: row.get("id"),
        username: row.get("username"),
        email: row.get("email"),
        password_hash: row.get("password_hash"),
        description: row.get("description"),
        is_online: row.get("is_online"),
        reset_code_hash: row.get("reset_code_hash"),
        reset_code_expires_at: row.get("reset_code_expires_at"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

/// Hash a password or reset code with argon2 and a random salt.
fn hash_secret(secret: &str) -> Result<String> {
    let salt = SaltString::generate(&mut rand::thread_rng());
    let argon2 = Argon2::default();
    let hash = argon2
        .hash_password(secret.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("Failed to hash secret: {}", e))?
        .to_string();
    Ok(hash)
}

fn verify_secret(hash: &str, secret: &str) -> Result<bool> {
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|e| anyhow::anyhow!("Failed to parse stored hash: {}", e))?;

    let argon2 = Argon2::default();
    Ok(argon2.verify_password(secret.as_bytes(), &parsed_hash).is_ok())
}

/// Generate a random alphanumeric reset code.
fn generate_reset_code() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(RESET_CODE_LEN)
        .map(char::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_and_verify_round_trip() {
        let hash = hash_secret("hunter2!").expect("hash");
        assert!(verify_secret(&hash, "hunter2!").expect("verify"));
        assert!(!verify_secret(&hash, "hunter3!").expect("verify"));
    }

    #[test]
    fn hashes_are_salted() {
        let first = hash_secret("same-input").expect("hash");
        let second = hash_secret("same-input").expect("hash");
        assert_ne!(first, second);
    }

    #[test]
    fn reset_codes_are_random_and_sized() {
        let a = generate_reset_code();
        let b = generate_reset_code();
        assert_eq!(a.len(), RESET_CODE_LEN);
        assert_ne!(a, b);
        assert!(a.chars().all(|c| c.is_ascii_alphanumeric()));
    }
}
