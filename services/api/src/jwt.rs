//! JWT session service
//!
//! Sessions travel in an HTTP-only cookie holding an HS256-signed token
//! with the user's id, username, and cached online flag. The online flag
//! is a snapshot: it gates social endpoints without a database read and is
//! refreshed by the sync-status endpoint and on login.

use anyhow::Result;
use axum_extra::extract::cookie::{Cookie, SameSite};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

use crate::models::User;

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "jwtToken";

/// JWT configuration
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// Shared secret for signing and verifying tokens
    pub secret: String,
    /// Session expiration time in seconds (default: 12 hours)
    pub session_expiry: u64,
}

impl JwtConfig {
    /// Create a new JwtConfig from environment variables
    ///
    /// # Environment Variables
    /// - `JWT_SECRET`: Shared signing secret
    /// - `JWT_SESSION_EXPIRY`: Session expiry in seconds (default: 43200)
    pub fn from_env() -> Result<Self> {
        let secret = std::env::var("JWT_SECRET")
            .map_err(|_| anyhow::anyhow!("JWT_SECRET environment variable not set"))?;

        let session_expiry = std::env::var("JWT_SESSION_EXPIRY")
            .unwrap_or_else(|_| "43200".to_string())
            .parse()
            .unwrap_or(43200);

        Ok(JwtConfig {
            secret,
            session_expiry,
        })
    }
}

/// JWT claims structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User ID
    pub sub: Uuid,
    /// Username
    pub username: String,
    /// Cached online flag; may lag behind the database
    #[serde(rename = "isOnline")]
    pub is_online: bool,
    /// Issued at time
    pub iat: u64,
    /// Expiration time
    pub exp: u64,
}

/// JWT service
#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    config: JwtConfig,
}

impl JwtService {
    /// Initialize a new JWT service
    pub fn new(config: JwtConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());
        let mut validation = Validation::new(jsonwebtoken::Algorithm::HS256);
        validation.validate_exp = true;

        JwtService {
            encoding_key,
            decoding_key,
            validation,
            config,
        }
    }

    /// Issue a session token for a user, snapshotting their online flag.
    pub fn issue_session_token(&self, user: &User) -> Result<String> {
        let now = unix_now()?;

        let claims = Claims {
            sub: user.id,
            username: user.username.clone(),
            is_online: user.is_online,
            iat: now,
            exp: now + self.config.session_expiry,
        };

        self.sign(&claims)
    }

    /// Sign an already-built claims set.
    pub fn sign(&self, claims: &Claims) -> Result<String> {
        let token = encode(
            &Header::new(jsonwebtoken::Algorithm::HS256),
            claims,
            &self.encoding_key,
        )?;
        Ok(token)
    }

    /// Validate a token and return the claims
    pub fn validate_token(&self, token: &str) -> Result<Claims> {
        let token_data = decode::<Claims>(token, &self.decoding_key, &self.validation)?;
        Ok(token_data.claims)
    }

    /// Build the HTTP-only session cookie carrying a token.
    pub fn session_cookie(&self, token: String) -> Cookie<'static> {
        Cookie::build((SESSION_COOKIE, token))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .build()
    }

    /// A cookie matching the session cookie's name and path, for removal.
    pub fn blank_session_cookie(&self) -> Cookie<'static> {
        Cookie::build((SESSION_COOKIE, ""))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .build()
    }

    /// Session expiry in seconds.
    pub fn session_expiry(&self) -> u64 {
        self.config.session_expiry
    }
}

fn unix_now() -> Result<u64> {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| anyhow::anyhow!("Failed to get current time: {}", e))?
        .as_secs();
    Ok(now)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn test_service() -> JwtService {
        JwtService::new(JwtConfig {
            secret: "test-secret".to_string(),
            session_expiry: 43200,
        })
    }

    fn test_user(online: bool) -> User {
        User {
            id: Uuid::new_v4(),
            username: "alice".to_string(),
            email: "alice@example.com".to_string(),
            password_hash: "hash".to_string(),
            description: "hi".to_string(),
            is_online: online,
            reset_code_hash: None,
            reset_code_expires_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn session_token_round_trip() {
        let service = test_service();
        let user = test_user(true);

        let token = service.issue_session_token(&user).expect("issue");
        let claims = service.validate_token(&token).expect("validate");

        assert_eq!(claims.sub, user.id);
        assert_eq!(claims.username, "alice");
        assert!(claims.is_online);
        assert_eq!(claims.exp - claims.iat, 43200);
    }

    #[test]
    fn token_carries_the_cached_online_flag() {
        let service = test_service();
        let token = service
            .issue_session_token(&test_user(false))
            .expect("issue");
        let claims = service.validate_token(&token).expect("validate");
        assert!(!claims.is_online);
    }

    #[test]
    fn expired_token_is_rejected() {
        let service = test_service();
        let claims = Claims {
            sub: Uuid::new_v4(),
            username: "bob".to_string(),
            is_online: true,
            iat: 1_000,
            exp: 2_000,
        };

        let token = service.sign(&claims).expect("sign");
        assert!(service.validate_token(&token).is_err());
    }

    #[test]
    fn token_signed_with_a_different_secret_is_rejected() {
        let service = test_service();
        let other = JwtService::new(JwtConfig {
            secret: "other-secret".to_string(),
            session_expiry: 43200,
        });

        let token = other
            .issue_session_token(&test_user(true))
            .expect("issue");
        assert!(service.validate_token(&token).is_err());
    }

    #[test]
    fn session_cookie_is_http_only_and_lax() {
        let service = test_service();
        let cookie = service.session_cookie("tok".to_string());

        assert_eq!(cookie.name(), SESSION_COOKIE);
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));
        assert_eq!(cookie.path(), Some("/"));
    }
}
