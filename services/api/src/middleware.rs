//! Authentication middleware for session-cookie validation

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::CookieJar;
use tracing::warn;

use crate::error::ApiError;
use crate::jwt::{Claims, SESSION_COOKIE};
use crate::state::AppState;

/// Authentication middleware
///
/// Validates the `jwtToken` session cookie and inserts the decoded
/// [`Claims`] into the request extensions for handlers to pick up via
/// `Extension<Claims>`.
pub async fn auth_middleware(
    State(state): State<AppState>,
    jar: CookieJar,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = jar
        .get(SESSION_COOKIE)
        .map(|cookie| cookie.value().to_string())
        .ok_or_else(|| ApiError::Unauthorized("Token is required".to_string()))?;

    let claims = state.jwt_service.validate_token(&token).map_err(|e| {
        warn!("Rejected session token: {}", e);
        ApiError::Unauthorized("Invalid or expired token".to_string())
    })?;

    req.extensions_mut().insert(claims);

    Ok(next.run(req).await)
}

/// Presence gate for social endpoints.
///
/// Reads the cached online flag carried in the session token, not the
/// database; `/auth/sync-status` refreshes the cache.
pub fn ensure_online(claims: &Claims) -> Result<(), ApiError> {
    if claims.is_online {
        Ok(())
    } else {
        warn!("Offline user {} hit a gated endpoint", claims.username);
        Err(ApiError::Offline)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn claims(is_online: bool) -> Claims {
        Claims {
            sub: Uuid::new_v4(),
            username: "alice".to_string(),
            is_online,
            iat: 0,
            exp: u64::MAX,
        }
    }

    #[test]
    fn online_sessions_pass_the_gate() {
        assert!(ensure_online(&claims(true)).is_ok());
    }

    #[test]
    fn offline_sessions_are_rejected() {
        assert!(matches!(ensure_online(&claims(false)), Err(ApiError::Offline)));
    }
}
