//! Application state shared across handlers

use sqlx::PgPool;

use crate::jwt::JwtService;
use crate::rate_limiter::RateLimiter;
use crate::realtime::Dispatcher;
use crate::repositories::{
    CommunityRepository, FriendRequestRepository, FriendshipRepository, ProductRepository,
    UserRepository,
};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub jwt_service: JwtService,
    pub rate_limiter: RateLimiter,
    pub dispatcher: Dispatcher,
    pub user_repository: UserRepository,
    pub product_repository: ProductRepository,
    pub friendship_repository: FriendshipRepository,
    pub friend_request_repository: FriendRequestRepository,
    pub community_repository: CommunityRepository,
}

impl AppState {
    /// Wire up the state around a database pool and JWT service.
    pub fn new(pool: PgPool, jwt_service: JwtService) -> Self {
        Self {
            jwt_service,
            rate_limiter: RateLimiter::with_default_quotas(),
            dispatcher: Dispatcher::new(),
            user_repository: UserRepository::new(pool.clone()),
            product_repository: ProductRepository::new(pool.clone()),
            friendship_repository: FriendshipRepository::new(pool.clone()),
            friend_request_repository: FriendRequestRepository::new(pool.clone()),
            community_repository: CommunityRepository::new(pool.clone()),
            db_pool: pool,
        }
    }
}
