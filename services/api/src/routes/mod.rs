//! API routes

pub mod auth;
pub mod community;
pub mod friends;
pub mod products;
pub mod profile;
pub mod user;

use axum::{
    Json, Router,
    http::{HeaderValue, Method, header},
    middleware,
    response::IntoResponse,
    routing::{delete, get, post, put},
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::middleware::auth_middleware;
use crate::realtime;
use crate::state::AppState;

/// Create the router for the Linkcart API service
pub fn create_router(state: AppState) -> Router {
    let protected_routes = Router::new()
        .route("/auth/sync-status", get(auth::sync_status))
        .route("/products", get(products::list_products))
        .route("/products/submit-product", post(products::submit_product))
        .route("/products/edit-product", put(products::edit_product))
        .route("/products/favorite-product", put(products::favorite_product))
        .route("/products/delete-product", delete(products::delete_product))
        .route("/profile/delete", post(profile::delete_account))
        .route("/profile/:username", get(profile::view_profile))
        .route(
            "/profile/:username/edit-description",
            post(profile::edit_description),
        )
        .route("/friends", get(friends::list_friends))
        .route("/friends/friend-requests", get(friends::list_friend_requests))
        .route("/friends/make-request", post(friends::make_request))
        .route("/friends/accept-friend", post(friends::accept_friend))
        .route("/friends/decline-friend", post(friends::decline_friend))
        .route("/friends/remove-friend", post(friends::remove_friend))
        .route("/community/messages", get(community::get_messages))
        .route("/user/current-user", get(user::current_user))
        .route("/ws", get(realtime::ws_handler))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .route("/health", get(health_check))
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout))
        .route("/auth/request-reset-code", post(auth::request_reset_code))
        .route("/auth/reset-password", post(auth::reset_password))
        .route("/auth/request-username", post(auth::request_username))
        .merge(protected_routes)
        .layer(cors_layer())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "linkcart-api"
    }))
}

/// CORS for the browser client. The session travels in a cookie, so the
/// origin must be explicit and credentials allowed.
fn cors_layer() -> CorsLayer {
    let origin = std::env::var("FRONTEND_ORIGIN")
        .unwrap_or_else(|_| "http://localhost:3000".to_string());
    let origin = origin
        .parse::<HeaderValue>()
        .unwrap_or_else(|_| HeaderValue::from_static("http://localhost:3000"));

    CorsLayer::new()
        .allow_origin(origin)
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE])
}
