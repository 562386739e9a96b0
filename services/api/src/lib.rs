//! Linkcart API service
//!
//! A social bookmarking backend: users save product links, organize and
//! favorite them, befriend each other through a request queue, and chat in
//! a community channel with live presence over the realtime gateway.

pub mod error;
pub mod jwt;
pub mod maintenance;
pub mod middleware;
pub mod models;
pub mod rate_limiter;
pub mod realtime;
pub mod repositories;
pub mod routes;
pub mod state;
pub mod validation;
