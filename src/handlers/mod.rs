//! HTTP Request Handlers
//!
//! This module contains all HTTP request handlers organized by domain.

pub mod contests;
pub mod groups;
pub mod health;
pub mod problems;
pub mod submits;

use axum::{Router, middleware};

use crate::{
    middleware::{auth::auth_middleware, logging::logging_middleware},
    state::AppState,
};

/// Create all API routes. Everything except the health check needs a
/// bearer token.
pub fn routes(state: AppState) -> Router<AppState> {
    let protected = Router::new()
        .nest("/groups", groups::routes())
        .nest("/contests", contests::routes())
        .nest("/problems", problems::routes())
        .nest("/submits", submits::routes())
        .route_layer(middleware::from_fn(logging_middleware))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware));

    Router::new().merge(health::routes()).merge(protected)
}
