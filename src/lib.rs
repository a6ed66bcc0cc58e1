//! CodeArena - contest and judge backend
//!
//! This library provides the coordination layer of the CodeArena platform:
//! the short-lived state kept in the cache next to the relational store.
//!
//! # Features
//!
//! - Invitation tokens for groups and contests, one live token per resource
//! - Submission tracking with at most one grading in flight per problem
//! - Grading hand-off to out-of-process workers over a Redis stream
//! - Grading results handed out exactly once
//!
//! # Architecture
//!
//! The application follows a layered architecture:
//! - **Handlers**: HTTP request handlers (thin layer)
//! - **Services**: Gateways and coordinators
//! - **Cache / Dispatch**: Redis-backed key store and task queue
//! - **Repositories**: Database access behind the `Store` trait
//! - **Models**: Domain models and DTOs

pub mod cache;
pub mod config;
pub mod constants;
pub mod db;
pub mod dispatch;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
pub mod state;

#[cfg(test)]
pub(crate) mod test_utils;

use axum::Router;

// Re-export commonly used types
pub use config::Config;
pub use error::{AppError, AppResult};
pub use state::AppState;

/// Build the API router over the given state
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest(constants::API_BASE_PATH, handlers::routes(state.clone()))
        .with_state(state)
}
