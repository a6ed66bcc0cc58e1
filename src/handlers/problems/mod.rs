//! Problem submission and feedback handlers

mod handler;
pub mod request;
pub mod response;

pub use handler::*;
pub use request::*;
pub use response::*;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Problem routes
pub fn routes() -> Router<AppState> {
    Router::new()
        // Grading
        .route("/{id}/submit", post(handler::submit))
        .route("/{id}/lastsubmit", get(handler::last_submit))
        .route("/{id}/result", get(handler::get_result))
        // Feedback
        .route("/{id}/vote", post(handler::vote))
        .route("/{id}/comment", post(handler::comment))
}
