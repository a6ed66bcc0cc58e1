//! Contest invitation handlers

mod handler;

pub use handler::*;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Contest routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/{id}/invite", post(handler::invite).get(handler::invite_info))
        .route("/join/{token}", get(handler::join_query).post(handler::join))
}
