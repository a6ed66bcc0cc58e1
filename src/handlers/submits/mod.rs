//! Submission lookup

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::get,
};

use crate::{
    error::AppResult, handlers::problems::SubmitResponse, middleware::auth::AuthenticatedUser,
    state::AppState,
};

/// Submit routes
pub fn routes() -> Router<AppState> {
    Router::new().route("/{id}", get(get_submit))
}

/// Get one of the caller's submissions
async fn get_submit(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Path(id): Path<i64>,
) -> AppResult<Json<SubmitResponse>> {
    let submit = state.submissions().get_submit(auth_user.id, id).await?;
    Ok(Json(submit.into()))
}
