//! Contest handler implementations

use axum::{
    Json,
    extract::{Path, State},
};
use validator::Validate;

use crate::{
    error::AppResult,
    handlers::groups::JoinRequest,
    middleware::auth::AuthenticatedUser,
    models::{Contest, InviteToken, JoinResult},
    services::InviteRequest,
    state::AppState,
};

/// Issue an invitation lasting until the contest ends
pub async fn invite(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Path(id): Path<i64>,
    Json(payload): Json<InviteRequest>,
) -> AppResult<Json<InviteToken>> {
    let token = state
        .contest_invites()
        .invite(auth_user.id, id, payload)
        .await?;
    Ok(Json(token))
}

pub async fn invite_info(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Path(id): Path<i64>,
) -> AppResult<Json<InviteToken>> {
    let token = state.contest_invites().invite_info(auth_user.id, id).await?;
    Ok(Json(token))
}

/// Preview the contest behind an invitation; allow-listed callers see
/// `need_password: false`
pub async fn join_query(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Path(token): Path<String>,
) -> AppResult<Json<JoinResult<Contest>>> {
    let result = state
        .contest_invites()
        .join_query(auth_user.id, &token)
        .await?;
    Ok(Json(result))
}

pub async fn join(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Path(token): Path<String>,
    Json(payload): Json<JoinRequest>,
) -> AppResult<Json<Contest>> {
    payload.validate()?;

    let contest = state
        .contest_invites()
        .join(auth_user.id, &token, payload.password.as_deref())
        .await?;
    Ok(Json(contest))
}
