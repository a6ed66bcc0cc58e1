//! Group handler implementations

use axum::{
    Json,
    extract::{Path, State},
};
use validator::Validate;

use crate::{
    error::AppResult,
    middleware::auth::AuthenticatedUser,
    models::{Group, InviteToken, JoinResult},
    services::InviteRequest,
    state::AppState,
};

use super::request::JoinRequest;

/// Issue an invitation, or return the live one
pub async fn invite(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Path(id): Path<i64>,
    Json(payload): Json<InviteRequest>,
) -> AppResult<Json<InviteToken>> {
    let token = state.group_invites().invite(auth_user.id, id, payload).await?;
    Ok(Json(token))
}

/// Show the live invitation
pub async fn invite_info(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Path(id): Path<i64>,
) -> AppResult<Json<InviteToken>> {
    let token = state.group_invites().invite_info(auth_user.id, id).await?;
    Ok(Json(token))
}

/// Preview the group behind an invitation
pub async fn join_query(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Path(token): Path<String>,
) -> AppResult<Json<JoinResult<Group>>> {
    let result = state.group_invites().join_query(auth_user.id, &token).await?;
    Ok(Json(result))
}

/// Join the group behind an invitation
pub async fn join(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Path(token): Path<String>,
    Json(payload): Json<JoinRequest>,
) -> AppResult<Json<Group>> {
    payload.validate()?;

    let group = state
        .group_invites()
        .join(auth_user.id, &token, payload.password.as_deref())
        .await?;
    Ok(Json(group))
}
