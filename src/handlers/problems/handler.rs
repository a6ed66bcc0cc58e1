//! Problem handler implementations

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use validator::Validate;

use crate::{
    error::AppResult,
    middleware::auth::AuthenticatedUser,
    models::Comment,
    services::SubmissionTicket,
    state::AppState,
};

use super::{
    request::{CommentRequest, LastSubmitQuery, SubmitRequest, VoteRequest},
    response::SubmitResponse,
};

/// Submit a solution
pub async fn submit(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Path(problem_id): Path<i64>,
    Json(payload): Json<SubmitRequest>,
) -> AppResult<(StatusCode, Json<SubmitResponse>)> {
    payload.validate()?;

    let ticket = SubmissionTicket {
        problem_id,
        language: payload.language,
        source_code: payload.source_code,
    };
    let submit = state.submissions().submit(auth_user.id, ticket).await?;

    Ok((StatusCode::CREATED, Json(submit.into())))
}

/// Latest submission, optionally only accepted or graded ones
pub async fn last_submit(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Path(problem_id): Path<i64>,
    Query(query): Query<LastSubmitQuery>,
) -> AppResult<Json<SubmitResponse>> {
    let submit = state
        .submissions()
        .last_submit(auth_user.id, problem_id, query.into())
        .await?;
    Ok(Json(submit.into()))
}

/// Collect the grading result; answers 202 while grading is running
pub async fn get_result(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Path(problem_id): Path<i64>,
) -> AppResult<Json<serde_json::Value>> {
    let result = state
        .submissions()
        .get_result(auth_user.id, problem_id)
        .await?;
    Ok(Json(result))
}

pub async fn vote(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Path(problem_id): Path<i64>,
    Json(payload): Json<VoteRequest>,
) -> AppResult<StatusCode> {
    state
        .feedback()
        .vote(auth_user.id, problem_id, payload.attitude)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn comment(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Path(problem_id): Path<i64>,
    Json(payload): Json<CommentRequest>,
) -> AppResult<(StatusCode, Json<Comment>)> {
    payload.validate()?;

    let comment = state
        .feedback()
        .comment(
            auth_user.id,
            problem_id,
            payload.content,
            payload.to_id,
            payload.for_comment,
        )
        .await?;
    Ok((StatusCode::CREATED, Json(comment)))
}
