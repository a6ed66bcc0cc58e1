//! Relational store seam
//!
//! Coordinators depend on [`Store`] rather than on a pool so they can be
//! exercised against an in-memory store in tests. [`PgStore`] delegates to the
//! repositories.

use async_trait::async_trait;
use sqlx::PgPool;

use super::repositories::{
    ContestRepository, FeedbackRepository, GroupRepository, ProblemRepository, SubmitRepository,
};
use crate::{
    error::AppResult,
    models::{
        Attitude, Comment, Contest, Group, LastSubmitFilter, NewComment, NewSubmit, Problem,
        Submit, UserId,
    },
};

/// Relational operations needed by the coordination layer
#[async_trait]
pub trait Store: Send + Sync {
    async fn find_group(&self, id: i64) -> AppResult<Option<Group>>;

    async fn find_contest(&self, id: i64) -> AppResult<Option<Contest>>;

    async fn find_problem(&self, id: i64) -> AppResult<Option<Problem>>;

    async fn is_group_member(&self, group_id: i64, user_id: UserId) -> AppResult<bool>;

    async fn is_contest_participant(&self, contest_id: i64, user_id: UserId) -> AppResult<bool>;

    /// Subset of `group_ids` the user belongs to
    async fn member_groups_in(&self, user_id: UserId, group_ids: &[i64]) -> AppResult<Vec<i64>>;

    /// Fails with `AlreadyExists` when the user is already a member
    async fn add_group_member(&self, group_id: i64, user_id: UserId) -> AppResult<()>;

    /// Fails with `AlreadyExists` when the user already participates
    async fn add_contest_participant(&self, contest_id: i64, user_id: UserId) -> AppResult<()>;

    async fn create_submit(&self, submit: NewSubmit) -> AppResult<Submit>;

    async fn last_submit(
        &self,
        user_id: UserId,
        problem_id: i64,
        filter: LastSubmitFilter,
    ) -> AppResult<Option<Submit>>;

    async fn find_submit(&self, id: i64) -> AppResult<Option<Submit>>;

    async fn save_vote(&self, user_id: UserId, problem_id: i64, attitude: Attitude)
        -> AppResult<()>;

    async fn reply_target_exists(
        &self,
        problem_id: i64,
        for_comment: i64,
        to_id: Option<UserId>,
    ) -> AppResult<bool>;

    async fn create_comment(&self, comment: NewComment) -> AppResult<Comment>;
}

/// PostgreSQL-backed store
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Store for PgStore {
    async fn find_group(&self, id: i64) -> AppResult<Option<Group>> {
        GroupRepository::find_by_id(&self.pool, id).await
    }

    async fn find_contest(&self, id: i64) -> AppResult<Option<Contest>> {
        ContestRepository::find_by_id(&self.pool, id).await
    }

    async fn find_problem(&self, id: i64) -> AppResult<Option<Problem>> {
        ProblemRepository::find_by_id(&self.pool, id).await
    }

    async fn is_group_member(&self, group_id: i64, user_id: UserId) -> AppResult<bool> {
        GroupRepository::is_member(&self.pool, group_id, user_id).await
    }

    async fn is_contest_participant(&self, contest_id: i64, user_id: UserId) -> AppResult<bool> {
        ContestRepository::is_participant(&self.pool, contest_id, user_id).await
    }

    async fn member_groups_in(&self, user_id: UserId, group_ids: &[i64]) -> AppResult<Vec<i64>> {
        GroupRepository::member_groups_in(&self.pool, user_id, group_ids).await
    }

    async fn add_group_member(&self, group_id: i64, user_id: UserId) -> AppResult<()> {
        GroupRepository::add_member(&self.pool, group_id, user_id).await
    }

    async fn add_contest_participant(&self, contest_id: i64, user_id: UserId) -> AppResult<()> {
        ContestRepository::add_participant(&self.pool, contest_id, user_id).await
    }

    async fn create_submit(&self, submit: NewSubmit) -> AppResult<Submit> {
        SubmitRepository::create(&self.pool, &submit).await
    }

    async fn last_submit(
        &self,
        user_id: UserId,
        problem_id: i64,
        filter: LastSubmitFilter,
    ) -> AppResult<Option<Submit>> {
        SubmitRepository::find_last(&self.pool, user_id, problem_id, filter).await
    }

    async fn find_submit(&self, id: i64) -> AppResult<Option<Submit>> {
        SubmitRepository::find_by_id(&self.pool, id).await
    }

    async fn save_vote(
        &self,
        user_id: UserId,
        problem_id: i64,
        attitude: Attitude,
    ) -> AppResult<()> {
        FeedbackRepository::upsert_vote(&self.pool, user_id, problem_id, attitude).await
    }

    async fn reply_target_exists(
        &self,
        problem_id: i64,
        for_comment: i64,
        to_id: Option<UserId>,
    ) -> AppResult<bool> {
        FeedbackRepository::reply_target_exists(&self.pool, problem_id, for_comment, to_id).await
    }

    async fn create_comment(&self, comment: NewComment) -> AppResult<Comment> {
        FeedbackRepository::create_comment(&self.pool, &comment).await
    }
}
