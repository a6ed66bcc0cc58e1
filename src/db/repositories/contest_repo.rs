//! Contest repository

use sqlx::PgPool;

use crate::{
    error::AppResult,
    models::{Contest, UserId},
};

/// Repository for contest database operations
pub struct ContestRepository;

impl ContestRepository {
    /// Find contest by ID
    pub async fn find_by_id(pool: &PgPool, id: i64) -> AppResult<Option<Contest>> {
        let contest = sqlx::query_as::<_, Contest>(r#"SELECT * FROM contests WHERE id = $1"#)
            .bind(id)
            .fetch_optional(pool)
            .await?;

        Ok(contest)
    }

    /// Check if user is registered for contest
    pub async fn is_participant(
        pool: &PgPool,
        contest_id: i64,
        user_id: UserId,
    ) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar(
            r#"SELECT EXISTS(SELECT 1 FROM user_in_contest WHERE contest_id = $1 AND user_id = $2)"#,
        )
        .bind(contest_id)
        .bind(user_id)
        .fetch_one(pool)
        .await?;

        Ok(exists)
    }

    /// Register a participant
    pub async fn add_participant(pool: &PgPool, contest_id: i64, user_id: UserId) -> AppResult<()> {
        sqlx::query(r#"INSERT INTO user_in_contest (user_id, contest_id) VALUES ($1, $2)"#)
            .bind(user_id)
            .bind(contest_id)
            .execute(pool)
            .await?;

        Ok(())
    }
}
