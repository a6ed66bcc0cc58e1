//! Submit repository

use sqlx::PgPool;

use crate::{
    constants::verdicts,
    error::AppResult,
    models::{LastSubmitFilter, NewSubmit, Submit, UserId},
};

/// Repository for submit database operations
pub struct SubmitRepository;

impl SubmitRepository {
    /// Create a new pending submission
    pub async fn create(pool: &PgPool, submit: &NewSubmit) -> AppResult<Submit> {
        let row = sqlx::query_as::<_, Submit>(
            r#"
            INSERT INTO submits (user_id, problem_id, language, source_code, status)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(submit.user_id)
        .bind(submit.problem_id)
        .bind(&submit.language)
        .bind(&submit.source_code)
        .bind(verdicts::PENDING)
        .fetch_one(pool)
        .await?;

        Ok(row)
    }

    /// Find submission by ID
    pub async fn find_by_id(pool: &PgPool, id: i64) -> AppResult<Option<Submit>> {
        let row = sqlx::query_as::<_, Submit>(r#"SELECT * FROM submits WHERE id = $1"#)
            .bind(id)
            .fetch_optional(pool)
            .await?;

        Ok(row)
    }

    /// Most recent submission of a user for a problem
    pub async fn find_last(
        pool: &PgPool,
        user_id: UserId,
        problem_id: i64,
        filter: LastSubmitFilter,
    ) -> AppResult<Option<Submit>> {
        let row = sqlx::query_as::<_, Submit>(
            r#"
            SELECT * FROM submits
            WHERE user_id = $1
              AND problem_id = $2
              AND ($3 = FALSE OR status = $4)
              AND ($5 = FALSE OR is_complete = TRUE)
            ORDER BY id DESC
            LIMIT 1
            "#,
        )
        .bind(user_id)
        .bind(problem_id)
        .bind(filter.need_success)
        .bind(verdicts::ACCEPTED)
        .bind(filter.need_complete)
        .fetch_optional(pool)
        .await?;

        Ok(row)
    }
}
