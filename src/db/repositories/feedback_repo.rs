//! Comment and vote repository

use sqlx::PgPool;

use crate::{
    error::AppResult,
    models::{Attitude, Comment, NewComment, UserId},
};

/// Repository for problem feedback
pub struct FeedbackRepository;

impl FeedbackRepository {
    /// Insert or replace the user's vote on a problem
    pub async fn upsert_vote(
        pool: &PgPool,
        user_id: UserId,
        problem_id: i64,
        attitude: Attitude,
    ) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO problem_votes (user_id, problem_id, attitude)
            VALUES ($1, $2, $3)
            ON CONFLICT (user_id, problem_id)
            DO UPDATE SET attitude = EXCLUDED.attitude, updated_at = NOW()
            "#,
        )
        .bind(user_id)
        .bind(problem_id)
        .bind(attitude.as_str())
        .execute(pool)
        .await?;

        Ok(())
    }

    /// Check that a thread exists on the problem and, when given, that `to_id`
    /// wrote its root or one of its replies
    pub async fn reply_target_exists(
        pool: &PgPool,
        problem_id: i64,
        for_comment: i64,
        to_id: Option<UserId>,
    ) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM comments
                WHERE problem_id = $1
                  AND (id = $2 OR for_comment = $2)
                  AND ($3::BIGINT IS NULL OR from_id = $3)
            )
            "#,
        )
        .bind(problem_id)
        .bind(for_comment)
        .bind(to_id)
        .fetch_one(pool)
        .await?;

        Ok(exists)
    }

    /// Create a new comment
    pub async fn create_comment(pool: &PgPool, comment: &NewComment) -> AppResult<Comment> {
        let row = sqlx::query_as::<_, Comment>(
            r#"
            INSERT INTO comments (problem_id, from_id, to_id, content, for_comment)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(comment.problem_id)
        .bind(comment.from_id)
        .bind(comment.to_id)
        .bind(&comment.content)
        .bind(comment.for_comment)
        .fetch_one(pool)
        .await?;

        Ok(row)
    }
}
