//! Group repository

use sqlx::PgPool;

use crate::{
    error::AppResult,
    models::{Group, UserId},
};

/// Repository for group database operations
pub struct GroupRepository;

impl GroupRepository {
    /// Find group by ID
    pub async fn find_by_id(pool: &PgPool, id: i64) -> AppResult<Option<Group>> {
        let group = sqlx::query_as::<_, Group>(r#"SELECT * FROM groups WHERE id = $1"#)
            .bind(id)
            .fetch_optional(pool)
            .await?;

        Ok(group)
    }

    /// Check if a user belongs to a group
    pub async fn is_member(pool: &PgPool, group_id: i64, user_id: UserId) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar(
            r#"SELECT EXISTS(SELECT 1 FROM user_in_group WHERE group_id = $1 AND user_id = $2)"#,
        )
        .bind(group_id)
        .bind(user_id)
        .fetch_one(pool)
        .await?;

        Ok(exists)
    }

    /// Return the subset of `group_ids` the user is a member of
    pub async fn member_groups_in(
        pool: &PgPool,
        user_id: UserId,
        group_ids: &[i64],
    ) -> AppResult<Vec<i64>> {
        let groups: Vec<i64> = sqlx::query_scalar(
            r#"
            SELECT group_id FROM user_in_group
            WHERE user_id = $1 AND group_id = ANY($2)
            "#,
        )
        .bind(user_id)
        .bind(group_ids)
        .fetch_all(pool)
        .await?;

        Ok(groups)
    }

    /// Add a member. A second insert for the same pair fails with a unique violation.
    pub async fn add_member(pool: &PgPool, group_id: i64, user_id: UserId) -> AppResult<()> {
        sqlx::query(r#"INSERT INTO user_in_group (user_id, group_id) VALUES ($1, $2)"#)
            .bind(user_id)
            .bind(group_id)
            .execute(pool)
            .await?;

        Ok(())
    }
}
