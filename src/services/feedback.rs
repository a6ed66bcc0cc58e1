//! Problem votes and comments

use crate::{
    constants::MAX_COMMENT_LENGTH,
    error::{AppError, AppResult},
    models::{Attitude, Comment, NewComment, UserId},
    services::ResourceGateway,
};

#[derive(Clone)]
pub struct FeedbackService {
    gateway: ResourceGateway,
}

impl FeedbackService {
    pub fn new(gateway: ResourceGateway) -> Self {
        Self { gateway }
    }

    /// Record the caller's vote, replacing any earlier one
    pub async fn vote(&self, caller: UserId, problem_id: i64, attitude: Attitude) -> AppResult<()> {
        self.gateway.get_problem(caller, problem_id).await?;
        self.gateway
            .store()
            .save_vote(caller, problem_id, attitude)
            .await?;

        tracing::debug!(user_id = caller, problem_id, %attitude, "Vote recorded");
        Ok(())
    }

    /// Post a comment, optionally replying to `to_id` in thread `for_comment`
    pub async fn comment(
        &self,
        caller: UserId,
        problem_id: i64,
        content: String,
        to_id: Option<UserId>,
        for_comment: Option<i64>,
    ) -> AppResult<Comment> {
        if content.trim().is_empty() {
            return Err(AppError::Validation("Comment is empty".to_string()));
        }
        if content.chars().count() as u64 > MAX_COMMENT_LENGTH {
            return Err(AppError::Validation(format!(
                "Comment exceeds {MAX_COMMENT_LENGTH} characters"
            )));
        }

        self.gateway.get_problem(caller, problem_id).await?;
        let store = self.gateway.store();

        if let Some(thread) = for_comment {
            if !store.reply_target_exists(problem_id, thread, to_id).await? {
                return Err(AppError::NotFound("Reply target not found".to_string()));
            }
        }

        store
            .create_comment(NewComment {
                problem_id,
                from_id: caller,
                to_id,
                content,
                for_comment,
            })
            .await
    }
}
