//! Problem request DTOs

use serde::Deserialize;
use validator::Validate;

use crate::{
    constants::MAX_COMMENT_LENGTH,
    models::{Attitude, LastSubmitFilter, UserId},
};

/// Submit source code for grading
#[derive(Debug, Deserialize, Validate)]
pub struct SubmitRequest {
    #[validate(length(min = 1, max = 20))]
    pub language: String,

    #[validate(length(min = 1, max = 1048576))] // 1MB max
    pub source_code: String,
}

/// Query for the latest submission
#[derive(Debug, Default, Deserialize)]
pub struct LastSubmitQuery {
    /// Only consider accepted submissions
    #[serde(default)]
    pub success: bool,

    /// Only consider submissions that finished grading
    #[serde(default)]
    pub complete: bool,
}

impl From<LastSubmitQuery> for LastSubmitFilter {
    fn from(query: LastSubmitQuery) -> Self {
        Self {
            need_success: query.success,
            need_complete: query.complete,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct VoteRequest {
    pub attitude: Attitude,
}

/// Post a comment or a reply
#[derive(Debug, Deserialize, Validate)]
pub struct CommentRequest {
    #[validate(length(min = 1, max = MAX_COMMENT_LENGTH))]
    pub content: String,

    /// User being replied to
    pub to_id: Option<UserId>,

    /// Root comment of the thread being replied in
    pub for_comment: Option<i64>,
}
