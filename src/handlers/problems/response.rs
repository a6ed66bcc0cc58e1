//! Problem response DTOs

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::Submit;

/// Submission summary returned to its author
#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    pub id: i64,
    pub problem_id: i64,
    pub language: String,
    pub status: String,
    pub is_complete: bool,
    pub created_at: DateTime<Utc>,
}

impl From<Submit> for SubmitResponse {
    fn from(submit: Submit) -> Self {
        Self {
            id: submit.id,
            problem_id: submit.problem_id,
            language: submit.language,
            status: submit.status,
            is_complete: submit.is_complete,
            created_at: submit.created_at,
        }
    }
}
