//! Submit model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::UserId;
use crate::constants::verdicts;

/// Submit database model. Rows are append-only from this service's side;
/// `status` and `is_complete` are filled in by the grading worker.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Submit {
    pub id: i64,
    pub user_id: UserId,
    pub problem_id: i64,
    pub language: String,
    #[serde(skip_serializing)]
    pub source_code: String,
    pub status: String,
    pub is_complete: bool,
    pub created_at: DateTime<Utc>,
}

impl Submit {
    /// Check if this submission was accepted
    pub fn is_accepted(&self) -> bool {
        self.status == verdicts::ACCEPTED
    }
}

/// Fields required to persist a new submission
#[derive(Debug, Clone)]
pub struct NewSubmit {
    pub user_id: UserId,
    pub problem_id: i64,
    pub language: String,
    pub source_code: String,
}

/// Filters for the most recent submission lookup
#[derive(Debug, Clone, Copy, Default)]
pub struct LastSubmitFilter {
    pub need_success: bool,
    pub need_complete: bool,
}
