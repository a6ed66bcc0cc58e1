//! Problem comments and votes

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::UserId;

/// Comment database model
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Comment {
    pub id: i64,
    pub problem_id: i64,
    pub from_id: UserId,
    pub to_id: Option<UserId>,
    pub content: String,
    /// Root comment of the thread this one replies to
    pub for_comment: Option<i64>,
    pub created_at: DateTime<Utc>,
}

/// Fields required to persist a new comment
#[derive(Debug, Clone)]
pub struct NewComment {
    pub problem_id: i64,
    pub from_id: UserId,
    pub to_id: Option<UserId>,
    pub content: String,
    pub for_comment: Option<i64>,
}

/// Vote attitude
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Attitude {
    Up,
    Down,
}

impl Attitude {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Up => "up",
            Self::Down => "down",
        }
    }
}

impl std::fmt::Display for Attitude {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
