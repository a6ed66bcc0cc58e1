//! Problem model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::UserId;
use crate::constants::problem_scopes;

/// Problem database model
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Problem {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub owner_id: UserId,
    /// One of `public`, `group` or `contest`
    pub scope: String,
    /// Group or contest id for scoped problems
    pub belong_to_id: Option<i64>,
    pub created_at: DateTime<Utc>,
}

impl Problem {
    /// Resolve where the problem lives. `None` for rows with an unknown or
    /// incomplete scope, which are treated as invisible.
    pub fn scope(&self) -> Option<ProblemScope> {
        match (self.scope.as_str(), self.belong_to_id) {
            (problem_scopes::PUBLIC, _) => Some(ProblemScope::Public),
            (problem_scopes::GROUP, Some(id)) => Some(ProblemScope::Group(id)),
            (problem_scopes::CONTEST, Some(id)) => Some(ProblemScope::Contest(id)),
            _ => None,
        }
    }
}

/// Visibility scope of a problem
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProblemScope {
    Public,
    Group(i64),
    Contest(i64),
}
