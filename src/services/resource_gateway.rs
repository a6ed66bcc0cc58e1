//! Resource gateway
//!
//! Permission-checked reads of groups, contests and problems. A resource the
//! caller may not see is reported exactly like one that does not exist.

use std::collections::HashSet;
use std::sync::Arc;

use crate::{
    db::Store,
    error::{AppError, AppResult},
    models::{Contest, Group, Problem, ProblemScope, UserId},
};

#[derive(Clone)]
pub struct ResourceGateway {
    store: Arc<dyn Store>,
}

impl ResourceGateway {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn Store> {
        &self.store
    }

    /// Get a group the caller owns or belongs to
    pub async fn get_group(&self, caller: UserId, id: i64) -> AppResult<Group> {
        let group = self.store.find_group(id).await?.ok_or_else(group_not_found)?;

        if group.owner_id == caller || self.store.is_group_member(id, caller).await? {
            Ok(group)
        } else {
            Err(group_not_found())
        }
    }

    /// Get a contest the caller owns or participates in
    pub async fn get_contest(&self, caller: UserId, id: i64) -> AppResult<Contest> {
        let contest = self
            .store
            .find_contest(id)
            .await?
            .ok_or_else(contest_not_found)?;

        if contest.owner_id == caller || self.store.is_contest_participant(id, caller).await? {
            Ok(contest)
        } else {
            Err(contest_not_found())
        }
    }

    /// Get a problem visible to the caller
    pub async fn get_problem(&self, caller: UserId, id: i64) -> AppResult<Problem> {
        let problem = self
            .store
            .find_problem(id)
            .await?
            .ok_or_else(problem_not_found)?;

        if problem.owner_id == caller {
            return Ok(problem);
        }

        let visible = match problem.scope() {
            Some(ProblemScope::Public) => true,
            Some(ProblemScope::Group(group_id)) => {
                found(self.get_group(caller, group_id).await)?
            }
            Some(ProblemScope::Contest(contest_id)) => {
                found(self.get_contest(caller, contest_id).await)?
            }
            None => false,
        };

        if visible {
            Ok(problem)
        } else {
            Err(problem_not_found())
        }
    }

    /// Check the caller's membership among `required` groups.
    ///
    /// With `match_any` one membership is enough, otherwise every group is
    /// needed. An empty requirement always passes. The error lists the
    /// groups the caller is missing.
    pub async fn check_permission(
        &self,
        caller: UserId,
        required: &[i64],
        match_any: bool,
    ) -> AppResult<()> {
        if required.is_empty() {
            return Ok(());
        }

        let held: HashSet<i64> = self
            .store
            .member_groups_in(caller, required)
            .await?
            .into_iter()
            .collect();

        let mut seen = HashSet::new();
        let missing: Vec<i64> = required
            .iter()
            .copied()
            .filter(|g| !held.contains(g) && seen.insert(*g))
            .collect();

        let granted = if match_any {
            !held.is_empty()
        } else {
            missing.is_empty()
        };

        if granted {
            Ok(())
        } else {
            tracing::info!(caller, ?missing, match_any, "Group permission check failed");
            Err(AppError::MissingGroups(missing))
        }
    }

    /// Load a group and require the caller to own it
    pub async fn ensure_group_owner(&self, caller: UserId, id: i64) -> AppResult<Group> {
        let group = self.get_group(caller, id).await?;
        if group.owner_id != caller {
            return Err(AppError::Forbidden(
                "Only the group owner can manage invitations".to_string(),
            ));
        }
        Ok(group)
    }

    /// Load a contest and require the caller to own it
    pub async fn ensure_contest_owner(&self, caller: UserId, id: i64) -> AppResult<Contest> {
        let contest = self.get_contest(caller, id).await?;
        if contest.owner_id != caller {
            return Err(AppError::Forbidden(
                "Only the contest owner can manage invitations".to_string(),
            ));
        }
        Ok(contest)
    }
}

/// Turn a gateway lookup into a visibility flag, keeping store failures
fn found<T>(lookup: AppResult<T>) -> AppResult<bool> {
    match lookup {
        Ok(_) => Ok(true),
        Err(AppError::NotFound(_)) => Ok(false),
        Err(e) => Err(e),
    }
}

fn group_not_found() -> AppError {
    AppError::NotFound("Group not found".to_string())
}

fn contest_not_found() -> AppError {
    AppError::NotFound("Contest not found".to_string())
}

fn problem_not_found() -> AppError {
    AppError::NotFound("Problem not found".to_string())
}
