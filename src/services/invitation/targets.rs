//! Group and contest flavours of invitations

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::{InviteRequest, InviteTarget};
use crate::{
    constants::{MAX_GROUP_INVITE_TTL_SECS, MIN_GROUP_INVITE_TTL_SECS},
    error::{AppError, AppResult},
    models::{Contest, ContestStatus, Group, InviteToken, ResourceKind, UserId},
    services::ResourceGateway,
};

/// Group invitations: caller-chosen lifetime, password always applies
#[derive(Clone)]
pub struct GroupInvites {
    gateway: ResourceGateway,
}

impl GroupInvites {
    pub fn new(gateway: ResourceGateway) -> Self {
        Self { gateway }
    }
}

#[async_trait]
impl InviteTarget for GroupInvites {
    type Resource = Group;

    const KIND: ResourceKind = ResourceKind::Group;

    async fn load_owned(&self, caller: UserId, id: i64) -> AppResult<Group> {
        self.gateway.ensure_group_owner(caller, id).await
    }

    async fn load(&self, id: i64) -> AppResult<Group> {
        self.gateway
            .store()
            .find_group(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Group not found".to_string()))
    }

    fn ttl_seconds(&self, _: &Group, request: &InviteRequest, _: DateTime<Utc>) -> AppResult<i64> {
        let timeout = request.timeout.ok_or_else(|| {
            AppError::Validation("timeout is required for group invitations".to_string())
        })?;

        if !(MIN_GROUP_INVITE_TTL_SECS..=MAX_GROUP_INVITE_TTL_SECS).contains(&timeout) {
            return Err(AppError::Validation(format!(
                "timeout must be between {MIN_GROUP_INVITE_TTL_SECS} and {MAX_GROUP_INVITE_TTL_SECS} seconds"
            )));
        }

        Ok(timeout)
    }

    async fn allowed_groups(&self, _: UserId, _: &InviteRequest) -> AppResult<Option<Vec<i64>>> {
        Ok(None)
    }

    async fn bypasses_password(&self, _: UserId, _: &InviteToken) -> AppResult<bool> {
        Ok(false)
    }

    async fn admit(&self, id: i64, caller: UserId) -> AppResult<()> {
        self.gateway.store().add_group_member(id, caller).await
    }
}

/// Contest invitations: live until the contest ends, with an optional
/// allow-list of groups whose members skip the password
#[derive(Clone)]
pub struct ContestInvites {
    gateway: ResourceGateway,
}

impl ContestInvites {
    pub fn new(gateway: ResourceGateway) -> Self {
        Self { gateway }
    }
}

#[async_trait]
impl InviteTarget for ContestInvites {
    type Resource = Contest;

    const KIND: ResourceKind = ResourceKind::Contest;

    async fn load_owned(&self, caller: UserId, id: i64) -> AppResult<Contest> {
        self.gateway.ensure_contest_owner(caller, id).await
    }

    async fn load(&self, id: i64) -> AppResult<Contest> {
        self.gateway
            .store()
            .find_contest(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Contest not found".to_string()))
    }

    fn ttl_seconds(
        &self,
        contest: &Contest,
        _: &InviteRequest,
        now: DateTime<Utc>,
    ) -> AppResult<i64> {
        if contest.status_at(now) == ContestStatus::Ended {
            return Err(AppError::Validation("Contest has already ended".to_string()));
        }

        contest
            .remaining_at(now)
            .map(|left| left.num_seconds())
            .filter(|secs| *secs > 0)
            .ok_or_else(|| AppError::Validation("Contest has already ended".to_string()))
    }

    async fn allowed_groups(
        &self,
        caller: UserId,
        request: &InviteRequest,
    ) -> AppResult<Option<Vec<i64>>> {
        if request.allow_groups.is_empty() {
            return Ok(None);
        }

        let mut groups = request.allow_groups.clone();
        groups.sort_unstable();
        groups.dedup();

        // The owner can only open the contest to groups they belong to
        self.gateway.check_permission(caller, &groups, false).await?;

        Ok(Some(groups))
    }

    async fn bypasses_password(&self, caller: UserId, token: &InviteToken) -> AppResult<bool> {
        let Some(groups) = token.allowed_groups.as_deref().filter(|g| !g.is_empty()) else {
            return Ok(false);
        };

        match self.gateway.check_permission(caller, groups, true).await {
            Ok(()) => Ok(true),
            Err(AppError::MissingGroups(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }

    async fn admit(&self, id: i64, caller: UserId) -> AppResult<()> {
        self.gateway.store().add_contest_participant(id, caller).await
    }
}
