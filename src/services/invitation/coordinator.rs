use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;
use validator::Validate;

use super::InviteRequest;
use crate::{
    cache::{CacheClient, keys},
    error::{AppError, AppResult},
    models::{InviteToken, JoinResult, ResourceKind, UserId},
};

/// What differs between inviting to a group and inviting to a contest
#[async_trait]
pub trait InviteTarget: Send + Sync {
    type Resource: Serialize + Send + Sync;

    const KIND: ResourceKind;

    /// Load the resource, requiring the caller to own it
    async fn load_owned(&self, caller: UserId, id: i64) -> AppResult<Self::Resource>;

    /// Load the resource for a prospective member
    async fn load(&self, id: i64) -> AppResult<Self::Resource>;

    /// Lifetime of a new invitation in seconds
    fn ttl_seconds(
        &self,
        resource: &Self::Resource,
        request: &InviteRequest,
        now: DateTime<Utc>,
    ) -> AppResult<i64>;

    /// Resolve the password-free allow-list stored with the token
    async fn allowed_groups(
        &self,
        caller: UserId,
        request: &InviteRequest,
    ) -> AppResult<Option<Vec<i64>>>;

    /// Whether the caller may join without the password
    async fn bypasses_password(&self, caller: UserId, token: &InviteToken) -> AppResult<bool>;

    /// Record the caller as a member
    async fn admit(&self, id: i64, caller: UserId) -> AppResult<()>;
}

/// Issues, resolves and redeems invitations for one kind of resource
#[derive(Clone)]
pub struct InviteCoordinator<T> {
    target: T,
    cache: CacheClient,
}

impl<T: InviteTarget> InviteCoordinator<T> {
    pub fn new(target: T, cache: CacheClient) -> Self {
        Self { target, cache }
    }

    /// Issue an invitation, or return the live one unchanged
    pub async fn invite(
        &self,
        caller: UserId,
        resource_id: i64,
        request: InviteRequest,
    ) -> AppResult<InviteToken> {
        let resource = self.target.load_owned(caller, resource_id).await?;

        if let Some(token) = self.live_token(resource_id).await? {
            return Ok(token);
        }

        request.validate()?;
        let ttl_seconds = self.target.ttl_seconds(&resource, &request, Utc::now())?;
        let allowed_groups = self.target.allowed_groups(caller, &request).await?;

        let token = InviteToken {
            id: Uuid::new_v4().to_string(),
            resource_type: T::KIND,
            resource_id,
            password: request.password.filter(|p| !p.is_empty()),
            ttl_seconds,
            allowed_groups,
        };
        let ttl = Duration::from_secs(ttl_seconds.unsigned_abs());
        let payload_key = keys::invite_token(&token.id);
        let index_key = keys::invite_index(T::KIND, resource_id);

        let payload = serde_json::to_string(&token).map_err(anyhow::Error::from)?;
        self.cache
            .set(&payload_key, &payload, ttl, "store invitation")
            .await?;

        if self
            .cache
            .set_if_absent(&index_key, &token.id, ttl, "claim invitation index")
            .await?
        {
            tracing::info!(
                kind = %T::KIND,
                resource_id,
                token = %token.id,
                ttl_seconds,
                "Invitation issued"
            );
            return Ok(token);
        }

        // Someone else holds the index: drop our payload and defer to theirs
        self.cache
            .del(&payload_key, "drop unclaimed invitation")
            .await?;

        if let Some(winner) = self.live_token(resource_id).await? {
            return Ok(winner);
        }

        Err(AppError::Conflict(
            "Invitation changed concurrently, please retry".to_string(),
        ))
    }

    /// Current invitation of a resource, owner only
    pub async fn invite_info(&self, caller: UserId, resource_id: i64) -> AppResult<InviteToken> {
        self.target.load_owned(caller, resource_id).await?;

        self.live_token(resource_id)
            .await?
            .ok_or_else(|| AppError::NotFound("No live invitation".to_string()))
    }

    /// Resolve a token for a prospective member
    pub async fn join_query(
        &self,
        caller: UserId,
        token_id: &str,
    ) -> AppResult<JoinResult<T::Resource>> {
        let (_, result) = self.resolve(caller, token_id).await?;
        Ok(result)
    }

    /// Redeem a token, checking the password when one is required
    pub async fn join(
        &self,
        caller: UserId,
        token_id: &str,
        password: Option<&str>,
    ) -> AppResult<T::Resource> {
        let (token, result) = self.resolve(caller, token_id).await?;

        if result.need_password && password != result.password.as_deref() {
            tracing::info!(kind = %T::KIND, resource_id = token.resource_id, caller, "Invitation password mismatch");
            return Err(AppError::PasswordMismatch);
        }

        self.target.admit(token.resource_id, caller).await?;
        tracing::info!(kind = %T::KIND, resource_id = token.resource_id, caller, "Joined through invitation");

        Ok(result.resource)
    }

    async fn resolve(
        &self,
        caller: UserId,
        token_id: &str,
    ) -> AppResult<(InviteToken, JoinResult<T::Resource>)> {
        let not_found = || AppError::NotFound("Invitation not found or expired".to_string());

        // Token ids are always UUIDs; anything else never reaches the cache
        if Uuid::parse_str(token_id).is_err() {
            return Err(not_found());
        }

        let token = self
            .read_token(token_id)
            .await?
            .filter(|t| t.resource_type == T::KIND)
            .ok_or_else(not_found)?;

        let resource = self.target.load(token.resource_id).await?;

        let password = token.required_password().map(str::to_string);
        let need_password =
            password.is_some() && !self.target.bypasses_password(caller, &token).await?;

        let result = JoinResult {
            resource,
            need_password,
            password,
        };
        Ok((token, result))
    }

    /// Follow the resource index to its payload.
    ///
    /// The payload is written before the index with the same TTL, so an index
    /// outliving its payload only happens in the moment both expire.
    async fn live_token(&self, resource_id: i64) -> AppResult<Option<InviteToken>> {
        let index_key = keys::invite_index(T::KIND, resource_id);
        match self.cache.get(&index_key, "lookup invitation index").await? {
            Some(token_id) => self.read_token(&token_id).await,
            None => Ok(None),
        }
    }

    async fn read_token(&self, token_id: &str) -> AppResult<Option<InviteToken>> {
        let key = keys::invite_token(token_id);
        match self.cache.get(&key, "lookup invitation").await? {
            Some(raw) => {
                let token = serde_json::from_str(&raw).map_err(anyhow::Error::from)?;
                Ok(Some(token))
            }
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::CacheBackend;
    use crate::test_utils::TestContext;
    use chrono::Duration as ChronoDuration;

    const OWNER: UserId = 1;
    const MEMBER: UserId = 2;
    const STRANGER: UserId = 3;

    fn group_request(timeout: i64, password: Option<&str>) -> InviteRequest {
        InviteRequest {
            password: password.map(str::to_string),
            timeout: Some(timeout),
            allow_groups: Vec::new(),
        }
    }

    #[tokio::test]
    async fn test_reissue_returns_live_token() {
        let ctx = TestContext::new();
        let group = ctx.store.add_group(OWNER);
        let invites = ctx.state.group_invites();

        let first = invites
            .invite(OWNER, group.id, group_request(3600, Some("pw")))
            .await
            .unwrap();
        let second = invites
            .invite(OWNER, group.id, group_request(86_400, None))
            .await
            .unwrap();

        assert_eq!(first, second);
        assert_eq!(second.ttl_seconds, 3600);
        assert_eq!(
            ctx.cache.raw(&keys::invite_index(ResourceKind::Group, group.id)),
            Some(first.id.clone())
        );
    }

    #[tokio::test]
    async fn test_group_timeout_bounds() {
        let ctx = TestContext::new();
        let invites = ctx.state.group_invites();

        for timeout in [100, 2_592_001] {
            let group = ctx.store.add_group(OWNER);
            let err = invites
                .invite(OWNER, group.id, group_request(timeout, None))
                .await
                .unwrap_err();
            assert!(matches!(err, AppError::Validation(_)), "timeout {timeout}");
        }

        let group = ctx.store.add_group(OWNER);
        let token = invites
            .invite(OWNER, group.id, group_request(3600, None))
            .await
            .unwrap();
        assert_eq!(token.ttl_seconds, 3600);

        let group = ctx.store.add_group(OWNER);
        let missing = InviteRequest::default();
        assert!(matches!(
            invites.invite(OWNER, group.id, missing).await,
            Err(AppError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_password_length_is_bounded() {
        let ctx = TestContext::new();
        let group = ctx.store.add_group(OWNER);
        let long = "x".repeat(31);

        let err = ctx
            .state
            .group_invites()
            .invite(OWNER, group.id, group_request(3600, Some(&long)))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_only_owner_manages_invitations() {
        let ctx = TestContext::new();
        let group = ctx.store.add_group(OWNER);
        ctx.store.enroll(group.id, MEMBER);
        let invites = ctx.state.group_invites();

        assert!(matches!(
            invites.invite(MEMBER, group.id, group_request(3600, None)).await,
            Err(AppError::Forbidden(_))
        ));
        assert!(matches!(
            invites.invite(STRANGER, group.id, group_request(3600, None)).await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            invites.invite_info(OWNER, group.id).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_password_gate() {
        let ctx = TestContext::new();
        let group = ctx.store.add_group(OWNER);
        let invites = ctx.state.group_invites();
        let token = invites
            .invite(OWNER, group.id, group_request(3600, Some("s3cret")))
            .await
            .unwrap();

        let query = invites.join_query(MEMBER, &token.id).await.unwrap();
        assert!(query.need_password);
        assert_eq!(query.resource.id, group.id);

        let err = invites.join(MEMBER, &token.id, Some("wrong")).await.unwrap_err();
        assert!(matches!(err, AppError::PasswordMismatch));
        assert!(!ctx.store.is_member(group.id, MEMBER));

        invites.join(MEMBER, &token.id, Some("s3cret")).await.unwrap();
        assert!(ctx.store.is_member(group.id, MEMBER));

        let err = invites.join(MEMBER, &token.id, Some("s3cret")).await.unwrap_err();
        assert!(matches!(err, AppError::AlreadyExists(_)));
    }

    #[tokio::test]
    async fn test_empty_password_means_open_invitation() {
        let ctx = TestContext::new();
        let group = ctx.store.add_group(OWNER);
        let invites = ctx.state.group_invites();
        let token = invites
            .invite(OWNER, group.id, group_request(3600, Some("")))
            .await
            .unwrap();

        assert_eq!(token.password, None);
        assert!(!invites.join_query(MEMBER, &token.id).await.unwrap().need_password);
        invites.join(MEMBER, &token.id, None).await.unwrap();
        assert!(ctx.store.is_member(group.id, MEMBER));
    }

    #[tokio::test]
    async fn test_contest_ttl_follows_end_time() {
        let ctx = TestContext::new();
        let now = Utc::now();
        let contest = ctx.store.add_contest(
            OWNER,
            now - ChronoDuration::hours(1),
            now + ChronoDuration::hours(2),
        );

        let token = ctx
            .state
            .contest_invites()
            .invite(OWNER, contest.id, InviteRequest::default())
            .await
            .unwrap();

        assert!((7190..=7200).contains(&token.ttl_seconds));
        let left = ctx
            .cache
            .ttl(&keys::invite_token(&token.id))
            .unwrap()
            .as_secs();
        assert!(left <= 7200);
    }

    #[tokio::test]
    async fn test_ended_contest_cannot_invite() {
        let ctx = TestContext::new();
        let now = Utc::now();
        let contest = ctx.store.add_contest(
            OWNER,
            now - ChronoDuration::hours(3),
            now - ChronoDuration::hours(1),
        );

        let err = ctx
            .state
            .contest_invites()
            .invite(OWNER, contest.id, InviteRequest::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_allow_list_must_be_held_by_owner() {
        let ctx = TestContext::new();
        let now = Utc::now();
        let contest = ctx.store.add_contest(OWNER, now, now + ChronoDuration::hours(2));
        let foreign = ctx.store.add_group(STRANGER);

        let request = InviteRequest {
            allow_groups: vec![foreign.id],
            ..Default::default()
        };
        match ctx.state.contest_invites().invite(OWNER, contest.id, request).await {
            Err(AppError::MissingGroups(missing)) => assert_eq!(missing, vec![foreign.id]),
            other => panic!("expected missing groups, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_allow_list_skips_password() {
        let ctx = TestContext::new();
        let now = Utc::now();
        let contest = ctx.store.add_contest(OWNER, now, now + ChronoDuration::hours(2));
        let team = ctx.store.add_group(OWNER);
        ctx.store.enroll(team.id, MEMBER);
        let invites = ctx.state.contest_invites();

        let request = InviteRequest {
            password: Some("s3cret".to_string()),
            timeout: None,
            allow_groups: vec![team.id],
        };
        let token = invites.invite(OWNER, contest.id, request).await.unwrap();
        assert_eq!(token.allowed_groups, Some(vec![team.id]));

        assert!(!invites.join_query(MEMBER, &token.id).await.unwrap().need_password);
        assert!(invites.join_query(STRANGER, &token.id).await.unwrap().need_password);

        invites.join(MEMBER, &token.id, None).await.unwrap();
        assert!(ctx.store.is_participant(contest.id, MEMBER));

        assert!(matches!(
            invites.join(STRANGER, &token.id, None).await,
            Err(AppError::PasswordMismatch)
        ));
    }

    #[tokio::test]
    async fn test_token_is_bound_to_its_kind() {
        let ctx = TestContext::new();
        let group = ctx.store.add_group(OWNER);
        let token = ctx
            .state
            .group_invites()
            .invite(OWNER, group.id, group_request(3600, None))
            .await
            .unwrap();

        assert!(matches!(
            ctx.state.contest_invites().join_query(MEMBER, &token.id).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_index_keys_are_not_tokens() {
        let ctx = TestContext::new();
        let live = ctx.store.add_group(OWNER);
        let idle = ctx.store.add_group(OWNER);
        let invites = ctx.state.group_invites();
        invites
            .invite(OWNER, live.id, group_request(3600, None))
            .await
            .unwrap();

        // A group with a live invitation looks exactly like one without
        for group in [&live, &idle] {
            for token_id in [
                format!("group:{}", group.id),
                format!("-index:group:{}", group.id),
                "not-a-uuid".to_string(),
            ] {
                assert!(
                    matches!(
                        invites.join_query(STRANGER, &token_id).await,
                        Err(AppError::NotFound(_))
                    ),
                    "token {token_id}"
                );
            }
        }

        assert!(matches!(
            invites.join_query(STRANGER, &Uuid::new_v4().to_string()).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_contest_password_applies_without_allow_list() {
        let ctx = TestContext::new();
        let now = Utc::now();
        let contest = ctx.store.add_contest(OWNER, now, now + ChronoDuration::hours(2));
        let team = ctx.store.add_group(OWNER);
        ctx.store.enroll(team.id, MEMBER);
        let invites = ctx.state.contest_invites();

        let request = InviteRequest {
            password: Some("s3cret".to_string()),
            ..Default::default()
        };
        let token = invites.invite(OWNER, contest.id, request).await.unwrap();
        assert_eq!(token.allowed_groups, None);

        // Group membership alone grants nothing when no groups were listed
        assert!(invites.join_query(MEMBER, &token.id).await.unwrap().need_password);
        assert!(matches!(
            invites.join(MEMBER, &token.id, None).await,
            Err(AppError::PasswordMismatch)
        ));
        assert!(!ctx.store.is_participant(contest.id, MEMBER));

        invites.join(MEMBER, &token.id, Some("s3cret")).await.unwrap();
        assert!(ctx.store.is_participant(contest.id, MEMBER));
    }

    #[tokio::test(start_paused = true)]
    async fn test_expired_invitation_is_gone() {
        let ctx = TestContext::new();
        let group = ctx.store.add_group(OWNER);
        let invites = ctx.state.group_invites();
        let token = invites
            .invite(OWNER, group.id, group_request(3600, None))
            .await
            .unwrap();

        tokio::time::advance(Duration::from_secs(3601)).await;

        assert!(matches!(
            invites.join_query(MEMBER, &token.id).await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            invites.invite_info(OWNER, group.id).await,
            Err(AppError::NotFound(_))
        ));

        let fresh = invites
            .invite(OWNER, group.id, group_request(7200, None))
            .await
            .unwrap();
        assert_ne!(fresh.id, token.id);
        assert_eq!(fresh.ttl_seconds, 7200);
    }

    #[tokio::test]
    async fn test_losing_the_index_race_returns_winner() {
        let ctx = TestContext::new();
        let group = ctx.store.add_group(OWNER);
        let rival = InviteToken {
            id: Uuid::new_v4().to_string(),
            resource_type: ResourceKind::Group,
            resource_id: group.id,
            password: Some("theirs".to_string()),
            ttl_seconds: 7200,
            allowed_groups: None,
        };
        ctx.cache
            .set(
                &keys::invite_token(&rival.id),
                &serde_json::to_string(&rival).unwrap(),
                Duration::from_secs(7200),
            )
            .await
            .unwrap();
        ctx.cache
            .preempt(&keys::invite_index(ResourceKind::Group, group.id), &rival.id);

        let token = ctx
            .state
            .group_invites()
            .invite(OWNER, group.id, group_request(3600, Some("ours")))
            .await
            .unwrap();

        assert_eq!(token, rival);
        assert_eq!(
            ctx.cache.keys("invite:"),
            vec![keys::invite_token(&rival.id)]
        );
    }

    #[tokio::test]
    async fn test_vanished_winner_is_a_conflict() {
        let ctx = TestContext::new();
        let group = ctx.store.add_group(OWNER);
        let index_key = keys::invite_index(ResourceKind::Group, group.id);
        ctx.cache.preempt(&index_key, &Uuid::new_v4().to_string());

        let err = ctx
            .state
            .group_invites()
            .invite(OWNER, group.id, group_request(3600, None))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Conflict(_)));
        assert!(ctx.cache.keys("invite:").is_empty());

        // Once the stale index is gone the owner can issue again
        ctx.cache.del(&index_key).await.unwrap();
        let token = ctx
            .state
            .group_invites()
            .invite(OWNER, group.id, group_request(3600, None))
            .await
            .unwrap();
        assert_eq!(ctx.cache.raw(&index_key), Some(token.id));
    }

    #[tokio::test]
    async fn test_cache_outage_is_reported() {
        let ctx = TestContext::new();
        let group = ctx.store.add_group(OWNER);
        ctx.cache.fail_with("connection refused");

        let err = ctx
            .state
            .group_invites()
            .invite(OWNER, group.id, group_request(3600, None))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Cache(_)));
    }
}
