//! Application state management
//!
//! This module contains the shared application state that is passed
//! to all request handlers via Axum's State extractor.

use std::sync::Arc;

use crate::{
    cache::{CacheBackend, CacheClient},
    config::Config,
    db::Store,
    dispatch::TaskDispatcher,
    services::{
        ContestInvites, FeedbackService, GroupInvites, InviteCoordinator, ResourceGateway,
        SubmissionCoordinator,
    },
};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

/// Inner state (wrapped in Arc for cheap cloning)
struct AppStateInner {
    /// Application configuration
    config: Config,

    /// Logging cache client
    cache: CacheClient,

    /// Permission-checked resource reads
    gateway: ResourceGateway,

    group_invites: InviteCoordinator<GroupInvites>,
    contest_invites: InviteCoordinator<ContestInvites>,
    submissions: SubmissionCoordinator,
    feedback: FeedbackService,
}

impl AppState {
    /// Wire the coordinators over the given store, cache and dispatcher
    pub fn new(
        config: Config,
        store: Arc<dyn Store>,
        cache: Arc<dyn CacheBackend>,
        dispatcher: Arc<dyn TaskDispatcher>,
    ) -> Self {
        let cache = CacheClient::new(cache);
        let gateway = ResourceGateway::new(store);

        let group_invites =
            InviteCoordinator::new(GroupInvites::new(gateway.clone()), cache.clone());
        let contest_invites =
            InviteCoordinator::new(ContestInvites::new(gateway.clone()), cache.clone());
        let submissions = SubmissionCoordinator::new(
            gateway.clone(),
            cache.clone(),
            dispatcher,
            config.judge.clone(),
        );
        let feedback = FeedbackService::new(gateway.clone());

        Self {
            inner: Arc::new(AppStateInner {
                config,
                cache,
                gateway,
                group_invites,
                contest_invites,
                submissions,
                feedback,
            }),
        }
    }

    /// Get a reference to the configuration
    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    pub fn cache(&self) -> &CacheClient {
        &self.inner.cache
    }

    pub fn gateway(&self) -> &ResourceGateway {
        &self.inner.gateway
    }

    pub fn group_invites(&self) -> &InviteCoordinator<GroupInvites> {
        &self.inner.group_invites
    }

    pub fn contest_invites(&self) -> &InviteCoordinator<ContestInvites> {
        &self.inner.contest_invites
    }

    pub fn submissions(&self) -> &SubmissionCoordinator {
        &self.inner.submissions
    }

    pub fn feedback(&self) -> &FeedbackService {
        &self.inner.feedback
    }
}
