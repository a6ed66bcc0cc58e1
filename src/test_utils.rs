//! In-memory doubles for the cache, the relational store and the dispatcher.
//!
//! Cache expiry follows `tokio::time`, so tests running with
//! `start_paused = true` can move time forward with `tokio::time::advance`.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::time::Instant;

use crate::{
    cache::{CacheBackend, CacheError, keys},
    config::{
        Config, DatabaseConfig, JudgeConfig, JwtConfig, LogFormat, RedisConfig, ServerConfig,
    },
    constants::{problem_scopes, verdicts},
    db::Store,
    dispatch::{DispatchError, TaskDispatcher},
    error::{AppError, AppResult},
    models::{
        Attitude, Comment, Contest, Group, LastSubmitFilter, NewComment, NewSubmit, Problem,
        Submit, UserId,
    },
    state::AppState,
};

pub const TEST_JWT_SECRET: &str = "test-secret";

pub fn test_config() -> Config {
    Config {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            rust_log: "debug".to_string(),
            log_format: LogFormat::Pretty,
            request_timeout_secs: 5,
        },
        database: DatabaseConfig {
            url: "postgres://localhost/codearena_test".to_string(),
            max_connections: 1,
        },
        redis: RedisConfig {
            url: "redis://localhost:6379".to_string(),
        },
        jwt: JwtConfig {
            secret: TEST_JWT_SECRET.to_string(),
        },
        judge: JudgeConfig::default(),
    }
}

/// Everything a coordinator test needs, wired together
pub struct TestContext {
    pub state: AppState,
    pub store: Arc<MemoryStore>,
    pub cache: Arc<MemoryCache>,
    pub dispatcher: Arc<RecordingDispatcher>,
}

impl TestContext {
    pub fn new() -> Self {
        let dispatcher = Arc::new(RecordingDispatcher::new());
        let store = Arc::new(MemoryStore::new());
        let cache = Arc::new(MemoryCache::new());
        let state = AppState::new(test_config(), store.clone(), cache.clone(), dispatcher.clone());
        Self {
            state,
            store,
            cache,
            dispatcher,
        }
    }

    /// Act as the grading worker: store the result, flip the marker to
    /// complete and record the verdict on the row.
    pub async fn finish_grading(&self, submit: &Submit, status: &str, result: serde_json::Value) {
        let prefix = &self.state.config().judge.result_key_prefix;
        let ttl = Duration::from_secs(self.state.config().judge.in_flight_ttl_secs);

        self.cache
            .set(&keys::submit_result(prefix, submit.id), &result.to_string(), ttl)
            .await
            .unwrap();
        self.cache
            .set(&keys::submit_flag(submit.user_id, submit.problem_id), "true", ttl)
            .await
            .unwrap();
        self.store.complete_submit(submit.id, status);
    }
}

// =============================================================================
// CACHE
// =============================================================================

/// TTL-aware in-memory cache with failure injection
#[derive(Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<String, (String, Instant)>>,
    failure: Mutex<Option<String>>,
    fail_once: Mutex<Option<String>>,
    rivals: Mutex<HashMap<String, String>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every following call fail until [`MemoryCache::recover`]
    pub fn fail_with(&self, reason: &str) {
        *self.failure.lock().unwrap() = Some(reason.to_string());
    }

    pub fn recover(&self) {
        *self.failure.lock().unwrap() = None;
    }

    /// Fail the next call touching a key that starts with `prefix`
    pub fn fail_next_on(&self, prefix: &str) {
        *self.fail_once.lock().unwrap() = Some(prefix.to_string());
    }

    /// Let another writer store `value` under `key` right before the next
    /// `set_if_absent` on that key runs
    pub fn preempt(&self, key: &str, value: &str) {
        self.rivals
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
    }

    /// Peek without going through the client
    pub fn raw(&self, key: &str) -> Option<String> {
        let entries = self.entries.lock().unwrap();
        entries
            .get(key)
            .filter(|(_, expires)| *expires > Instant::now())
            .map(|(v, _)| v.clone())
    }

    /// Live keys under a prefix, sorted
    pub fn keys(&self, prefix: &str) -> Vec<String> {
        let entries = self.entries.lock().unwrap();
        let now = Instant::now();
        let mut keys: Vec<String> = entries
            .iter()
            .filter(|(k, (_, expires))| k.starts_with(prefix) && *expires > now)
            .map(|(k, _)| k.clone())
            .collect();
        keys.sort();
        keys
    }

    /// Remaining lifetime of a live key
    pub fn ttl(&self, key: &str) -> Option<Duration> {
        let entries = self.entries.lock().unwrap();
        let now = Instant::now();
        entries
            .get(key)
            .filter(|(_, expires)| *expires > now)
            .map(|(_, expires)| *expires - now)
    }

    fn check(&self, key: &str) -> Result<(), CacheError> {
        if let Some(reason) = self.failure.lock().unwrap().as_ref() {
            return Err(offline(reason.clone()));
        }

        let mut once = self.fail_once.lock().unwrap();
        if once.as_deref().is_some_and(|prefix| key.starts_with(prefix)) {
            *once = None;
            return Err(offline(format!("injected failure on {key}")));
        }
        Ok(())
    }

    fn live<'a>(
        entries: &'a mut HashMap<String, (String, Instant)>,
        key: &str,
    ) -> Option<&'a String> {
        if entries.get(key).is_some_and(|(_, expires)| *expires <= Instant::now()) {
            entries.remove(key);
        }
        entries.get(key).map(|(v, _)| v)
    }
}

fn offline(reason: String) -> CacheError {
    CacheError::Redis(redis::RedisError::from((
        redis::ErrorKind::IoError,
        "cache offline",
        reason,
    )))
}

#[async_trait]
impl CacheBackend for MemoryCache {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        self.check(key)?;
        let mut entries = self.entries.lock().unwrap();
        Ok(Self::live(&mut entries, key).cloned())
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError> {
        self.check(key)?;
        let mut entries = self.entries.lock().unwrap();
        entries.insert(key.to_string(), (value.to_string(), Instant::now() + ttl));
        Ok(())
    }

    async fn set_if_absent(
        &self,
        key: &str,
        value: &str,
        ttl: Duration,
    ) -> Result<bool, CacheError> {
        self.check(key)?;
        let mut entries = self.entries.lock().unwrap();
        if let Some(rival) = self.rivals.lock().unwrap().remove(key) {
            entries.insert(key.to_string(), (rival, Instant::now() + ttl));
        }
        if Self::live(&mut entries, key).is_some() {
            return Ok(false);
        }
        entries.insert(key.to_string(), (value.to_string(), Instant::now() + ttl));
        Ok(true)
    }

    async fn del(&self, key: &str) -> Result<(), CacheError> {
        self.check(key)?;
        self.entries.lock().unwrap().remove(key);
        Ok(())
    }

    async fn take(&self, key: &str) -> Result<Option<String>, CacheError> {
        self.check(key)?;
        let mut entries = self.entries.lock().unwrap();
        let value = Self::live(&mut entries, key).cloned();
        entries.remove(key);
        Ok(value)
    }
}

// =============================================================================
// DISPATCHER
// =============================================================================

/// Dispatcher that records submit ids instead of queueing them
#[derive(Default)]
pub struct RecordingDispatcher {
    sent: Mutex<Vec<i64>>,
}

impl RecordingDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<i64> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl TaskDispatcher for RecordingDispatcher {
    async fn dispatch_grading(&self, submit_id: i64) -> Result<(), DispatchError> {
        self.sent.lock().unwrap().push(submit_id);
        Ok(())
    }
}

// =============================================================================
// STORE
// =============================================================================

#[derive(Default)]
struct Tables {
    next_id: i64,
    groups: HashMap<i64, Group>,
    contests: HashMap<i64, Contest>,
    problems: HashMap<i64, Problem>,
    group_members: HashSet<(i64, UserId)>,
    contest_participants: HashSet<(i64, UserId)>,
    submits: Vec<Submit>,
    votes: HashMap<(UserId, i64), Attitude>,
    comments: Vec<Comment>,
    fail_submit_insert: bool,
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

/// In-memory relational store
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a group; the owner is enrolled as a member
    pub fn add_group(&self, owner_id: UserId) -> Group {
        let mut t = self.tables.lock().unwrap();
        let id = t.next_id();
        let group = Group {
            id,
            name: format!("group-{id}"),
            description: None,
            owner_id,
            created_at: Utc::now(),
        };
        t.groups.insert(id, group.clone());
        t.group_members.insert((id, owner_id));
        group
    }

    pub fn add_contest(
        &self,
        owner_id: UserId,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
    ) -> Contest {
        let mut t = self.tables.lock().unwrap();
        let id = t.next_id();
        let contest = Contest {
            id,
            name: format!("contest-{id}"),
            description: None,
            owner_id,
            start_time,
            end_time,
            created_at: Utc::now(),
        };
        t.contests.insert(id, contest.clone());
        t.contest_participants.insert((id, owner_id));
        contest
    }

    pub fn add_problem(&self, owner_id: UserId, scope: &str, belong_to_id: Option<i64>) -> Problem {
        let mut t = self.tables.lock().unwrap();
        let id = t.next_id();
        let problem = Problem {
            id,
            name: format!("problem-{id}"),
            description: String::new(),
            owner_id,
            scope: scope.to_string(),
            belong_to_id,
            created_at: Utc::now(),
        };
        t.problems.insert(id, problem.clone());
        problem
    }

    pub fn add_public_problem(&self, owner_id: UserId) -> Problem {
        self.add_problem(owner_id, problem_scopes::PUBLIC, None)
    }

    pub fn enroll(&self, group_id: i64, user_id: UserId) {
        self.tables.lock().unwrap().group_members.insert((group_id, user_id));
    }

    pub fn is_member(&self, group_id: i64, user_id: UserId) -> bool {
        self.tables.lock().unwrap().group_members.contains(&(group_id, user_id))
    }

    pub fn is_participant(&self, contest_id: i64, user_id: UserId) -> bool {
        self.tables
            .lock()
            .unwrap()
            .contest_participants
            .contains(&(contest_id, user_id))
    }

    pub fn submit_count(&self) -> usize {
        self.tables.lock().unwrap().submits.len()
    }

    pub fn vote_of(&self, user_id: UserId, problem_id: i64) -> Option<Attitude> {
        self.tables.lock().unwrap().votes.get(&(user_id, problem_id)).copied()
    }

    /// Make the next submit insert fail like a database outage
    pub fn fail_next_submit_insert(&self) {
        self.tables.lock().unwrap().fail_submit_insert = true;
    }

    pub fn complete_submit(&self, id: i64, status: &str) {
        let mut t = self.tables.lock().unwrap();
        if let Some(row) = t.submits.iter_mut().find(|s| s.id == id) {
            row.status = status.to_string();
            row.is_complete = true;
        }
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn find_group(&self, id: i64) -> AppResult<Option<Group>> {
        Ok(self.tables.lock().unwrap().groups.get(&id).cloned())
    }

    async fn find_contest(&self, id: i64) -> AppResult<Option<Contest>> {
        Ok(self.tables.lock().unwrap().contests.get(&id).cloned())
    }

    async fn find_problem(&self, id: i64) -> AppResult<Option<Problem>> {
        Ok(self.tables.lock().unwrap().problems.get(&id).cloned())
    }

    async fn is_group_member(&self, group_id: i64, user_id: UserId) -> AppResult<bool> {
        Ok(self.is_member(group_id, user_id))
    }

    async fn is_contest_participant(&self, contest_id: i64, user_id: UserId) -> AppResult<bool> {
        Ok(self.is_participant(contest_id, user_id))
    }

    async fn member_groups_in(&self, user_id: UserId, group_ids: &[i64]) -> AppResult<Vec<i64>> {
        let t = self.tables.lock().unwrap();
        Ok(group_ids
            .iter()
            .copied()
            .filter(|g| t.group_members.contains(&(*g, user_id)))
            .collect())
    }

    async fn add_group_member(&self, group_id: i64, user_id: UserId) -> AppResult<()> {
        if !self.tables.lock().unwrap().group_members.insert((group_id, user_id)) {
            return Err(AppError::AlreadyExists("Already a member of this group".to_string()));
        }
        Ok(())
    }

    async fn add_contest_participant(&self, contest_id: i64, user_id: UserId) -> AppResult<()> {
        let inserted = self
            .tables
            .lock()
            .unwrap()
            .contest_participants
            .insert((contest_id, user_id));
        if !inserted {
            return Err(AppError::AlreadyExists("Already registered for this contest".to_string()));
        }
        Ok(())
    }

    async fn create_submit(&self, submit: NewSubmit) -> AppResult<Submit> {
        let mut t = self.tables.lock().unwrap();
        if std::mem::take(&mut t.fail_submit_insert) {
            return Err(AppError::Database("connection reset".to_string()));
        }
        let id = t.next_id();
        let row = Submit {
            id,
            user_id: submit.user_id,
            problem_id: submit.problem_id,
            language: submit.language,
            source_code: submit.source_code,
            status: verdicts::PENDING.to_string(),
            is_complete: false,
            created_at: Utc::now(),
        };
        t.submits.push(row.clone());
        Ok(row)
    }

    async fn last_submit(
        &self,
        user_id: UserId,
        problem_id: i64,
        filter: LastSubmitFilter,
    ) -> AppResult<Option<Submit>> {
        let t = self.tables.lock().unwrap();
        Ok(t.submits
            .iter()
            .rev()
            .find(|s| {
                s.user_id == user_id
                    && s.problem_id == problem_id
                    && (!filter.need_success || s.is_accepted())
                    && (!filter.need_complete || s.is_complete)
            })
            .cloned())
    }

    async fn find_submit(&self, id: i64) -> AppResult<Option<Submit>> {
        let t = self.tables.lock().unwrap();
        Ok(t.submits.iter().find(|s| s.id == id).cloned())
    }

    async fn save_vote(
        &self,
        user_id: UserId,
        problem_id: i64,
        attitude: Attitude,
    ) -> AppResult<()> {
        self.tables
            .lock()
            .unwrap()
            .votes
            .insert((user_id, problem_id), attitude);
        Ok(())
    }

    async fn reply_target_exists(
        &self,
        problem_id: i64,
        for_comment: i64,
        to_id: Option<UserId>,
    ) -> AppResult<bool> {
        let t = self.tables.lock().unwrap();
        Ok(t.comments.iter().any(|c| {
            c.problem_id == problem_id
                && (c.id == for_comment || c.for_comment == Some(for_comment))
                && to_id.is_none_or(|to| c.from_id == to)
        }))
    }

    async fn create_comment(&self, comment: NewComment) -> AppResult<Comment> {
        let mut t = self.tables.lock().unwrap();
        let id = t.next_id();
        let row = Comment {
            id,
            problem_id: comment.problem_id,
            from_id: comment.from_id,
            to_id: comment.to_id,
            content: comment.content,
            for_comment: comment.for_comment,
            created_at: Utc::now(),
        };
        t.comments.push(row.clone());
        Ok(row)
    }
}
