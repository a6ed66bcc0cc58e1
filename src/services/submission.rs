//! Submission coordinator
//!
//! Keeps at most one submission per (user, problem) in flight and hands each
//! grading result to exactly one reader. The in-flight marker lives under
//! `submit-flag:{user}_{problem}`:
//!
//! - absent: nothing running, or the result was already collected
//! - `false`: queued or being graded
//! - `true`: graded, result waiting under `{result_prefix}:{submit_id}`

use std::sync::Arc;
use std::time::Duration;

use crate::{
    cache::{CacheClient, keys},
    config::JudgeConfig,
    constants::{MAX_SOURCE_CODE_SIZE, languages},
    dispatch::TaskDispatcher,
    error::{AppError, AppResult},
    models::{LastSubmitFilter, NewSubmit, Submit, UserId},
    services::ResourceGateway,
};

const MARKER_PENDING: &str = "false";

/// Source submitted for grading
#[derive(Debug, Clone)]
pub struct SubmissionTicket {
    pub problem_id: i64,
    pub language: String,
    pub source_code: String,
}

#[derive(Clone)]
pub struct SubmissionCoordinator {
    gateway: ResourceGateway,
    cache: CacheClient,
    dispatcher: Arc<dyn TaskDispatcher>,
    judge: JudgeConfig,
}

impl SubmissionCoordinator {
    pub fn new(
        gateway: ResourceGateway,
        cache: CacheClient,
        dispatcher: Arc<dyn TaskDispatcher>,
        judge: JudgeConfig,
    ) -> Self {
        Self {
            gateway,
            cache,
            dispatcher,
            judge,
        }
    }

    /// Record a submission and queue it for grading.
    ///
    /// The marker is claimed first so concurrent submits for the same
    /// problem cannot both pass. If the row or the dispatch fails the claim
    /// is released again.
    pub async fn submit(&self, caller: UserId, ticket: SubmissionTicket) -> AppResult<Submit> {
        validate_ticket(&ticket)?;
        self.gateway.get_problem(caller, ticket.problem_id).await?;

        let marker = keys::submit_flag(caller, ticket.problem_id);
        let claimed = self
            .cache
            .set_if_absent(&marker, MARKER_PENDING, self.in_flight_ttl(), "claim submit slot")
            .await?;
        if !claimed {
            return Err(AppError::Conflict(
                "A submission for this problem is still running".to_string(),
            ));
        }

        let submit = match self.record_and_dispatch(caller, ticket).await {
            Ok(submit) => submit,
            Err(e) => {
                if let Err(release) = self.cache.del(&marker, "release submit slot").await {
                    tracing::error!(key = %marker, error = %release, "Failed to release submit slot");
                }
                return Err(e);
            }
        };

        tracing::info!(
            submit_id = submit.id,
            user_id = caller,
            problem_id = submit.problem_id,
            language = %submit.language,
            "Submission accepted"
        );

        Ok(submit)
    }

    async fn record_and_dispatch(&self, caller: UserId, ticket: SubmissionTicket) -> AppResult<Submit> {
        let submit = self
            .gateway
            .store()
            .create_submit(NewSubmit {
                user_id: caller,
                problem_id: ticket.problem_id,
                language: ticket.language,
                source_code: ticket.source_code,
            })
            .await?;

        self.dispatcher.dispatch_grading(submit.id).await?;
        Ok(submit)
    }

    /// Most recent submission of the caller for a problem, optionally
    /// restricted to accepted or graded ones
    pub async fn last_submit(
        &self,
        caller: UserId,
        problem_id: i64,
        filter: LastSubmitFilter,
    ) -> AppResult<Submit> {
        self.gateway.get_problem(caller, problem_id).await?;

        self.gateway
            .store()
            .last_submit(caller, problem_id, filter)
            .await?
            .ok_or_else(|| AppError::NotFound("No submission found".to_string()))
    }

    /// Collect the grading result of the caller's latest submission.
    ///
    /// The result is handed out once; later calls see `NotFound` until the
    /// next submission completes.
    pub async fn get_result(&self, caller: UserId, problem_id: i64) -> AppResult<serde_json::Value> {
        self.gateway.get_problem(caller, problem_id).await?;

        let marker = keys::submit_flag(caller, problem_id);
        let state = self
            .cache
            .get(&marker, "check submit state")
            .await?
            .ok_or_else(|| AppError::NotFound("No submission awaiting a result".to_string()))?;

        if !parse_marker(&state)? {
            return Err(AppError::NotComplete);
        }

        let filter = LastSubmitFilter {
            need_success: false,
            need_complete: true,
        };
        let submit = self
            .gateway
            .store()
            .last_submit(caller, problem_id, filter)
            .await?
            .ok_or_else(|| {
                AppError::internal(format!(
                    "marker {marker} reports completion but no complete submission exists"
                ))
            })?;

        // Read before claiming so a failed read leaves everything retryable
        let result_key = keys::submit_result(&self.judge.result_key_prefix, submit.id);
        let raw = self
            .cache
            .get(&result_key, "read submit result")
            .await?
            .ok_or_else(|| {
                AppError::internal(format!("grading result {result_key} is missing"))
            })?;
        let result: serde_json::Value = serde_json::from_str(&raw).map_err(anyhow::Error::from)?;

        // Whoever removes the marker owns the result
        if self.cache.take(&marker, "claim submit result").await?.is_none() {
            return Err(AppError::NotFound(
                "No submission awaiting a result".to_string(),
            ));
        }

        if let Err(e) = self.cache.del(&result_key, "drop submit result").await {
            tracing::warn!(key = %result_key, error = %e, "Collected result left to expire");
        }

        tracing::info!(submit_id = submit.id, user_id = caller, problem_id, "Grading result collected");

        Ok(result)
    }

    /// Fetch one submission, visible when the caller submitted it and can
    /// still see its problem
    pub async fn get_submit(&self, caller: UserId, submit_id: i64) -> AppResult<Submit> {
        let submit = self
            .gateway
            .store()
            .find_submit(submit_id)
            .await?
            .filter(|s| s.user_id == caller)
            .ok_or_else(|| AppError::NotFound("Submission not found".to_string()))?;

        self.gateway.get_problem(caller, submit.problem_id).await?;
        Ok(submit)
    }

    fn in_flight_ttl(&self) -> Duration {
        Duration::from_secs(self.judge.in_flight_ttl_secs)
    }
}

fn validate_ticket(ticket: &SubmissionTicket) -> AppResult<()> {
    if !languages::ALL.contains(&ticket.language.as_str()) {
        return Err(AppError::Validation(format!(
            "Unsupported language: {}",
            ticket.language
        )));
    }
    if ticket.source_code.trim().is_empty() {
        return Err(AppError::Validation("Source code is empty".to_string()));
    }
    if ticket.source_code.len() > MAX_SOURCE_CODE_SIZE {
        return Err(AppError::Validation(format!(
            "Source code exceeds {MAX_SOURCE_CODE_SIZE} bytes"
        )));
    }
    Ok(())
}

/// `true` once graded
fn parse_marker(raw: &str) -> AppResult<bool> {
    match raw {
        "true" | "1" => Ok(true),
        "false" | "0" => Ok(false),
        other => Err(AppError::internal(format!("unreadable submit marker {other:?}"))),
    }
}
