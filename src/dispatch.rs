//! Grading task dispatch
//!
//! Submissions are graded out of process. The API only enqueues a `judge`
//! task naming the submit id on a Redis stream; a worker picks it up, grades
//! the submission and reports back through the cache.

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use serde::{Deserialize, Serialize};

use crate::constants::JUDGE_TASK_NAME;

/// Failure to hand a task to the queue
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("redis command failed: {0}")]
    Redis(#[from] redis::RedisError),
}

/// Grading task as carried on the queue
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JudgeTask {
    pub name: String,
    pub submit_id: i64,
}

impl JudgeTask {
    pub fn new(submit_id: i64) -> Self {
        Self {
            name: JUDGE_TASK_NAME.to_string(),
            submit_id,
        }
    }
}

/// Fire-and-forget hand-off to the grading workers
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TaskDispatcher: Send + Sync {
    /// Enqueue a grading task. Success means the task was accepted by the
    /// queue, not that it has been graded.
    async fn dispatch_grading(&self, submit_id: i64) -> Result<(), DispatchError>;
}

/// Dispatcher appending tasks to a Redis stream
#[derive(Clone)]
pub struct RedisStreamDispatcher {
    conn: ConnectionManager,
    stream: String,
}

impl RedisStreamDispatcher {
    pub fn new(conn: ConnectionManager, stream: impl Into<String>) -> Self {
        Self {
            conn,
            stream: stream.into(),
        }
    }
}

#[async_trait]
impl TaskDispatcher for RedisStreamDispatcher {
    async fn dispatch_grading(&self, submit_id: i64) -> Result<(), DispatchError> {
        let task = JudgeTask::new(submit_id);
        let mut conn = self.conn.clone();

        let stream_id: String = redis::cmd("XADD")
            .arg(&self.stream)
            .arg("*")
            .arg("task")
            .arg(&task.name)
            .arg("submit_id")
            .arg(task.submit_id.to_string())
            .query_async(&mut conn)
            .await?;

        tracing::info!(
            submit_id = task.submit_id,
            stream = %self.stream,
            stream_id = %stream_id,
            "Submission queued for grading"
        );

        Ok(())
    }
}
