//! Application-wide constants
//!
//! This module contains all constant values used throughout the application.
//! Constants are grouped by their purpose for better organization.

// =============================================================================
// SERVER DEFAULTS
// =============================================================================

/// Default server host address
pub const DEFAULT_SERVER_HOST: &str = "0.0.0.0";

/// Default server port
pub const DEFAULT_SERVER_PORT: u16 = 8080;

/// Default request timeout in seconds
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

// =============================================================================
// DATABASE DEFAULTS
// =============================================================================

/// Default maximum database connections in the pool
pub const DEFAULT_DATABASE_MAX_CONNECTIONS: u32 = 20;

// =============================================================================
// REDIS DEFAULTS
// =============================================================================

/// Default Redis connection URL
pub const DEFAULT_REDIS_URL: &str = "redis://localhost:6379";

// =============================================================================
// JUDGE DEFAULTS
// =============================================================================

/// Redis stream the grading workers consume from
pub const DEFAULT_JUDGE_QUEUE_STREAM: &str = "judge_queue";

/// Name of the grading task carried on the queue
pub const JUDGE_TASK_NAME: &str = "judge";

/// Prefix of the key a worker writes the grading result under
pub const DEFAULT_RESULT_KEY_PREFIX: &str = "submit-result";

/// Lifetime of an in-flight submission marker (1 hour)
pub const DEFAULT_IN_FLIGHT_TTL_SECS: u64 = 3600;

// =============================================================================
// CACHE KEY NAMESPACES
// =============================================================================

/// Namespace for invite payloads
pub const INVITE_KEY_PREFIX: &str = "invite";

/// Namespace for the live invitation of each resource
pub const INVITE_INDEX_KEY_PREFIX: &str = "invite-index";

/// Namespace for in-flight submission markers
pub const SUBMIT_FLAG_KEY_PREFIX: &str = "submit-flag";

// =============================================================================
// INVITATIONS
// =============================================================================

/// Minimum lifetime of a group invitation in seconds (1 hour)
pub const MIN_GROUP_INVITE_TTL_SECS: i64 = 3600;

/// Maximum lifetime of a group invitation in seconds (30 days)
pub const MAX_GROUP_INVITE_TTL_SECS: i64 = 2_592_000;

/// Maximum invitation password length
pub const MAX_INVITE_PASSWORD_LENGTH: u64 = 30;

// =============================================================================
// SUPPORTED LANGUAGES
// =============================================================================

/// Language identifiers
pub mod languages {
    pub const C: &str = "c";
    pub const CPP: &str = "cpp";
    pub const JAVA: &str = "java";
    pub const GO: &str = "go";
    pub const RUST: &str = "rust";
    pub const PYTHON: &str = "python";

    /// All supported language identifiers
    pub const ALL: &[&str] = &[C, CPP, JAVA, GO, RUST, PYTHON];
}

// =============================================================================
// PROBLEM SCOPES
// =============================================================================

/// Who a problem belongs to
pub mod problem_scopes {
    pub const PUBLIC: &str = "public";
    pub const GROUP: &str = "group";
    pub const CONTEST: &str = "contest";
}

// =============================================================================
// SUBMISSION STATUSES
// =============================================================================

/// Submission verdict statuses
pub mod verdicts {
    pub const PENDING: &str = "pending";
    pub const ACCEPTED: &str = "accepted";
}

// =============================================================================
// API VERSIONING
// =============================================================================

/// API base path
pub const API_BASE_PATH: &str = "/api/v1";

// =============================================================================
// VALIDATION
// =============================================================================

/// Maximum source code size in bytes (1 MB)
pub const MAX_SOURCE_CODE_SIZE: usize = 1024 * 1024;

/// Maximum comment length
pub const MAX_COMMENT_LENGTH: u64 = 2000;
