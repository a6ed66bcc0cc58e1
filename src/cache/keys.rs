//! Cache key layout
//!
//! Keys are namespaced by prefix so the invitation and submission
//! coordinators never collide:
//!
//! - `invite:{token_id}` holds the JSON invite payload
//! - `invite-index:{kind}:{resource_id}` holds the live token id of a resource
//! - `submit-flag:{user_id}_{problem_id}` is the in-flight marker
//! - `{result_prefix}:{submit_id}` is the grading result written by a worker

use crate::constants::{INVITE_INDEX_KEY_PREFIX, INVITE_KEY_PREFIX, SUBMIT_FLAG_KEY_PREFIX};
use crate::models::{ResourceKind, UserId};

pub fn invite_token(token_id: &str) -> String {
    format!("{INVITE_KEY_PREFIX}:{token_id}")
}

pub fn invite_index(kind: ResourceKind, resource_id: i64) -> String {
    format!("{INVITE_INDEX_KEY_PREFIX}:{}:{resource_id}", kind.as_str())
}

pub fn submit_flag(user_id: UserId, problem_id: i64) -> String {
    format!("{SUBMIT_FLAG_KEY_PREFIX}:{user_id}_{problem_id}")
}

pub fn submit_result(prefix: &str, submit_id: i64) -> String {
    format!("{prefix}:{submit_id}")
}
