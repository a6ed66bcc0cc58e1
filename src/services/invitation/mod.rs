//! Invitation tokens
//!
//! A group or contest owner can hand out one live invitation per resource.
//! The token lives only in the cache; re-issuing while it is live returns
//! the same token with its original lifetime.

mod coordinator;
mod targets;

pub use coordinator::{InviteCoordinator, InviteTarget};
pub use targets::{ContestInvites, GroupInvites};

use serde::Deserialize;
use validator::Validate;

use crate::constants::MAX_INVITE_PASSWORD_LENGTH;

/// Parameters of a new invitation
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct InviteRequest {
    #[validate(length(max = MAX_INVITE_PASSWORD_LENGTH))]
    pub password: Option<String>,

    /// Lifetime in seconds, group invitations only
    pub timeout: Option<i64>,

    /// Groups whose members skip the password, contest invitations only
    #[serde(default)]
    pub allow_groups: Vec<i64>,
}
