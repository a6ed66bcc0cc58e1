//! Invitation models
//!
//! An [`InviteToken`] lives only in the cache. Its lifetime is the TTL of the
//! cache entry; once it expires the resource is back to having no invitation.

use serde::{Deserialize, Serialize};

/// Kind of resource an invitation grants access to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Group,
    Contest,
}

impl ResourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Group => "group",
            Self::Contest => "contest",
        }
    }
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Invitation payload stored under `invite:{id}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InviteToken {
    pub id: String,
    pub resource_type: ResourceKind,
    pub resource_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    pub ttl_seconds: i64,
    /// Groups whose members may join a contest without the password
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allowed_groups: Option<Vec<i64>>,
}

impl InviteToken {
    /// Password required to join, ignoring empty strings
    pub fn required_password(&self) -> Option<&str> {
        self.password.as_deref().filter(|p| !p.is_empty())
    }
}

/// Result of resolving an invitation for a prospective member.
///
/// The password is kept for the join check but never serialized.
#[derive(Debug, Clone, Serialize)]
pub struct JoinResult<R> {
    #[serde(flatten)]
    pub resource: R,
    pub need_password: bool,
    #[serde(skip)]
    pub password: Option<String>,
}
