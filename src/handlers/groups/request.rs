//! Invitation request DTOs

use serde::Deserialize;
use validator::Validate;

use crate::constants::MAX_INVITE_PASSWORD_LENGTH;

/// Join through an invitation
#[derive(Debug, Default, Deserialize, Validate)]
pub struct JoinRequest {
    #[validate(length(max = MAX_INVITE_PASSWORD_LENGTH))]
    pub password: Option<String>,
}
