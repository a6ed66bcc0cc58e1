//! Domain models
//!
//! This module contains all domain models used throughout the application.

pub mod contest;
pub mod feedback;
pub mod group;
pub mod invite;
pub mod problem;
pub mod submit;

pub use contest::*;
pub use feedback::*;
pub use group::*;
pub use invite::*;
pub use problem::*;
pub use submit::*;

/// Identifier of an authenticated user
pub type UserId = i64;
