//! Business logic services

pub mod feedback;
pub mod invitation;
pub mod resource_gateway;
pub mod submission;

pub use feedback::FeedbackService;
pub use invitation::{ContestInvites, GroupInvites, InviteCoordinator, InviteRequest};
pub use resource_gateway::ResourceGateway;
pub use submission::{SubmissionCoordinator, SubmissionTicket};
