//! Database repositories
//!
//! Repositories handle all direct database interactions.

pub mod contest_repo;
pub mod feedback_repo;
pub mod group_repo;
pub mod problem_repo;
pub mod submit_repo;

pub use contest_repo::ContestRepository;
pub use feedback_repo::FeedbackRepository;
pub use group_repo::GroupRepository;
pub use problem_repo::ProblemRepository;
pub use submit_repo::SubmitRepository;
