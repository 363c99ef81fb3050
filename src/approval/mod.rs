//! Unanimous admin-approval workflow.
//!
//! A user asks to become an administrator; every current administrator must
//! approve. One rejection settles the request. The elector count is read at
//! each evaluation, so admins joining or leaving mid-vote move the threshold.

pub mod engine;
pub mod error;
pub mod locks;
pub mod tally;

pub use engine::{ApprovalEngine, PendingOverview, PendingRequest, VoteOutcome};
pub use error::ApprovalError;
pub use locks::RequestLocks;
pub use tally::{evaluate, TallyDecision};
