use thiserror::Error;

use crate::database::StoreError;

/// Outcome kinds the approval workflow reports to its callers.
/// Storage failures are folded into `PersistenceFailure`.
#[derive(Debug, Error)]
pub enum ApprovalError {
    #[error("You must be signed in.")]
    Unauthenticated,

    #[error("You are already an administrator.")]
    AlreadyAdmin,

    #[error("You already have a pending request.")]
    DuplicateRequest,

    #[error("You are not allowed to do that.")]
    Unauthorized,

    /// Covers both a missing request and one that is already resolved
    #[error("Request not found or already resolved.")]
    RequestNotActionable,

    #[error("You have already voted on this request.")]
    DuplicateVote,

    #[error("You cannot do that to your own account.")]
    SelfModification,

    #[error("{0}")]
    NotFound(String),

    #[error("The change could not be saved, please try again.")]
    PersistenceFailure(#[source] StoreError),
}

impl From<StoreError> for ApprovalError {
    fn from(err: StoreError) -> Self {
        tracing::error!("Approval storage failure: {}", err);
        ApprovalError::PersistenceFailure(err)
    }
}

impl ApprovalError {
    pub fn not_found(message: impl Into<String>) -> Self {
        ApprovalError::NotFound(message.into())
    }
}
