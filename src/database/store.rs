use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashSet;
use thiserror::Error;
use uuid::Uuid;

use crate::approval::tally::TallyDecision;
use crate::database::manager::DatabaseError;
use crate::database::models::{AdminApproval, AdminRequest, User, UserSummary};

/// Errors surfaced by storage backends
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Not found: {0}")]
    NotFound(String),

    /// A uniqueness rule rejected the write
    #[error("Duplicate: {0}")]
    Duplicate(String),

    /// The row exists but is no longer in the state the write expects
    #[error("Stale state: {0}")]
    Stale(String),

    /// The voter is unknown or no longer holds the admin role
    #[error("Not eligible: {0}")]
    NotEligible(String),

    #[error("Corrupt data: {0}")]
    Corrupt(String),

    #[error("Backend unavailable: {0}")]
    Unavailable(String),

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                StoreError::Duplicate(db.message().to_string())
            }
            _ => StoreError::Database(DatabaseError::Sqlx(err)),
        }
    }
}

/// One vote to record. The backend evaluates the tally itself, under the
/// same lock or transaction that inserts the approval, and applies the
/// resulting status change and role grant all-or-nothing.
#[derive(Debug, Clone)]
pub struct VoteCommit {
    pub approval: AdminApproval,
    /// Stamped as `resolved_at` when the vote decides the request
    pub decided_at: DateTime<Utc>,
}

impl VoteCommit {
    pub fn new(approval: AdminApproval) -> Self {
        Self {
            approval,
            decided_at: Utc::now(),
        }
    }
}

/// Answers role questions and mutates the administrator set.
/// Reads must reflect committed grants and revocations immediately.
#[async_trait]
pub trait RoleOracle: Send + Sync {
    async fn is_admin(&self, user_id: Uuid) -> Result<bool, StoreError>;

    async fn current_administrators(&self) -> Result<HashSet<Uuid>, StoreError>;

    /// Returns `true` when the role was not held before
    async fn grant(&self, user_id: Uuid) -> Result<bool, StoreError>;

    /// Returns `true` when the role was held before
    async fn revoke(&self, user_id: Uuid) -> Result<bool, StoreError>;
}

/// Identity records
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn find_user(&self, user_id: Uuid) -> Result<Option<User>, StoreError>;

    /// All users ordered by display name
    async fn list_users(&self) -> Result<Vec<UserSummary>, StoreError>;

    async fn create_user(&self, user: &User) -> Result<(), StoreError>;

    /// Returns `true` when a record was removed
    async fn delete_user(&self, user_id: Uuid) -> Result<bool, StoreError>;
}

/// Persistence for admin requests and their approvals
#[async_trait]
pub trait RequestStore: Send + Sync {
    /// Inserts a new pending request. Fails with `Duplicate` when the
    /// requester already has a pending one.
    async fn create_request(&self, request: &AdminRequest) -> Result<(), StoreError>;

    async fn find_request(&self, request_id: Uuid) -> Result<Option<AdminRequest>, StoreError>;

    async fn find_pending_for_user(&self, user_id: Uuid) -> Result<Option<AdminRequest>, StoreError>;

    /// Pending requests, oldest first, approvals included
    async fn list_pending(&self) -> Result<Vec<AdminRequest>, StoreError>;

    /// Records the approval, re-evaluates the tally against the live
    /// administrator count and, when decided, resolves the request and grants
    /// the requester the admin role. All of it commits or none of it does.
    ///
    /// `NotFound` when the request is gone, `Stale` when it is no longer
    /// pending, `NotEligible` when the voter is not a current administrator,
    /// `Duplicate` when the admin already voted.
    async fn apply_vote(&self, commit: &VoteCommit) -> Result<TallyDecision, StoreError>;

    /// Ids of requests the user made or voted on
    async fn request_ids_involving(&self, user_id: Uuid) -> Result<Vec<Uuid>, StoreError>;

    /// Deletes requests made by the user and approvals cast by the user.
    /// Returns the number of rows removed.
    async fn purge_user(&self, user_id: Uuid) -> Result<u64, StoreError>;

    async fn health_check(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
