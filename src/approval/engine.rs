use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::approval::error::ApprovalError;
use crate::approval::locks::RequestLocks;
use crate::approval::tally::TallyDecision;
use crate::database::models::{AdminApproval, AdminRequest, User};
use crate::database::{Backend, RequestStore, RoleOracle, StoreError, UserDirectory, VoteCommit};

/// Result of a successfully recorded vote
#[derive(Debug, Clone, Serialize)]
pub struct VoteOutcome {
    pub request_id: Uuid,
    pub requester_id: Uuid,
    pub decision: TallyDecision,
}

impl VoteOutcome {
    /// Human readable summary for the caller
    pub fn summary(&self) -> String {
        match self.decision {
            TallyDecision::Rejected => "Request has been rejected.".to_string(),
            TallyDecision::Approved { .. } => "Request approved! User is now an admin.".to_string(),
            TallyDecision::Pending { approvals, total_admins } => {
                format!("Vote recorded. {}/{} approvals.", approvals, total_admins)
            }
        }
    }
}

/// Pending request with its requester resolved
#[derive(Debug, Clone, Serialize)]
pub struct PendingRequest {
    #[serde(flatten)]
    pub request: AdminRequest,
    pub requester_name: Option<String>,
    pub approval_count: usize,
}

/// Everything the review screen needs in one call
#[derive(Debug, Clone, Serialize)]
pub struct PendingOverview {
    pub total_admins: usize,
    pub requests: Vec<PendingRequest>,
}

/// Lifecycle of admin promotion requests: submission, voting, resolution
pub struct ApprovalEngine {
    requests: Arc<dyn RequestStore>,
    roles: Arc<dyn RoleOracle>,
    users: Arc<dyn UserDirectory>,
    locks: Arc<RequestLocks>,
}

impl ApprovalEngine {
    pub fn new(backend: &Backend, locks: Arc<RequestLocks>) -> Self {
        Self {
            requests: backend.requests.clone(),
            roles: backend.roles.clone(),
            users: backend.users.clone(),
            locks,
        }
    }

    async fn resolve_caller(&self, user_id: Uuid) -> Result<User, ApprovalError> {
        self.users
            .find_user(user_id)
            .await?
            .ok_or(ApprovalError::Unauthenticated)
    }

    /// Run the submission preconditions without writing anything
    pub async fn check_eligibility(&self, requester_id: Uuid) -> Result<User, ApprovalError> {
        let user = self.resolve_caller(requester_id).await?;

        if self.roles.is_admin(user.id).await? {
            return Err(ApprovalError::AlreadyAdmin);
        }

        if self.requests.find_pending_for_user(user.id).await?.is_some() {
            return Err(ApprovalError::DuplicateRequest);
        }

        Ok(user)
    }

    /// Create a pending promotion request for the caller
    pub async fn submit_request(
        &self,
        requester_id: Uuid,
        message: Option<String>,
    ) -> Result<AdminRequest, ApprovalError> {
        let user = self.check_eligibility(requester_id).await?;
        let request = AdminRequest::new(user.id, message.unwrap_or_default());

        match self.requests.create_request(&request).await {
            Ok(()) => {}
            // Lost a race with a concurrent submit from the same user
            Err(StoreError::Duplicate(_)) => return Err(ApprovalError::DuplicateRequest),
            Err(e) => return Err(e.into()),
        }

        tracing::info!(
            "Admin request {} submitted by {} ({})",
            request.id, user.display_name, user.id
        );
        Ok(request)
    }

    async fn require_voter(&self, voter_id: Uuid) -> Result<(), ApprovalError> {
        if self.users.find_user(voter_id).await?.is_none() || !self.roles.is_admin(voter_id).await? {
            return Err(ApprovalError::Unauthorized);
        }
        Ok(())
    }

    /// Record one administrator's vote and resolve the request when decided.
    ///
    /// The read-evaluate-write sequence runs under the request's lock, so
    /// concurrent votes on one request are evaluated one at a time. The store
    /// re-evaluates the tally inside its own commit, which keeps the outcome
    /// right when several processes vote on the same request.
    pub async fn cast_vote(
        &self,
        request_id: Uuid,
        voter_id: Uuid,
        approve: bool,
    ) -> Result<VoteOutcome, ApprovalError> {
        self.require_voter(voter_id).await?;

        let _guard = self.locks.acquire(request_id).await;

        // The voter may have been demoted or deleted while we waited
        self.require_voter(voter_id).await?;

        let request = match self.requests.find_request(request_id).await? {
            Some(request) if request.is_pending() => request,
            _ => return Err(ApprovalError::RequestNotActionable),
        };

        if request.has_vote_from(voter_id) {
            return Err(ApprovalError::DuplicateVote);
        }

        let commit = VoteCommit::new(AdminApproval::new(request.id, voter_id, approve));
        let decision = self.requests.apply_vote(&commit).await.map_err(|err| match err {
            StoreError::NotFound(_) | StoreError::Stale(_) => ApprovalError::RequestNotActionable,
            StoreError::Duplicate(_) => ApprovalError::DuplicateVote,
            StoreError::NotEligible(_) => ApprovalError::Unauthorized,
            other => other.into(),
        })?;

        match decision {
            TallyDecision::Approved { approvals, total_admins } => tracing::info!(
                "Admin request {} approved ({}/{}); {} promoted to administrator",
                request.id, approvals, total_admins, request.requester_id
            ),
            TallyDecision::Rejected => tracing::info!(
                "Admin request {} rejected by {}",
                request.id, voter_id
            ),
            TallyDecision::Pending { approvals, total_admins } => tracing::debug!(
                "Vote by {} on admin request {} recorded ({}/{})",
                voter_id, request.id, approvals, total_admins
            ),
        }

        Ok(VoteOutcome {
            request_id: request.id,
            requester_id: request.requester_id,
            decision,
        })
    }

    /// Pending requests, oldest first, with the current administrator count
    pub async fn list_pending(&self, actor_id: Uuid) -> Result<PendingOverview, ApprovalError> {
        if !self.roles.is_admin(actor_id).await? {
            return Err(ApprovalError::Unauthorized);
        }

        let total_admins = self.roles.current_administrators().await?.len();
        let mut requests = Vec::new();
        for request in self.requests.list_pending().await? {
            let requester_name = self
                .users
                .find_user(request.requester_id)
                .await?
                .map(|u| u.display_name);
            requests.push(PendingRequest {
                approval_count: request.approval_count(),
                requester_name,
                request,
            });
        }

        Ok(PendingOverview { total_admins, requests })
    }
}
