use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::types::RequestStatus;

/// A user's request to be promoted to administrator.
/// Owns its approvals; they are kept in insertion order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminRequest {
    pub id: Uuid,
    pub requester_id: Uuid,
    pub message: String,
    pub status: RequestStatus,
    pub created_at: DateTime<Utc>,
    pub resolved_at: Option<DateTime<Utc>>,
    pub approvals: Vec<AdminApproval>,
}

impl AdminRequest {
    pub fn new(requester_id: Uuid, message: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            requester_id,
            message: message.into(),
            status: RequestStatus::Pending,
            created_at: Utc::now(),
            resolved_at: None,
            approvals: Vec::new(),
        }
    }

    pub fn is_pending(&self) -> bool {
        self.status == RequestStatus::Pending
    }

    pub fn has_vote_from(&self, admin_id: Uuid) -> bool {
        self.approvals.iter().any(|a| a.admin_id == admin_id)
    }

    pub fn approval_count(&self) -> usize {
        self.approvals.iter().filter(|a| a.decision).count()
    }
}

/// One administrator's vote on a request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct AdminApproval {
    pub id: Uuid,
    pub request_id: Uuid,
    pub admin_id: Uuid,
    pub decision: bool,
    pub created_at: DateTime<Utc>,
}

impl AdminApproval {
    pub fn new(request_id: Uuid, admin_id: Uuid, decision: bool) -> Self {
        Self {
            id: Uuid::new_v4(),
            request_id,
            admin_id,
            decision,
            created_at: Utc::now(),
        }
    }
}

/// Row shape of `admin_requests`; approvals are loaded separately
#[derive(Debug, Clone, FromRow)]
pub(crate) struct AdminRequestRow {
    pub id: Uuid,
    pub requester_id: Uuid,
    pub message: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub resolved_at: Option<DateTime<Utc>>,
}

impl AdminRequestRow {
    pub(crate) fn into_request(self, approvals: Vec<AdminApproval>) -> Result<AdminRequest, String> {
        Ok(AdminRequest {
            id: self.id,
            requester_id: self.requester_id,
            message: self.message,
            status: self.status.parse()?,
            created_at: self.created_at,
            resolved_at: self.resolved_at,
            approvals,
        })
    }
}
