use serde::Serialize;

use crate::database::models::AdminApproval;
use crate::types::RequestStatus;

/// What a request's votes add up to against the current elector count
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "lowercase")]
pub enum TallyDecision {
    Pending { approvals: usize, total_admins: usize },
    Approved { approvals: usize, total_admins: usize },
    Rejected,
}

impl TallyDecision {
    pub fn status(&self) -> RequestStatus {
        match self {
            TallyDecision::Pending { .. } => RequestStatus::Pending,
            TallyDecision::Approved { .. } => RequestStatus::Approved,
            TallyDecision::Rejected => RequestStatus::Rejected,
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.status().is_terminal()
    }
}

/// Evaluate a request's votes.
///
/// Any rejecting vote decides the request. Otherwise it is approved once the
/// approving votes reach `total_admins`, the size of the administrator set
/// at evaluation time. Votes from admins who have since left still count.
/// Without a single approving vote nothing is approved, even with no admins.
pub fn evaluate(approvals: &[AdminApproval], total_admins: usize) -> TallyDecision {
    if approvals.iter().any(|a| !a.decision) {
        return TallyDecision::Rejected;
    }

    let count = approvals.len();
    if count > 0 && count >= total_admins {
        TallyDecision::Approved { approvals: count, total_admins }
    } else {
        TallyDecision::Pending { approvals: count, total_admins }
    }
}
