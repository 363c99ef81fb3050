use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::approval::tally::{self, TallyDecision};
use crate::database::models::{AdminRequest, User, UserSummary};
use crate::database::store::{RequestStore, RoleOracle, StoreError, UserDirectory, VoteCommit};

#[derive(Default)]
struct MemoryState {
    users: HashMap<Uuid, User>,
    admins: HashSet<Uuid>,
    requests: HashMap<Uuid, AdminRequest>,
}

/// In-process backend for tests and local development.
/// Every trait method takes the state lock once, so each call is atomic.
#[derive(Default)]
pub struct MemoryStore {
    state: RwLock<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RoleOracle for MemoryStore {
    async fn is_admin(&self, user_id: Uuid) -> Result<bool, StoreError> {
        Ok(self.state.read().await.admins.contains(&user_id))
    }

    async fn current_administrators(&self) -> Result<HashSet<Uuid>, StoreError> {
        Ok(self.state.read().await.admins.clone())
    }

    async fn grant(&self, user_id: Uuid) -> Result<bool, StoreError> {
        let mut state = self.state.write().await;
        if !state.users.contains_key(&user_id) {
            return Err(StoreError::NotFound(format!("user {}", user_id)));
        }
        Ok(state.admins.insert(user_id))
    }

    async fn revoke(&self, user_id: Uuid) -> Result<bool, StoreError> {
        Ok(self.state.write().await.admins.remove(&user_id))
    }
}

#[async_trait]
impl UserDirectory for MemoryStore {
    async fn find_user(&self, user_id: Uuid) -> Result<Option<User>, StoreError> {
        Ok(self.state.read().await.users.get(&user_id).cloned())
    }

    async fn list_users(&self) -> Result<Vec<UserSummary>, StoreError> {
        let state = self.state.read().await;
        let mut users: Vec<UserSummary> = state
            .users
            .values()
            .map(|u| UserSummary {
                id: u.id,
                display_name: u.display_name.clone(),
                created_at: u.created_at,
                is_admin: state.admins.contains(&u.id),
            })
            .collect();
        users.sort_by(|a, b| a.display_name.cmp(&b.display_name).then(a.id.cmp(&b.id)));
        Ok(users)
    }

    async fn create_user(&self, user: &User) -> Result<(), StoreError> {
        let mut state = self.state.write().await;
        if state.users.contains_key(&user.id) {
            return Err(StoreError::Duplicate(format!("user {}", user.id)));
        }
        state.users.insert(user.id, user.clone());
        Ok(())
    }

    async fn delete_user(&self, user_id: Uuid) -> Result<bool, StoreError> {
        let mut state = self.state.write().await;
        state.admins.remove(&user_id);
        Ok(state.users.remove(&user_id).is_some())
    }
}

#[async_trait]
impl RequestStore for MemoryStore {
    async fn create_request(&self, request: &AdminRequest) -> Result<(), StoreError> {
        let mut state = self.state.write().await;
        let has_pending = state
            .requests
            .values()
            .any(|r| r.requester_id == request.requester_id && r.is_pending());
        if has_pending {
            return Err(StoreError::Duplicate(format!(
                "user {} already has a pending request",
                request.requester_id
            )));
        }
        state.requests.insert(request.id, request.clone());
        Ok(())
    }

    async fn find_request(&self, request_id: Uuid) -> Result<Option<AdminRequest>, StoreError> {
        Ok(self.state.read().await.requests.get(&request_id).cloned())
    }

    async fn find_pending_for_user(&self, user_id: Uuid) -> Result<Option<AdminRequest>, StoreError> {
        Ok(self
            .state
            .read()
            .await
            .requests
            .values()
            .find(|r| r.requester_id == user_id && r.is_pending())
            .cloned())
    }

    async fn list_pending(&self) -> Result<Vec<AdminRequest>, StoreError> {
        let state = self.state.read().await;
        let mut pending: Vec<AdminRequest> = state
            .requests
            .values()
            .filter(|r| r.is_pending())
            .cloned()
            .collect();
        pending.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(pending)
    }

    async fn apply_vote(&self, commit: &VoteCommit) -> Result<TallyDecision, StoreError> {
        let approval = &commit.approval;
        let mut guard = self.state.write().await;
        let state = &mut *guard;

        if !state.users.contains_key(&approval.admin_id) || !state.admins.contains(&approval.admin_id) {
            return Err(StoreError::NotEligible(format!("voter {}", approval.admin_id)));
        }

        let request = state
            .requests
            .get_mut(&approval.request_id)
            .ok_or_else(|| StoreError::NotFound(format!("admin request {}", approval.request_id)))?;

        if !request.is_pending() {
            return Err(StoreError::Stale(format!(
                "admin request {} is {}",
                request.id, request.status
            )));
        }
        if request.has_vote_from(approval.admin_id) {
            return Err(StoreError::Duplicate(format!(
                "admin {} already voted on {}",
                approval.admin_id, request.id
            )));
        }

        let mut approvals = request.approvals.clone();
        approvals.push(approval.clone());
        let decision = tally::evaluate(&approvals, state.admins.len());

        // Check before mutating anything so a failure leaves no trace
        if matches!(decision, TallyDecision::Approved { .. }) && !state.users.contains_key(&request.requester_id) {
            return Err(StoreError::NotFound(format!("requester {}", request.requester_id)));
        }

        request.approvals = approvals;
        if decision.is_resolved() {
            request.status = decision.status();
            request.resolved_at = Some(commit.decided_at);
        }
        if matches!(decision, TallyDecision::Approved { .. }) {
            state.admins.insert(request.requester_id);
        }
        Ok(decision)
    }

    async fn request_ids_involving(&self, user_id: Uuid) -> Result<Vec<Uuid>, StoreError> {
        let state = self.state.read().await;
        Ok(state
            .requests
            .values()
            .filter(|r| r.requester_id == user_id || r.has_vote_from(user_id))
            .map(|r| r.id)
            .collect())
    }

    async fn purge_user(&self, user_id: Uuid) -> Result<u64, StoreError> {
        let mut state = self.state.write().await;
        let before = state.requests.len();
        state.requests.retain(|_, r| r.requester_id != user_id);
        let mut removed = (before - state.requests.len()) as u64;

        for request in state.requests.values_mut() {
            let votes = request.approvals.len();
            request.approvals.retain(|a| a.admin_id != user_id);
            removed += (votes - request.approvals.len()) as u64;
        }
        Ok(removed)
    }
}
