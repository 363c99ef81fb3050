use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

use crate::approval::{ApprovalEngine, RequestLocks, TallyDecision};
use crate::database::models::{AdminRequest, User};
use crate::database::{Backend, MemoryStore, RequestStore, RoleOracle, StoreError, UserDirectory, VoteCommit};
use crate::services::AdminService;

/// In-memory fixture: a store seeded with administrators plus the services
/// built on it, sharing one lock table
pub struct TestContext {
    pub store: Arc<MemoryStore>,
    pub engine: ApprovalEngine,
    pub admin: AdminService,
    pub admins: Vec<Uuid>,
}

impl TestContext {
    /// Create a context with `count` administrators named `admin-0..`
    pub async fn with_admins(count: usize) -> Self {
        let store = Arc::new(MemoryStore::new());
        let backend = Backend::memory(store.clone());
        let locks = Arc::new(RequestLocks::new());

        let mut ctx = Self {
            engine: ApprovalEngine::new(&backend, locks.clone()),
            admin: AdminService::new(&backend, locks),
            store,
            admins: Vec::new(),
        };

        for i in 0..count {
            let id = ctx.add_admin(&format!("admin-{}", i)).await;
            ctx.admins.push(id);
        }
        ctx
    }

    /// Register a plain user
    pub async fn add_user(&self, name: &str) -> Uuid {
        let user = User::new(name);
        self.store
            .create_user(&user)
            .await
            .expect("memory store accepts new users");
        user.id
    }

    /// Backend over the same store whose vote commits misbehave
    pub fn backend_with(&self, fault: VoteFault) -> Backend {
        Backend {
            requests: Arc::new(FaultyVotes { inner: self.store.clone(), fault }),
            roles: self.store.clone(),
            users: self.store.clone(),
        }
    }

    /// Register a user and grant the admin role outside any vote
    pub async fn add_admin(&self, name: &str) -> Uuid {
        let id = self.add_user(name).await;
        self.store.grant(id).await.expect("grant on known user");
        id
    }
}

/// How `FaultyVotes` treats `apply_vote`
#[derive(Debug, Clone, Copy)]
pub enum VoteFault {
    /// Every commit fails as if the backend went away
    Fail,
    /// Commits succeed after a pause, widening race windows
    Delay(Duration),
}

/// `MemoryStore` wrapper that injects faults into vote commits only
pub struct FaultyVotes {
    inner: Arc<MemoryStore>,
    fault: VoteFault,
}

#[async_trait]
impl RequestStore for FaultyVotes {
    async fn create_request(&self, request: &AdminRequest) -> Result<(), StoreError> {
        self.inner.create_request(request).await
    }
    async fn find_request(&self, id: Uuid) -> Result<Option<AdminRequest>, StoreError> {
        self.inner.find_request(id).await
    }
    async fn find_pending_for_user(&self, id: Uuid) -> Result<Option<AdminRequest>, StoreError> {
        self.inner.find_pending_for_user(id).await
    }
    async fn list_pending(&self) -> Result<Vec<AdminRequest>, StoreError> {
        self.inner.list_pending().await
    }
    async fn apply_vote(&self, commit: &VoteCommit) -> Result<TallyDecision, StoreError> {
        match self.fault {
            VoteFault::Fail => Err(StoreError::Unavailable("disk full".into())),
            VoteFault::Delay(pause) => {
                tokio::time::sleep(pause).await;
                self.inner.apply_vote(commit).await
            }
        }
    }
    async fn request_ids_involving(&self, id: Uuid) -> Result<Vec<Uuid>, StoreError> {
        self.inner.request_ids_involving(id).await
    }
    async fn purge_user(&self, id: Uuid) -> Result<u64, StoreError> {
        self.inner.purge_user(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_context_seeds_admins() {
        let ctx = TestContext::with_admins(3).await;
        assert_eq!(ctx.admins.len(), 3);
        assert_eq!(ctx.store.current_administrators().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_users_are_distinct() {
        let ctx = TestContext::with_admins(0).await;
        let a = ctx.add_user("same").await;
        let b = ctx.add_user("same").await;
        assert_ne!(a, b);
    }
}
