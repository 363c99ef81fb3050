use std::sync::Arc;
use uuid::Uuid;

use crate::approval::{ApprovalError, RequestLocks};
use crate::database::models::{User, UserSummary};
use crate::database::{Backend, RequestStore, RoleOracle, UserDirectory};

/// User and role management for administrators.
///
/// Demotion is a single administrator's decision; only promotion goes
/// through the unanimous vote.
pub struct AdminService {
    requests: Arc<dyn RequestStore>,
    roles: Arc<dyn RoleOracle>,
    users: Arc<dyn UserDirectory>,
    locks: Arc<RequestLocks>,
}

impl AdminService {
    pub fn new(backend: &Backend, locks: Arc<RequestLocks>) -> Self {
        Self {
            requests: backend.requests.clone(),
            roles: backend.roles.clone(),
            users: backend.users.clone(),
            locks,
        }
    }

    async fn require_admin(&self, actor_id: Uuid) -> Result<(), ApprovalError> {
        if self.users.find_user(actor_id).await?.is_none() || !self.roles.is_admin(actor_id).await? {
            return Err(ApprovalError::Unauthorized);
        }
        Ok(())
    }

    async fn require_user(&self, user_id: Uuid) -> Result<User, ApprovalError> {
        self.users
            .find_user(user_id)
            .await?
            .ok_or_else(|| ApprovalError::not_found("User not found."))
    }

    /// All users with their admin flag, ordered by display name
    pub async fn list_users(&self, actor_id: Uuid) -> Result<Vec<UserSummary>, ApprovalError> {
        self.require_admin(actor_id).await?;
        Ok(self.users.list_users().await?)
    }

    /// Take the administrator role away from `target_id`
    pub async fn remove_administrator(&self, actor_id: Uuid, target_id: Uuid) -> Result<User, ApprovalError> {
        if actor_id == target_id {
            return Err(ApprovalError::SelfModification);
        }
        self.require_admin(actor_id).await?;

        let target = self.require_user(target_id).await?;
        if !self.roles.revoke(target.id).await? {
            return Err(ApprovalError::not_found("User is not an admin."));
        }

        tracing::info!(
            "Admin role removed from {} ({}) by {}",
            target.display_name, target.id, actor_id
        );
        Ok(target)
    }

    /// Delete `target_id` together with every request they made and every
    /// vote they cast
    pub async fn delete_user(&self, actor_id: Uuid, target_id: Uuid) -> Result<User, ApprovalError> {
        if actor_id == target_id {
            return Err(ApprovalError::SelfModification);
        }
        self.require_admin(actor_id).await?;

        let target = self.require_user(target_id).await?;

        // Hold every affected request so no tally runs against a half-purged request
        let involved = self.requests.request_ids_involving(target.id).await?;
        let _guards = self.locks.acquire_many(involved).await;

        let purged = self.requests.purge_user(target.id).await?;
        if !self.users.delete_user(target.id).await? {
            return Err(ApprovalError::not_found("User not found."));
        }

        tracing::info!(
            "User {} ({}) deleted by {}; {} request/approval rows purged",
            target.display_name, target.id, actor_id, purged
        );
        Ok(target)
    }

    /// Register a user record (CLI bootstrap)
    pub async fn create_user(&self, display_name: &str, admin: bool) -> Result<User, ApprovalError> {
        let user = User::new(display_name.trim());
        self.users.create_user(&user).await?;
        if admin {
            self.roles.grant(user.id).await?;
        }
        tracing::info!("Created user {} ({}), admin={}", user.display_name, user.id, admin);
        Ok(user)
    }

    /// Create an administrator named `display_name` when there is none
    pub async fn bootstrap_admin(&self, display_name: &str) -> Result<Option<User>, ApprovalError> {
        if !self.roles.current_administrators().await?.is_empty() {
            return Ok(None);
        }
        self.create_user(display_name, true).await.map(Some)
    }
}
