use async_trait::async_trait;
use sqlx::PgPool;
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

use crate::approval::tally::{self, TallyDecision};
use crate::database::manager::DatabaseManager;
use crate::database::models::admin_request::AdminRequestRow;
use crate::database::models::{AdminApproval, AdminRequest, User, UserSummary};
use crate::database::store::{RequestStore, RoleOracle, StoreError, UserDirectory, VoteCommit};
use crate::types::{RequestStatus, ADMIN_ROLE};

const REQUEST_COLUMNS: &str =
    "id, requester_id, message, status, created_at, resolved_at";
const APPROVAL_COLUMNS: &str = "id, request_id, admin_id, decision, created_at";

/// PostgreSQL implementation of every storage collaborator
#[derive(Clone)]
pub struct PgRepository {
    pool: PgPool,
}

impl PgRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Attach approvals (in insertion order) to a batch of request rows
    async fn hydrate(&self, rows: Vec<AdminRequestRow>) -> Result<Vec<AdminRequest>, StoreError> {
        if rows.is_empty() {
            return Ok(vec![]);
        }

        let ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();
        let approvals = sqlx::query_as::<_, AdminApproval>(&format!(
            "SELECT {} FROM admin_approvals WHERE request_id = ANY($1) ORDER BY created_at, id",
            APPROVAL_COLUMNS
        ))
        .bind(&ids)
        .fetch_all(&self.pool)
        .await?;

        let mut grouped: HashMap<Uuid, Vec<AdminApproval>> = HashMap::new();
        for approval in approvals {
            grouped.entry(approval.request_id).or_default().push(approval);
        }

        rows.into_iter()
            .map(|row| {
                let approvals = grouped.remove(&row.id).unwrap_or_default();
                row.into_request(approvals).map_err(StoreError::Corrupt)
            })
            .collect()
    }

    async fn hydrate_one(&self, row: Option<AdminRequestRow>) -> Result<Option<AdminRequest>, StoreError> {
        match row {
            Some(row) => Ok(self.hydrate(vec![row]).await?.into_iter().next()),
            None => Ok(None),
        }
    }
}

#[async_trait]
impl RoleOracle for PgRepository {
    async fn is_admin(&self, user_id: Uuid) -> Result<bool, StoreError> {
        let count: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM user_roles WHERE user_id = $1 AND role = $2",
        )
        .bind(user_id)
        .bind(ADMIN_ROLE)
        .fetch_one(&self.pool)
        .await?;

        Ok(count.0 > 0)
    }

    async fn current_administrators(&self) -> Result<HashSet<Uuid>, StoreError> {
        let rows: Vec<(Uuid,)> = sqlx::query_as("SELECT user_id FROM user_roles WHERE role = $1")
            .bind(ADMIN_ROLE)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(|(id,)| id).collect())
    }

    async fn grant(&self, user_id: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query(
            "INSERT INTO user_roles (user_id, role) VALUES ($1, $2) ON CONFLICT DO NOTHING",
        )
        .bind(user_id)
        .bind(ADMIN_ROLE)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn revoke(&self, user_id: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM user_roles WHERE user_id = $1 AND role = $2")
            .bind(user_id)
            .bind(ADMIN_ROLE)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl UserDirectory for PgRepository {
    async fn find_user(&self, user_id: Uuid) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, display_name, created_at FROM users WHERE id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn list_users(&self) -> Result<Vec<UserSummary>, StoreError> {
        let users = sqlx::query_as::<_, UserSummary>(
            r#"
            SELECT u.id, u.display_name, u.created_at,
                   EXISTS (
                       SELECT 1 FROM user_roles r
                       WHERE r.user_id = u.id AND r.role = $1
                   ) AS is_admin
            FROM users u
            ORDER BY u.display_name, u.id
            "#,
        )
        .bind(ADMIN_ROLE)
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }

    async fn create_user(&self, user: &User) -> Result<(), StoreError> {
        sqlx::query("INSERT INTO users (id, display_name, created_at) VALUES ($1, $2, $3)")
            .bind(user.id)
            .bind(&user.display_name)
            .bind(user.created_at)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn delete_user(&self, user_id: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl RequestStore for PgRepository {
    async fn create_request(&self, request: &AdminRequest) -> Result<(), StoreError> {
        // admin_requests_one_pending turns a concurrent second submit into a unique violation
        sqlx::query(
            r#"
            INSERT INTO admin_requests (id, requester_id, message, status, created_at, resolved_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(request.id)
        .bind(request.requester_id)
        .bind(&request.message)
        .bind(request.status.as_str())
        .bind(request.created_at)
        .bind(request.resolved_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_request(&self, request_id: Uuid) -> Result<Option<AdminRequest>, StoreError> {
        let row = sqlx::query_as::<_, AdminRequestRow>(&format!(
            "SELECT {} FROM admin_requests WHERE id = $1",
            REQUEST_COLUMNS
        ))
        .bind(request_id)
        .fetch_optional(&self.pool)
        .await?;

        self.hydrate_one(row).await
    }

    async fn find_pending_for_user(&self, user_id: Uuid) -> Result<Option<AdminRequest>, StoreError> {
        let row = sqlx::query_as::<_, AdminRequestRow>(&format!(
            "SELECT {} FROM admin_requests WHERE requester_id = $1 AND status = $2",
            REQUEST_COLUMNS
        ))
        .bind(user_id)
        .bind(RequestStatus::Pending.as_str())
        .fetch_optional(&self.pool)
        .await?;

        self.hydrate_one(row).await
    }

    async fn list_pending(&self) -> Result<Vec<AdminRequest>, StoreError> {
        let rows = sqlx::query_as::<_, AdminRequestRow>(&format!(
            "SELECT {} FROM admin_requests WHERE status = $1 ORDER BY created_at, id",
            REQUEST_COLUMNS
        ))
        .bind(RequestStatus::Pending.as_str())
        .fetch_all(&self.pool)
        .await?;

        self.hydrate(rows).await
    }

    async fn apply_vote(&self, commit: &VoteCommit) -> Result<TallyDecision, StoreError> {
        let approval = &commit.approval;
        let mut tx = self.pool.begin().await?;

        // Row lock serializes every writer of this request, across processes,
        // until commit. Reads below see all votes committed before it.
        let locked: Option<(String, Uuid)> = sqlx::query_as(
            "SELECT status, requester_id FROM admin_requests WHERE id = $1 FOR UPDATE",
        )
        .bind(approval.request_id)
        .fetch_optional(&mut *tx)
        .await?;

        let requester_id = match locked {
            None => {
                return Err(StoreError::NotFound(format!(
                    "admin request {}",
                    approval.request_id
                )))
            }
            Some((status, _)) if status != RequestStatus::Pending.as_str() => {
                return Err(StoreError::Stale(format!(
                    "admin request {} is {}",
                    approval.request_id, status
                )))
            }
            Some((_, requester_id)) => requester_id,
        };

        // FOR KEY SHARE holds the voter's row so a concurrent delete waits for us
        let eligible: Option<(Uuid,)> = sqlx::query_as(
            r#"
            SELECT u.id FROM users u
            JOIN user_roles r ON r.user_id = u.id AND r.role = $2
            WHERE u.id = $1
            FOR KEY SHARE OF u
            "#,
        )
        .bind(approval.admin_id)
        .bind(ADMIN_ROLE)
        .fetch_optional(&mut *tx)
        .await?;

        if eligible.is_none() {
            return Err(StoreError::NotEligible(format!("voter {}", approval.admin_id)));
        }

        sqlx::query(&format!(
            "INSERT INTO admin_approvals ({}) VALUES ($1, $2, $3, $4, $5)",
            APPROVAL_COLUMNS
        ))
        .bind(approval.id)
        .bind(approval.request_id)
        .bind(approval.admin_id)
        .bind(approval.decision)
        .bind(approval.created_at)
        .execute(&mut *tx)
        .await?;

        let approvals = sqlx::query_as::<_, AdminApproval>(&format!(
            "SELECT {} FROM admin_approvals WHERE request_id = $1",
            APPROVAL_COLUMNS
        ))
        .bind(approval.request_id)
        .fetch_all(&mut *tx)
        .await?;

        let total_admins: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM user_roles WHERE role = $1")
            .bind(ADMIN_ROLE)
            .fetch_one(&mut *tx)
            .await?;

        let decision = tally::evaluate(&approvals, total_admins.0.max(0) as usize);

        if decision.is_resolved() {
            sqlx::query("UPDATE admin_requests SET status = $2, resolved_at = $3 WHERE id = $1")
                .bind(approval.request_id)
                .bind(decision.status().as_str())
                .bind(commit.decided_at)
                .execute(&mut *tx)
                .await?;
        }

        if matches!(decision, TallyDecision::Approved { .. }) {
            sqlx::query(
                "INSERT INTO user_roles (user_id, role) VALUES ($1, $2) ON CONFLICT DO NOTHING",
            )
            .bind(requester_id)
            .bind(ADMIN_ROLE)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(decision)
    }

    async fn request_ids_involving(&self, user_id: Uuid) -> Result<Vec<Uuid>, StoreError> {
        let rows: Vec<(Uuid,)> = sqlx::query_as(
            r#"
            SELECT id FROM admin_requests WHERE requester_id = $1
            UNION
            SELECT request_id FROM admin_approvals WHERE admin_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|(id,)| id).collect())
    }

    async fn purge_user(&self, user_id: Uuid) -> Result<u64, StoreError> {
        let mut tx = self.pool.begin().await?;

        // Approvals on the user's own requests go with them via ON DELETE CASCADE
        let requests = sqlx::query("DELETE FROM admin_requests WHERE requester_id = $1")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        let approvals = sqlx::query("DELETE FROM admin_approvals WHERE admin_id = $1")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(requests.rows_affected() + approvals.rows_affected())
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        DatabaseManager::health_check(&self.pool).await?;
        Ok(())
    }
}
