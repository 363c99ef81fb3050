pub mod manager;
pub mod memory;
pub mod models;
pub mod repository;
pub mod store;

pub use manager::{DatabaseError, DatabaseManager};
pub use memory::MemoryStore;
pub use repository::PgRepository;
pub use store::{RequestStore, RoleOracle, StoreError, UserDirectory, VoteCommit};

use std::sync::Arc;

use crate::config::{AppConfig, StorageBackend};

/// The storage collaborators the services are built on
#[derive(Clone)]
pub struct Backend {
    pub requests: Arc<dyn RequestStore>,
    pub roles: Arc<dyn RoleOracle>,
    pub users: Arc<dyn UserDirectory>,
}

impl Backend {
    pub fn memory(store: Arc<MemoryStore>) -> Self {
        Self {
            requests: store.clone(),
            roles: store.clone(),
            users: store,
        }
    }

    pub fn postgres(repo: PgRepository) -> Self {
        let repo = Arc::new(repo);
        Self {
            requests: repo.clone(),
            roles: repo.clone(),
            users: repo,
        }
    }

    /// Build the backend selected by configuration
    pub async fn from_config(config: &AppConfig) -> Result<Self, DatabaseError> {
        match config.storage.backend {
            StorageBackend::Memory => {
                tracing::warn!("Using in-memory storage; data is lost on restart");
                Ok(Self::memory(Arc::new(MemoryStore::new())))
            }
            StorageBackend::Postgres => {
                let pool = DatabaseManager::main_pool(&config.database).await?;
                Ok(Self::postgres(PgRepository::new(pool)))
            }
        }
    }
}
