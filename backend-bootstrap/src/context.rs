use std::sync::Arc;

use anyhow::Result;
use tracing::{info, warn};

use backend_application::AppState;
use backend_domain::StorageBackend;
use backend_infrastructure::{AppConfig, MemoryStore, PostgresRepo};

pub struct AppContext {
    pub state: AppState,
    postgres: Option<PostgresRepo>,
}

impl AppContext {
    pub async fn new(config: &AppConfig) -> Result<Self> {
        let runtime_config = config.to_runtime_config();
        let db_config = config.to_db_config();

        let context = match db_config.backend {
            StorageBackend::Postgres => {
                let repo = PostgresRepo::connect(&db_config).await?;
                repo.ensure_schema().await?;
                info!("postgres schema ensured");
                let shared = Arc::new(repo.clone());
                Self {
                    state: AppState::new(runtime_config, shared.clone(), shared.clone(), shared),
                    postgres: Some(repo),
                }
            }
            StorageBackend::Memory => {
                warn!("using the in-memory store; nothing survives a restart");
                let store = Arc::new(MemoryStore::new());
                Self {
                    state: AppState::new(runtime_config, store.clone(), store.clone(), store),
                    postgres: None,
                }
            }
        };
        Ok(context)
    }

    /// Closes the connection pool once the server has drained.
    pub async fn shutdown(&self) {
        if let Some(repo) = &self.postgres {
            repo.close().await;
            info!("postgres pool closed");
        }
    }
}
