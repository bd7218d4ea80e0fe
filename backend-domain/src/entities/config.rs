// Runtime configuration handed to the application layer

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub bind_addr: String,
    pub max_body_bytes: u64,
    pub request_timeout_seconds: u64,
    pub log_page_default: u32,
    pub log_page_max: u32,
    pub player_page_default: u32,
    pub player_page_max: u32,
    pub stream_buffer: usize,
    pub stream_keepalive_seconds: u64,
    pub reconcile_interval_minutes: u64,
    pub reconcile_on_startup: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:4000".to_string(),
            max_body_bytes: 10 * 1024 * 1024,
            request_timeout_seconds: 15,
            log_page_default: 20,
            log_page_max: 200,
            player_page_default: 50,
            player_page_max: 200,
            stream_buffer: 256,
            stream_keepalive_seconds: 15,
            reconcile_interval_minutes: 60,
            reconcile_on_startup: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Postgres,
    Memory,
}

#[derive(Debug, Clone)]
pub struct DbConfig {
    pub backend: StorageBackend,
    pub database_url: Option<String>,
    pub max_connections: u32,
    pub acquire_timeout_seconds: u64,
    pub statement_timeout_seconds: u64,
}
