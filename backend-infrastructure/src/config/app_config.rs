use std::env;
use std::path::Path;

use anyhow::{anyhow, Result};
use serde::Deserialize;
use tokio::fs;
use tracing::warn;

use backend_domain::{DbConfig, RuntimeConfig, StorageBackend};

use crate::config::validate_database_url;

pub const CONFIG_ENV: &str = "EMPIRE_CONFIG";

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct AppConfig {
    pub bind_addr: String,
    pub storage_backend: StorageBackend,
    pub database_url: Option<String>,
    pub db_max_connections: u32,
    pub db_acquire_timeout_seconds: u64,
    pub db_statement_timeout_seconds: u64,
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
    pub log_dir: Option<String>,
    pub log_json: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        let runtime = RuntimeConfig::default();
        Self {
            bind_addr: runtime.bind_addr,
            storage_backend: StorageBackend::Postgres,
            database_url: None,
            db_max_connections: 10,
            db_acquire_timeout_seconds: 5,
            db_statement_timeout_seconds: 10,
            max_body_bytes: runtime.max_body_bytes,
            request_timeout_seconds: runtime.request_timeout_seconds,
            log_page_default: runtime.log_page_default,
            log_page_max: runtime.log_page_max,
            player_page_default: runtime.player_page_default,
            player_page_max: runtime.player_page_max,
            stream_buffer: runtime.stream_buffer,
            stream_keepalive_seconds: runtime.stream_keepalive_seconds,
            reconcile_interval_minutes: runtime.reconcile_interval_minutes,
            reconcile_on_startup: runtime.reconcile_on_startup,
            log_dir: None,
            log_json: false,
        }
    }
}

impl AppConfig {
    pub async fn load() -> Result<Self> {
        Self::load_from(None).await
    }

    /// An explicit path (from `--config`) wins over `EMPIRE_CONFIG`.
    pub async fn load_from(explicit: Option<&str>) -> Result<Self> {
        let path = match explicit {
            Some(path) => path.to_string(),
            None => env::var(CONFIG_ENV).unwrap_or_else(|_| "./config.toml".to_string()),
        };
        let file_path = Path::new(&path);
        let mut config = if file_path.exists() {
            let content = fs::read_to_string(file_path).await?;
            Self::from_toml(&content)?
        } else {
            warn!(path = %path, "config file not found, using defaults");
            AppConfig::default()
        };
        config.apply_overrides(|key| env::var(key).ok());
        config.resolve_paths(file_path.parent());
        config.normalize();
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn normalize(&mut self) {
        if let Some(url) = &self.database_url {
            if url.trim().is_empty() {
                self.database_url = None;
            }
        }
        if let Some(dir) = &self.log_dir {
            if dir.trim().is_empty() {
                self.log_dir = None;
            }
        }
    }

    fn resolve_paths(&mut self, base_dir: Option<&Path>) {
        let Some(base) = base_dir else {
            return;
        };
        if let Some(dir) = &self.log_dir {
            self.log_dir = Some(resolve_path(base, dir));
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.bind_addr
            .parse::<std::net::SocketAddr>()
            .map_err(|err| anyhow!("invalid bind_addr: {}", err))?;
        if self.max_body_bytes == 0 {
            return Err(anyhow!("max_body_bytes must be greater than 0"));
        }
        if self.db_max_connections == 0 {
            return Err(anyhow!("db_max_connections must be greater than 0"));
        }
        if self.log_page_max == 0 || self.log_page_default > self.log_page_max {
            return Err(anyhow!("log_page_default must be within 1..=log_page_max"));
        }
        if self.player_page_max == 0 || self.player_page_default > self.player_page_max {
            return Err(anyhow!("player_page_default must be within 1..=player_page_max"));
        }
        if self.stream_buffer < 2 {
            return Err(anyhow!("stream_buffer must be at least 2"));
        }
        if self.storage_backend == StorageBackend::Postgres {
            let url = self
                .database_url
                .as_deref()
                .ok_or_else(|| anyhow!("database_url is required for the postgres backend"))?;
            validate_database_url(url)?;
        }
        Ok(())
    }

    pub fn to_runtime_config(&self) -> RuntimeConfig {
        RuntimeConfig {
            bind_addr: self.bind_addr.clone(),
            max_body_bytes: self.max_body_bytes,
            request_timeout_seconds: self.request_timeout_seconds,
            log_page_default: self.log_page_default,
            log_page_max: self.log_page_max,
            player_page_default: self.player_page_default,
            player_page_max: self.player_page_max,
            stream_buffer: self.stream_buffer,
            stream_keepalive_seconds: self.stream_keepalive_seconds,
            reconcile_interval_minutes: self.reconcile_interval_minutes,
            reconcile_on_startup: self.reconcile_on_startup,
        }
    }

    pub fn to_db_config(&self) -> DbConfig {
        DbConfig {
            backend: self.storage_backend,
            database_url: self.database_url.clone(),
            max_connections: self.db_max_connections,
            acquire_timeout_seconds: self.db_acquire_timeout_seconds,
            statement_timeout_seconds: self.db_statement_timeout_seconds,
        }
    }

    /// `EMPIRE_*` variables win over the file; `DATABASE_URL` and `PORT`
    /// are honoured for hosting platforms that only set those.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(value) = lookup("PORT") {
            if let Ok(port) = value.trim().parse::<u16>() {
                self.bind_addr = format!("0.0.0.0:{}", port);
            }
        }
        if let Some(value) = lookup("EMPIRE_BIND_ADDR") {
            self.bind_addr = value;
        }
        if let Some(value) = lookup("EMPIRE_STORAGE_BACKEND") {
            match value.trim().to_lowercase().as_str() {
                "postgres" => self.storage_backend = StorageBackend::Postgres,
                "memory" => self.storage_backend = StorageBackend::Memory,
                other => warn!(value = other, "ignoring unknown EMPIRE_STORAGE_BACKEND"),
            }
        }
        if let Some(value) = lookup("DATABASE_URL") {
            self.database_url = Some(value);
        }
        if let Some(value) = lookup("EMPIRE_DATABASE_URL") {
            self.database_url = Some(value);
        }
        if let Some(value) = lookup("EMPIRE_DB_MAX_CONNECTIONS") {
            self.db_max_connections = value.parse().unwrap_or(self.db_max_connections);
        }
        if let Some(value) = lookup("EMPIRE_DB_ACQUIRE_TIMEOUT_SECONDS") {
            self.db_acquire_timeout_seconds =
                value.parse().unwrap_or(self.db_acquire_timeout_seconds);
        }
        if let Some(value) = lookup("EMPIRE_DB_STATEMENT_TIMEOUT_SECONDS") {
            self.db_statement_timeout_seconds =
                value.parse().unwrap_or(self.db_statement_timeout_seconds);
        }
        if let Some(value) = lookup("EMPIRE_MAX_BODY_BYTES") {
            self.max_body_bytes = value.parse().unwrap_or(self.max_body_bytes);
        }
        if let Some(value) = lookup("EMPIRE_REQUEST_TIMEOUT_SECONDS") {
            self.request_timeout_seconds = value.parse().unwrap_or(self.request_timeout_seconds);
        }
        if let Some(value) = lookup("EMPIRE_LOG_PAGE_DEFAULT") {
            self.log_page_default = value.parse().unwrap_or(self.log_page_default);
        }
        if let Some(value) = lookup("EMPIRE_LOG_PAGE_MAX") {
            self.log_page_max = value.parse().unwrap_or(self.log_page_max);
        }
        if let Some(value) = lookup("EMPIRE_PLAYER_PAGE_DEFAULT") {
            self.player_page_default = value.parse().unwrap_or(self.player_page_default);
        }
        if let Some(value) = lookup("EMPIRE_PLAYER_PAGE_MAX") {
            self.player_page_max = value.parse().unwrap_or(self.player_page_max);
        }
        if let Some(value) = lookup("EMPIRE_STREAM_BUFFER") {
            self.stream_buffer = value.parse().unwrap_or(self.stream_buffer);
        }
        if let Some(value) = lookup("EMPIRE_STREAM_KEEPALIVE_SECONDS") {
            self.stream_keepalive_seconds =
                value.parse().unwrap_or(self.stream_keepalive_seconds);
        }
        if let Some(value) = lookup("EMPIRE_RECONCILE_INTERVAL_MINUTES") {
            self.reconcile_interval_minutes =
                value.parse().unwrap_or(self.reconcile_interval_minutes);
        }
        if let Some(value) = lookup("EMPIRE_RECONCILE_ON_STARTUP") {
            self.reconcile_on_startup = value.parse().unwrap_or(self.reconcile_on_startup);
        }
        if let Some(value) = lookup("EMPIRE_LOG_DIR") {
            self.log_dir = Some(value);
        }
        if let Some(value) = lookup("EMPIRE_LOG_JSON") {
            self.log_json = value.parse().unwrap_or(self.log_json);
        }
    }
}

fn resolve_path(base: &Path, value: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return trimmed.to_string();
    }
    let path = Path::new(trimmed);
    if path.is_absolute() {
        trimmed.to_string()
    } else {
        base.join(path).to_string_lossy().to_string()
    }
}
