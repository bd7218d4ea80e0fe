use std::sync::Arc;

use backend_domain::ports::{CloudSaveRepository, EventLogRepository, PlayerStatsRepository};
use backend_domain::RuntimeConfig;
use tokio::sync::Mutex;

use crate::{LogStreamHub, Metrics};

#[derive(Clone)]
pub struct AppState {
    pub config: RuntimeConfig,
    pub event_log: Arc<dyn EventLogRepository>,
    pub player_stats: Arc<dyn PlayerStatsRepository>,
    pub cloud_saves: Arc<dyn CloudSaveRepository>,
    pub log_stream: Arc<LogStreamHub>,
    /// Serializes append + publish so observers see ids in increasing order.
    pub append_gate: Arc<Mutex<()>>,
    pub metrics: Arc<Metrics>,
}

impl AppState {
    pub fn new(
        config: RuntimeConfig,
        event_log: Arc<dyn EventLogRepository>,
        player_stats: Arc<dyn PlayerStatsRepository>,
        cloud_saves: Arc<dyn CloudSaveRepository>,
    ) -> Self {
        let log_stream = Arc::new(LogStreamHub::new(config.stream_buffer));
        Self {
            config,
            event_log,
            player_stats,
            cloud_saves,
            log_stream,
            append_gate: Arc::new(Mutex::new(())),
            metrics: Arc::new(Metrics::default()),
        }
    }
}
