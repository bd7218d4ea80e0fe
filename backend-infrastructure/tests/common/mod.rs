#![allow(dead_code)]

use std::sync::Arc;

use backend_application::AppState;
use backend_domain::{
    AchievementReportRequest, LogAppendRequest, PlayerReportRequest, RuntimeConfig,
};
use backend_infrastructure::MemoryStore;

pub fn memory_state() -> (AppState, MemoryStore) {
    memory_state_with(RuntimeConfig::default())
}

pub fn memory_state_with(config: RuntimeConfig) -> (AppState, MemoryStore) {
    let store = MemoryStore::new();
    let state = AppState::new(
        config,
        Arc::new(store.clone()),
        Arc::new(store.clone()),
        Arc::new(store.clone()),
    );
    (state, store)
}

pub fn report(email: &str, username: &str, device: Option<&str>) -> PlayerReportRequest {
    PlayerReportRequest {
        email: Some(email.to_string()),
        username: Some(username.to_string()),
        device_id: device.map(str::to_string),
    }
}

pub fn achievement(email: &str, username: &str, key: &str) -> AchievementReportRequest {
    AchievementReportRequest {
        email: Some(email.to_string()),
        username: Some(username.to_string()),
        achievement_key: Some(key.to_string()),
        device_id: None,
    }
}

pub fn log_line(content: &str) -> LogAppendRequest {
    LogAppendRequest {
        email: Some("hero@example.com".to_string()),
        username: Some("knight".to_string()),
        device_id: Some("pixel-7".to_string()),
        content: Some(content.to_string()),
    }
}
