// Request payloads and query strings as they arrive from clients.
// Every field is optional here; commands decide what is required.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogAppendRequest {
    #[serde(alias = "ownerEmail")]
    pub email: Option<String>,
    #[serde(alias = "ownerUsername")]
    pub username: Option<String>,
    #[serde(alias = "device_id")]
    pub device_id: Option<String>,
    pub content: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerReportRequest {
    pub email: Option<String>,
    pub username: Option<String>,
    #[serde(alias = "device_id")]
    pub device_id: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AchievementReportRequest {
    pub email: Option<String>,
    pub username: Option<String>,
    #[serde(alias = "achievement_key")]
    pub achievement_key: Option<String>,
    #[serde(alias = "device_id")]
    pub device_id: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveSyncRequest {
    pub email: Option<String>,
    pub username: Option<String>,
    #[serde(alias = "save_json")]
    pub save_json: Option<String>,
}

/// `?limit=&beforeId=`; kept as raw strings so malformed values degrade
/// to defaults instead of failing the request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogHistoryQuery {
    pub limit: Option<String>,
    #[serde(alias = "before_id")]
    pub before_id: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlayerListQuery {
    pub q: Option<String>,
    pub limit: Option<String>,
    pub offset: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlayerLookupQuery {
    pub email: Option<String>,
    pub username: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EmailQuery {
    pub email: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn device_id_accepts_snake_case_alias() {
        let payload: PlayerReportRequest =
            serde_json::from_str(r#"{"email":"a@b.c","username":"u","device_id":"d1"}"#)
                .expect("payload");
        assert_eq!(payload.device_id.as_deref(), Some("d1"));

        let payload: PlayerReportRequest =
            serde_json::from_str(r#"{"email":"a@b.c","username":"u","deviceId":"d2"}"#)
                .expect("payload");
        assert_eq!(payload.device_id.as_deref(), Some("d2"));
    }

    #[test]
    fn missing_fields_deserialize_as_none() {
        let payload: LogAppendRequest = serde_json::from_str("{}").expect("payload");
        assert!(payload.email.is_none());
        assert!(payload.content.is_none());
    }
}
