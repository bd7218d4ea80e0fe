// Event record entity
// Immutable rows of the append-only client log

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::{DeviceId, PlayerKey};

/// A validated record waiting for the store to assign its id and timestamp.
#[derive(Debug, Clone)]
pub struct NewEventRecord {
    pub owner: PlayerKey,
    pub device_id: DeviceId,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventRecord {
    pub id: i64,
    pub email: String,
    pub username: String,
    pub device_id: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl EventRecord {
    pub fn assigned(new: &NewEventRecord, id: i64, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            email: new.owner.email().to_string(),
            username: new.owner.username().to_string(),
            device_id: new.device_id.as_str().to_string(),
            content: new.content.clone(),
            created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppendReceipt {
    pub id: i64,
    pub created_at: DateTime<Utc>,
}

impl From<&EventRecord> for AppendReceipt {
    fn from(record: &EventRecord) -> Self {
        Self {
            id: record.id,
            created_at: record.created_at,
        }
    }
}

/// One backward page of history, newest first.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogPage {
    pub logs: Vec<EventRecord>,
    /// Cursor for the next older page; `None` once history is exhausted.
    pub next_before_id: Option<i64>,
}

impl LogPage {
    pub fn from_records(logs: Vec<EventRecord>) -> Self {
        let next_before_id = logs.last().map(|record| record.id);
        Self {
            logs,
            next_before_id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HelloNotice {
    #[serde(rename = "type")]
    pub kind: String,
    pub t: i64,
}

/// What a live observer receives: one hello, then records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LogStreamMessage {
    Hello(HelloNotice),
    Record(EventRecord),
}

impl LogStreamMessage {
    pub fn hello(t: i64) -> Self {
        LogStreamMessage::Hello(HelloNotice {
            kind: "hello".to_string(),
            t,
        })
    }

    pub fn record_id(&self) -> Option<i64> {
        match self {
            LogStreamMessage::Hello(_) => None,
            LogStreamMessage::Record(record) => Some(record.id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn record(id: i64) -> EventRecord {
        EventRecord {
            id,
            email: "a@b.c".to_string(),
            username: "knight".to_string(),
            device_id: "dev-1".to_string(),
            content: format!("line {id}"),
            created_at: Utc.timestamp_opt(1_700_000_000, 0).unwrap(),
        }
    }

    #[test]
    fn hello_serializes_as_sentinel() {
        let json = serde_json::to_value(LogStreamMessage::hello(1234)).expect("json");
        assert_eq!(json, serde_json::json!({"type": "hello", "t": 1234}));
    }

    #[test]
    fn record_message_serializes_flat_in_camel_case() {
        let json = serde_json::to_value(LogStreamMessage::Record(record(9))).expect("json");
        assert_eq!(json["id"], 9);
        assert_eq!(json["deviceId"], "dev-1");
        assert!(json.get("type").is_none());
    }

    #[test]
    fn stream_messages_parse_back_into_the_right_variant() {
        let hello: LogStreamMessage =
            serde_json::from_str(r#"{"type":"hello","t":5}"#).expect("hello");
        assert_eq!(hello.record_id(), None);
        let json = serde_json::to_string(&LogStreamMessage::Record(record(3))).expect("json");
        let parsed: LogStreamMessage = serde_json::from_str(&json).expect("record");
        assert_eq!(parsed.record_id(), Some(3));
    }

    #[test]
    fn page_cursor_is_the_oldest_record() {
        let page = LogPage::from_records(vec![record(9), record(8), record(5)]);
        assert_eq!(page.next_before_id, Some(5));
        assert_eq!(LogPage::from_records(Vec::new()).next_before_id, None);
    }
}
