use tracing::debug;

use crate::{AppError, AppState};
use backend_domain::{AppendReceipt, DeviceId, LogAppendRequest, NewEventRecord, PlayerKey};

pub fn validate_log_append(payload: LogAppendRequest) -> Result<NewEventRecord, AppError> {
    let owner = PlayerKey::new(
        payload.email.as_deref().unwrap_or_default(),
        payload.username.as_deref().unwrap_or_default(),
    )?;
    let device_id = DeviceId::new(payload.device_id.as_deref().unwrap_or_default())?;
    let content = payload.content.unwrap_or_default();
    if content.trim().is_empty() {
        return Err(AppError::Validation("content is required".to_string()));
    }
    Ok(NewEventRecord {
        owner,
        device_id,
        content,
    })
}

/// Appends one record and, once it is committed, pushes it to live observers.
pub async fn append_log(
    state: &AppState,
    payload: LogAppendRequest,
) -> Result<AppendReceipt, AppError> {
    let record = validate_log_append(payload)?;

    let gate = state.append_gate.lock().await;
    let stored = match state.event_log.append(&record).await {
        Ok(stored) => stored,
        Err(err) => {
            state.metrics.record_log_append_error();
            return Err(AppError::storage("cloud-log/add")(err));
        }
    };
    let report = state.log_stream.publish(&stored);
    drop(gate);

    state
        .metrics
        .record_log_append(report.delivered, report.dropped);
    debug!(
        id = stored.id,
        delivered = report.delivered,
        dropped = report.dropped,
        "log appended"
    );
    Ok(AppendReceipt::from(&stored))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload() -> LogAppendRequest {
        LogAppendRequest {
            email: Some(" Hero@Example.com ".to_string()),
            username: Some("knight".to_string()),
            device_id: Some("pixel".to_string()),
            content: Some("boss defeated".to_string()),
        }
    }

    #[test]
    fn valid_payload_is_normalized() {
        let record = validate_log_append(payload()).expect("valid");
        assert_eq!(record.owner.email(), "hero@example.com");
        assert_eq!(record.device_id.as_str(), "pixel");
        assert_eq!(record.content, "boss defeated");
    }

    #[test]
    fn each_field_is_required() {
        let cases: Vec<(LogAppendRequest, &str)> = vec![
            (LogAppendRequest { email: None, ..payload() }, "email"),
            (LogAppendRequest { username: Some(" ".into()), ..payload() }, "username"),
            (LogAppendRequest { device_id: None, ..payload() }, "deviceId"),
            (LogAppendRequest { content: Some("".into()), ..payload() }, "content"),
        ];
        for (case, field) in cases {
            match validate_log_append(case) {
                Err(AppError::Validation(message)) => assert!(message.contains(field), "{message}"),
                other => panic!("expected validation error for {field}, got {other:?}"),
            }
        }
    }
}
