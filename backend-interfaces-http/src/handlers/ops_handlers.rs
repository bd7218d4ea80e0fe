use axum::extract::State;
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::time::{timeout, Duration};
use tracing::error;

use backend_application::AppState;

const SERVICE_NAME: &str = "EmpireRunServices";

#[derive(Serialize)]
struct LiveStatus {
    ok: bool,
    service: &'static str,
}

#[derive(Serialize)]
struct DbStatus {
    ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    now: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

pub async fn status() -> impl IntoResponse {
    Json(LiveStatus {
        ok: true,
        service: SERVICE_NAME,
    })
}

pub async fn db_status(State(state): State<AppState>) -> impl IntoResponse {
    let timeout_secs = state.config.request_timeout_seconds.max(1);
    let timeout_duration = Duration::from_secs(timeout_secs);
    let failure = match timeout(timeout_duration, state.event_log.ping()).await {
        Ok(Ok(())) => {
            let body = DbStatus {
                ok: true,
                now: Some(Utc::now()),
                error: None,
            };
            return (StatusCode::OK, Json(body));
        }
        Ok(Err(err)) => {
            error!(error = %err, "db status check failed");
            "store unavailable".to_string()
        }
        Err(_) => {
            error!("db status check timeout after {}s", timeout_secs);
            format!("store did not answer within {}s", timeout_secs)
        }
    };
    let body = DbStatus {
        ok: false,
        now: None,
        error: Some(failure),
    };
    (StatusCode::SERVICE_UNAVAILABLE, Json(body))
}

pub async fn metrics_prometheus(State(state): State<AppState>) -> impl IntoResponse {
    let payload = state
        .metrics
        .render_prometheus(state.log_stream.observer_count());
    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/plain; version=0.0.4; charset=utf-8"),
    );
    (headers, payload)
}
