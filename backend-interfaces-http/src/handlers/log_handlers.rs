use std::convert::Infallible;
use std::time::Duration;

use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::{HeaderMap, HeaderName, HeaderValue};
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::IntoResponse;
use axum::Json;
use futures_util::stream::{self, Stream};
use tracing::{debug, warn};

use backend_application::commands::log_commands;
use backend_application::ops::LogSubscription;
use backend_application::queries::log_history_queries;
use backend_application::AppState;
use backend_domain::{AppendReceipt, LogAppendRequest, LogHistoryQuery, LogPage};

use crate::error::HttpError;
use crate::middleware::json_body;
use crate::response::{ok, ApiOk};

pub async fn add_log(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<ApiOk<AppendReceipt>>, HttpError> {
    let payload: LogAppendRequest = json_body(&headers, &body, state.config.max_body_bytes)?;
    let receipt = log_commands::append_log(&state, payload).await?;
    Ok(ok(receipt))
}

pub async fn list_logs(
    State(state): State<AppState>,
    Query(query): Query<LogHistoryQuery>,
) -> Result<Json<ApiOk<LogPage>>, HttpError> {
    let page = log_history_queries::list_logs(&state, query).await?;
    Ok(ok(page))
}

/// Server-sent events: the hello notice first, then every committed record.
/// The client going away drops the stream, which drops the subscription.
pub async fn stream_logs(State(state): State<AppState>) -> impl IntoResponse {
    let subscription = state.log_stream.subscribe();
    debug!(observer = %subscription.id(), "live log stream opened");
    let keepalive = Duration::from_secs(state.config.stream_keepalive_seconds.max(1));
    let sse = Sse::new(log_events(subscription)).keep_alive(KeepAlive::new().interval(keepalive));
    (
        [(
            HeaderName::from_static("x-accel-buffering"),
            HeaderValue::from_static("no"),
        )],
        sse,
    )
}

fn log_events(subscription: LogSubscription) -> impl Stream<Item = Result<Event, Infallible>> {
    stream::unfold(subscription, |mut subscription| async move {
        let message = subscription.recv().await?;
        let event = Event::default().json_data(&message).unwrap_or_else(|err| {
            warn!(error = %err, "failed to encode live log message");
            Event::default().comment("encode-error")
        });
        Some((Ok(event), subscription))
    })
}
