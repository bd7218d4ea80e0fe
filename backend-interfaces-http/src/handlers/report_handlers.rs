use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::Json;
use serde::Serialize;

use backend_application::commands::report_commands;
use backend_application::queries::report_queries;
use backend_application::AppState;
use backend_domain::{
    AchievementOutcome, AchievementReportRequest, LossTally, PlayerDetail, PlayerListEntry,
    PlayerListQuery, PlayerLookupQuery, PlayerReportRequest, ReportsSummary, WinTally,
};

use crate::error::HttpError;
use crate::middleware::json_body;
use crate::response::{ok, ApiOk, Empty};

#[derive(Debug, Serialize)]
pub struct ReportBody<T> {
    pub report: T,
}

#[derive(Debug, Serialize)]
pub struct SummaryBody {
    pub summary: ReportsSummary,
}

#[derive(Debug, Serialize)]
pub struct PlayersBody {
    pub players: Vec<PlayerListEntry>,
}

#[derive(Debug, Serialize)]
pub struct ReconcileBody {
    pub repaired: u64,
}

pub async fn report_win(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<ApiOk<ReportBody<WinTally>>>, HttpError> {
    let payload: PlayerReportRequest = json_body(&headers, &body, state.config.max_body_bytes)?;
    let report = report_commands::report_win(&state, payload).await?;
    Ok(ok(ReportBody { report }))
}

pub async fn report_lose(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<ApiOk<ReportBody<LossTally>>>, HttpError> {
    let payload: PlayerReportRequest = json_body(&headers, &body, state.config.max_body_bytes)?;
    let report = report_commands::report_loss(&state, payload).await?;
    Ok(ok(ReportBody { report }))
}

pub async fn report_achievement(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<ApiOk<AchievementOutcome>>, HttpError> {
    let payload: AchievementReportRequest =
        json_body(&headers, &body, state.config.max_body_bytes)?;
    let outcome = report_commands::report_achievement(&state, payload).await?;
    Ok(ok(outcome))
}

pub async fn register_player(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<ApiOk<Empty>>, HttpError> {
    let payload: PlayerReportRequest = json_body(&headers, &body, state.config.max_body_bytes)?;
    report_commands::register_player(&state, payload).await?;
    Ok(ok(Empty {}))
}

pub async fn reports_summary(
    State(state): State<AppState>,
) -> Result<Json<ApiOk<SummaryBody>>, HttpError> {
    let summary = report_queries::get_summary(&state).await?;
    Ok(ok(SummaryBody { summary }))
}

pub async fn reports_players(
    State(state): State<AppState>,
    Query(query): Query<PlayerListQuery>,
) -> Result<Json<ApiOk<PlayersBody>>, HttpError> {
    let players = report_queries::list_players(&state, query).await?;
    Ok(ok(PlayersBody { players }))
}

/// An unknown player answers `{"report": null}`, not 404.
pub async fn reports_detail(
    State(state): State<AppState>,
    Query(query): Query<PlayerLookupQuery>,
) -> Result<Json<ApiOk<ReportBody<Option<PlayerDetail>>>>, HttpError> {
    let report = report_queries::get_player_detail(&state, query).await?;
    Ok(ok(ReportBody { report }))
}

pub async fn reports_reconcile(
    State(state): State<AppState>,
) -> Result<Json<ApiOk<ReconcileBody>>, HttpError> {
    let repaired = report_commands::reconcile_achievement_counts(&state).await?;
    Ok(ok(ReconcileBody { repaired }))
}
