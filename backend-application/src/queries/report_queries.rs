use tracing::warn;

use crate::{AppError, AppState};
use backend_domain::{
    parse_lenient_int, PageLimit, PlayerDetail, PlayerFilter, PlayerKey, PlayerListEntry,
    PlayerListQuery, PlayerLookupQuery, ReportsSummary,
};

pub async fn get_summary(state: &AppState) -> Result<ReportsSummary, AppError> {
    let totals = state
        .player_stats
        .fetch_totals()
        .await
        .map_err(AppError::storage("admin/reports/summary"))?;
    Ok(ReportsSummary::from(totals))
}

pub fn player_filter(query: &PlayerListQuery, default_limit: u32, max_limit: u32) -> PlayerFilter {
    let limit = PageLimit::clamped(
        parse_lenient_int(query.limit.as_deref()),
        default_limit,
        max_limit,
    );
    let offset = parse_lenient_int(query.offset.as_deref())
        .unwrap_or(0)
        .clamp(0, i64::from(u32::MAX)) as u32;
    PlayerFilter {
        text: query.q.as_deref().unwrap_or_default().trim().to_lowercase(),
        limit: limit.get(),
        offset,
    }
}

pub async fn list_players(
    state: &AppState,
    query: PlayerListQuery,
) -> Result<Vec<PlayerListEntry>, AppError> {
    let filter = player_filter(
        &query,
        state.config.player_page_default,
        state.config.player_page_max,
    );
    state
        .player_stats
        .list_players(&filter)
        .await
        .map_err(AppError::storage("admin/reports/players"))
}

/// `Ok(None)` for an unknown player; that is a normal answer, not a fault.
pub async fn get_player_detail(
    state: &AppState,
    query: PlayerLookupQuery,
) -> Result<Option<PlayerDetail>, AppError> {
    let player = PlayerKey::new(
        query.email.as_deref().unwrap_or_default(),
        query.username.as_deref().unwrap_or_default(),
    )?;
    let detail = state
        .player_stats
        .fetch_player(&player)
        .await
        .map_err(AppError::storage("admin/reports/detail"))?;
    if let Some(detail) = &detail {
        if detail.has_achievement_drift() {
            warn!(
                player = %player,
                cached = detail.summary.achievements_count,
                ledger = detail.achievement_ids.len(),
                "achievement counter drift detected"
            );
        }
    }
    Ok(detail)
}
