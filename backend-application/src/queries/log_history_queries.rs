use crate::{AppError, AppState};
use backend_domain::{
    parse_lenient_int, EventLogRepository, LogHistoryQuery, LogPage, PageLimit,
};

/// One step of backward pagination. `cursor` is the smallest id the caller
/// already holds; `None` fetches the newest page. The returned page carries
/// the next cursor, or `None` when nothing older exists.
pub async fn fetch_page(
    repo: &dyn EventLogRepository,
    cursor: Option<i64>,
    limit: PageLimit,
) -> anyhow::Result<LogPage> {
    let records = repo.read_before(cursor, limit).await?;
    Ok(LogPage::from_records(records))
}

pub async fn list_logs(state: &AppState, query: LogHistoryQuery) -> Result<LogPage, AppError> {
    let limit = PageLimit::clamped(
        parse_lenient_int(query.limit.as_deref()),
        state.config.log_page_default,
        state.config.log_page_max,
    );
    let cursor = parse_lenient_int(query.before_id.as_deref());
    fetch_page(state.event_log.as_ref(), cursor, limit)
        .await
        .map_err(AppError::storage("admin/logs"))
}
