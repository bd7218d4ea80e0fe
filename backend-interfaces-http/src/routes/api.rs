use axum::routing::{delete, get, post};
use axum::Router;

use backend_application::AppState;

use crate::handlers::{log_handlers, ops_handlers, report_handlers, save_handlers};

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/cloud-log/add", post(log_handlers::add_log))
        .route("/api/admin/logs", get(log_handlers::list_logs))
        .route("/api/admin/logs/stream", get(log_handlers::stream_logs))
        .route("/api/report/win", post(report_handlers::report_win))
        .route("/api/report/lose", post(report_handlers::report_lose))
        .route(
            "/api/report/achievement",
            post(report_handlers::report_achievement),
        )
        .route("/api/report/register", post(report_handlers::register_player))
        .route(
            "/api/admin/reports/summary",
            get(report_handlers::reports_summary),
        )
        .route(
            "/api/admin/reports/players",
            get(report_handlers::reports_players),
        )
        .route(
            "/api/admin/reports/detail",
            get(report_handlers::reports_detail),
        )
        .route(
            "/api/admin/reports/reconcile",
            post(report_handlers::reports_reconcile),
        )
        .route("/api/cloud-save/sync", post(save_handlers::sync_save))
        .route("/api/cloud-save/fetch", get(save_handlers::fetch_save))
        .route(
            "/api/cloud-save/list-by-email",
            get(save_handlers::list_saves_by_email),
        )
        .route("/api/admin/emails", get(save_handlers::admin_list_emails))
        .route("/api/admin/saves", get(save_handlers::admin_list_saves))
        .route(
            "/api/admin/email/:email",
            delete(save_handlers::admin_delete_email),
        )
        .route("/api/admin/save", delete(save_handlers::admin_delete_save))
        .route("/status", get(ops_handlers::status))
        .route("/db-status", get(ops_handlers::db_status))
        .route("/metrics", get(ops_handlers::metrics_prometheus))
        .with_state(state)
}
