pub mod log_history_queries;
pub mod report_queries;
pub mod save_queries;
