pub mod log_commands;
pub mod report_commands;
pub mod save_commands;
