pub mod log_handlers;
pub mod ops_handlers;
pub mod report_handlers;
pub mod save_handlers;

pub use log_handlers::*;
pub use ops_handlers::*;
pub use report_handlers::*;
pub use save_handlers::*;
