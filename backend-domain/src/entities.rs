// Domain entities

pub mod cloud_save;
pub mod config;
pub mod event_record;
pub mod player_stats;
pub mod requests;

pub use cloud_save::*;
pub use config::*;
pub use event_record::*;
pub use player_stats::*;
pub use requests::*;
