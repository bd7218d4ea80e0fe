pub mod log_stream_hub;

pub use log_stream_hub::*;
