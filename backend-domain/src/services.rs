// Domain services

pub mod timeline;

pub use timeline::*;
