// Domain value objects
pub mod identifiers;
pub mod paging;

pub use identifiers::*;
pub use paging::*;
