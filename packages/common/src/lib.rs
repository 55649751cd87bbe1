pub mod stats;
pub mod visitor;

pub use stats::*;
pub use visitor::*;
