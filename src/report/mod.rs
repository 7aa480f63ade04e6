//! Reporting utilities: result persistence and terminal summaries.

pub mod format;
pub mod sink;

pub use format::*;
pub use sink::*;
