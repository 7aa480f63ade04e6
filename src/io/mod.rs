//! Input/output helpers.
//!
//! - CSV ingest + column-role validation (`ingest`)
//! - selection manifest JSON read/write (`selection`)

pub mod ingest;
pub mod selection;

pub use ingest::*;
pub use selection::*;
