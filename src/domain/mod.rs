//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - observations (`Point`, `Series`)
//! - selection outputs (`SelectedFunction`, `SelectionResult`)
//! - classification outputs (`Assignment`) and the `AcceptancePolicy`
//! - the run configuration (`RunConfig`)

pub mod types;

pub use types::*;
