//! Best-fit selection orchestration.
//!
//! Responsibilities:
//!
//! - score each candidate against the training series (`score`)
//! - pick the k candidates with minimal pooled deviation (`selection`)

pub mod score;
pub mod selection;

pub use score::*;
pub use selection::*;
