//! `idealfit` library crate.
//!
//! Picks the reference functions that best match a set of training series
//! (least squares against a sampled catalog), then assigns test points to the
//! chosen functions under an acceptance policy.
//!
//! The binary (`idealfit`) is a thin wrapper around this library so that:
//!
//! - core logic is testable without spawning processes
//! - the store, catalog and classifier are reusable on their own

pub mod app;
pub mod catalog;
pub mod classify;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod fit;
pub mod io;
pub mod plot;
pub mod report;
pub mod store;
