//! Result visualization.
//!
//! - `chart`: SVG scatter chart with error bars (written to disk)
//! - `ascii`: fixed-size terminal preview

pub mod ascii;
pub mod chart;

pub use ascii::*;
pub use chart::*;
