//! Shared domain types.
//!
//! These types are intentionally kept lightweight so they can be:
//!
//! - used in-memory during selection and classification
//! - converted to/from store tables
//! - exported to JSON for later inspection

use std::path::PathBuf;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Default multiple of a function's training deviation bound used by
/// [`AcceptancePolicy::Scaled`].
pub const DEFAULT_SCALE_FACTOR: f64 = std::f64::consts::SQRT_2;

/// Well-known table names in the store.
pub const TRAINING_TABLE: &str = "training_data";
pub const IDEAL_TABLE: &str = "ideal_functions";
pub const TEST_TABLE: &str = "test_data";
pub const DEFAULT_RESULTS_TABLE: &str = "test_results";

/// A single observation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// An ordered set of observations with a human-readable label.
///
/// x values are unique within a series (validated at ingest).
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub label: String,
    pub points: Vec<Point>,
}

impl Series {
    pub fn new(label: impl Into<String>, points: Vec<Point>) -> Self {
        Self {
            label: label.into(),
            points,
        }
    }

    pub fn from_pairs(label: impl Into<String>, pairs: &[(f64, f64)]) -> Self {
        Self::new(label, pairs.iter().map(|&(x, y)| Point { x, y }).collect())
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// One chosen reference function with its training diagnostics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectedFunction {
    pub id: usize,
    pub name: String,
    /// Pooled sum of squared deviations over all training series.
    pub score: f64,
    /// Largest absolute deviation against the training series this function
    /// fits best.
    pub max_deviation: f64,
    /// Label of that best-fitting training series.
    pub fitted_series: Option<String>,
}

/// Ordered, duplicate-free list of chosen reference functions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SelectionResult {
    pub chosen: Vec<SelectedFunction>,
}

impl SelectionResult {
    pub fn ids(&self) -> Vec<usize> {
        self.chosen.iter().map(|f| f.id).collect()
    }

    pub fn len(&self) -> usize {
        self.chosen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chosen.is_empty()
    }

    pub fn get(&self, id: usize) -> Option<&SelectedFunction> {
        self.chosen.iter().find(|f| f.id == id)
    }
}

/// Classification outcome for one test point.
///
/// `function_id` and `deviation` are either both present or both absent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Assignment {
    pub x: f64,
    pub y: f64,
    pub function_id: Option<usize>,
    /// Signed `y - f(x)` for the assigned function.
    pub deviation: Option<f64>,
}

impl Assignment {
    pub fn unassigned(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            function_id: None,
            deviation: None,
        }
    }

    pub fn is_assigned(&self) -> bool {
        self.function_id.is_some()
    }
}

/// Which acceptance rule the classifier applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum PolicyKind {
    /// `factor` × the nearest function's training deviation bound.
    Scaled,
    /// A fixed `threshold` for every function.
    Absolute,
    /// Always assign the nearest function.
    Nearest,
}

/// Resolved acceptance rule.
///
/// Boundaries are inclusive: a deviation equal to the allowed maximum is
/// accepted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum AcceptancePolicy {
    Scaled { factor: f64 },
    Absolute { threshold: f64 },
    Nearest,
}

impl AcceptancePolicy {
    /// Largest accepted absolute deviation for `function`, or `None` when
    /// every deviation is accepted.
    pub fn max_allowed(&self, function: &SelectedFunction) -> Option<f64> {
        match *self {
            AcceptancePolicy::Scaled { factor } => Some(factor * function.max_deviation),
            AcceptancePolicy::Absolute { threshold } => Some(threshold),
            AcceptancePolicy::Nearest => None,
        }
    }

    pub fn describe(&self) -> String {
        match self {
            AcceptancePolicy::Scaled { factor } => format!("scaled (factor={factor:.4})"),
            AcceptancePolicy::Absolute { threshold } => format!("absolute (threshold={threshold})"),
            AcceptancePolicy::Nearest => "nearest (no threshold)".to_string(),
        }
    }
}

/// Which columns play which role in an input file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnRoles {
    pub x: String,
    /// Explicit y columns; `None` means every non-x column.
    pub y: Option<Vec<String>>,
}

impl ColumnRoles {
    pub fn all_y(x: impl Into<String>) -> Self {
        Self { x: x.into(), y: None }
    }

    pub fn single_y(x: impl Into<String>, y: impl Into<String>) -> Self {
        Self {
            x: x.into(),
            y: Some(vec![y.into()]),
        }
    }
}

/// A full run's configuration as understood by the pipeline.
///
/// This is derived from CLI flags (plus defaults).
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub train_paths: Vec<PathBuf>,
    pub ideal_path: PathBuf,
    pub test_path: PathBuf,

    pub train_columns: ColumnRoles,
    pub ideal_x_column: String,
    pub test_columns: ColumnRoles,

    /// Optional sanity check on the catalog size.
    pub expected_functions: Option<usize>,

    pub k: usize,
    pub policy: AcceptancePolicy,

    pub store_dir: PathBuf,
    pub results_table: String,

    pub chart_path: Option<PathBuf>,
    pub export_selection: Option<PathBuf>,

    pub plot: bool,
    pub plot_width: usize,
    pub plot_height: usize,
}
