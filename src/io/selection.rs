//! Read/write selection manifest JSON files.
//!
//! The manifest is the portable record of a run's selection:
//! - which reference functions were chosen, in order, with scores and bounds
//! - the acceptance policy used for classification
//! - where the training data came from and when the run happened

use std::fs::File;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{AcceptancePolicy, SelectionResult};
use crate::error::AppError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectionManifest {
    pub tool: String,
    pub generated_at: DateTime<Utc>,
    pub k: usize,
    pub candidates: usize,
    pub training_series: Vec<String>,
    pub policy: AcceptancePolicy,
    pub selection: SelectionResult,
}

impl SelectionManifest {
    pub fn new(
        selection: &SelectionResult,
        candidates: usize,
        training_series: Vec<String>,
        policy: AcceptancePolicy,
    ) -> Self {
        Self {
            tool: "idealfit".to_string(),
            generated_at: Utc::now(),
            k: selection.len(),
            candidates,
            training_series,
            policy,
            selection: selection.clone(),
        }
    }
}

/// Write a selection manifest.
pub fn write_selection_json(path: &Path, manifest: &SelectionManifest) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::io(format!("Failed to create selection JSON '{}'", path.display()), e))?;

    serde_json::to_writer_pretty(file, manifest)
        .map_err(|e| AppError::write(path.display().to_string(), e))?;

    log::info!("wrote selection manifest to {}", path.display());
    Ok(())
}

/// Read a selection manifest.
pub fn read_selection_json(path: &Path) -> Result<SelectionManifest, AppError> {
    let source = path.display().to_string();
    let file = File::open(path).map_err(|e| AppError::io(format!("Failed to open selection JSON '{source}'"), e))?;
    serde_json::from_reader(file).map_err(|e| AppError::load(source, format!("Invalid selection JSON: {e}")))
}
