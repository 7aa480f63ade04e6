//! Error taxonomy for the whole pipeline.
//!
//! Every failure aborts the run. `main` prints the message and exits with
//! [`AppError::exit_code`]:
//!
//! - `2`: bad input, bad configuration, filesystem, output or table-store failures
//! - `3`: not enough reference functions to do the requested work
//! - `4`: numerical failures (out-of-domain evaluation) and chart rendering

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    /// Malformed or missing input rows/columns.
    #[error("Failed to load '{source_name}': {message}")]
    Load { source_name: String, message: String },

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    /// Encoding an output file (CSV table, JSON manifest) failed.
    #[error("Failed to write '{target}': {message}")]
    Write { target: String, message: String },

    /// A table was requested from the store but never saved.
    #[error("Table not found: '{table}'")]
    NotFound { table: String },

    #[error("Cannot select {requested} reference functions: only {available} available")]
    InsufficientCandidates { requested: usize, available: usize },

    #[error("No reference functions selected; nothing to classify against")]
    NoReferenceFunctions,

    #[error("x={x} is outside the sampled domain [{min}, {max}] of reference function {function_id}")]
    OutOfRange {
        function_id: usize,
        x: f64,
        min: f64,
        max: f64,
    },

    #[error("Unknown reference function id {function_id}")]
    UnknownFunction { function_id: usize },

    /// Scoring a training series failed; carries the series label.
    #[error("While scoring series '{series}': {source}")]
    Scoring {
        series: String,
        #[source]
        source: Box<AppError>,
    },

    #[error("Failed to render chart: {0}")]
    Plot(String),
}

impl AppError {
    pub fn load(source_name: impl Into<String>, message: impl Into<String>) -> Self {
        AppError::Load {
            source_name: source_name.into(),
            message: message.into(),
        }
    }

    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        AppError::Io {
            context: context.into(),
            source,
        }
    }

    pub fn write(target: impl Into<String>, message: impl ToString) -> Self {
        AppError::Write {
            target: target.into(),
            message: message.to_string(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        match self {
            AppError::Load { .. }
            | AppError::Config(_)
            | AppError::Io { .. }
            | AppError::Write { .. }
            | AppError::NotFound { .. } => 2,
            AppError::InsufficientCandidates { .. } | AppError::NoReferenceFunctions => 3,
            AppError::OutOfRange { .. } | AppError::UnknownFunction { .. } | AppError::Plot(_) => 4,
            AppError::Scoring { source, .. } => source.exit_code(),
        }
    }
}
