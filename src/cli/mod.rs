//! Command-line parsing for the ideal function selector.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the selection/classification code.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::domain::{DEFAULT_RESULTS_TABLE, DEFAULT_SCALE_FACTOR, PolicyKind};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "idealfit", version, about = "Least-squares ideal function selection and test-point classification")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Load inputs, select ideal functions, classify test points, persist and plot.
    Run(RunArgs),
    /// Load inputs and print the selected ideal functions only.
    Select(RunArgs),
    /// Re-render the chart from a persisted results table.
    Plot(PlotArgs),
    /// Write a synthetic training/ideal/test dataset.
    Demo(DemoArgs),
}

/// Options shared by `run` and `select`.
#[derive(Debug, Args, Clone)]
pub struct RunArgs {
    /// Training CSV file(s); every y column is one training series.
    #[arg(long = "train", value_name = "CSV", required = true, num_args = 1..)]
    pub train: Vec<PathBuf>,

    /// Ideal function catalog CSV (x plus one column per function).
    #[arg(long, value_name = "CSV")]
    pub ideal: PathBuf,

    /// Test data CSV.
    #[arg(long, value_name = "CSV")]
    pub test: PathBuf,

    /// Name of the x column in every input file.
    #[arg(long, default_value = "x")]
    pub x_column: String,

    /// Training y columns (default: every non-x column).
    #[arg(long, value_delimiter = ',')]
    pub train_y_columns: Option<Vec<String>>,

    /// Name of the y column in the test file.
    #[arg(long, default_value = "y")]
    pub test_y_column: String,

    /// Fail unless the catalog has exactly this many functions.
    #[arg(long)]
    pub expect_functions: Option<usize>,

    /// Number of ideal functions to select.
    #[arg(short = 'k', long, default_value_t = 4)]
    pub k: usize,

    /// Acceptance policy for test points.
    #[arg(long, value_enum, default_value_t = PolicyKind::Scaled)]
    pub policy: PolicyKind,

    /// Multiple of the training deviation bound (policy=scaled).
    #[arg(long, default_value_t = DEFAULT_SCALE_FACTOR)]
    pub factor: f64,

    /// Fixed maximum deviation (required for policy=absolute).
    #[arg(long)]
    pub threshold: Option<f64>,

    /// Table store directory.
    #[arg(long, env = "IDEALFIT_STORE", default_value = "store")]
    pub store: PathBuf,

    /// Result table name.
    #[arg(long, default_value = DEFAULT_RESULTS_TABLE)]
    pub results_table: String,

    /// SVG chart output path.
    #[arg(long, env = "IDEALFIT_CHART", default_value = "classification.svg")]
    pub chart: PathBuf,

    /// Skip writing the SVG chart.
    #[arg(long)]
    pub no_chart: bool,

    /// Export the selection manifest to JSON.
    #[arg(long = "export-selection", value_name = "JSON")]
    pub export_selection: Option<PathBuf>,

    /// Render an ASCII preview in the terminal.
    #[arg(long)]
    pub plot: bool,

    /// Preview width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Preview height (rows).
    #[arg(long, default_value_t = 25)]
    pub height: usize,
}

/// Options for re-plotting stored results.
#[derive(Debug, Args)]
pub struct PlotArgs {
    /// Table store directory.
    #[arg(long, env = "IDEALFIT_STORE", default_value = "store")]
    pub store: PathBuf,

    /// Result table name.
    #[arg(long, default_value = DEFAULT_RESULTS_TABLE)]
    pub results_table: String,

    /// SVG chart output path.
    #[arg(long, env = "IDEALFIT_CHART", default_value = "classification.svg")]
    pub chart: PathBuf,

    /// Selection manifest from `run --export-selection`; its functions are
    /// drawn in selection order (default: functions referenced by the results).
    #[arg(long, value_name = "JSON")]
    pub selection: Option<PathBuf>,

    /// Also print an ASCII preview.
    #[arg(long)]
    pub plot: bool,

    #[arg(long, default_value_t = 100)]
    pub width: usize,

    #[arg(long, default_value_t = 25)]
    pub height: usize,
}

/// Options for the synthetic dataset generator.
#[derive(Debug, Args)]
pub struct DemoArgs {
    /// Output directory for train.csv, ideal.csv and test.csv.
    #[arg(long, default_value = "demo")]
    pub out: PathBuf,

    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Number of ideal functions in the catalog.
    #[arg(long, default_value_t = 50)]
    pub functions: usize,

    /// Number of x grid points.
    #[arg(long, default_value_t = 400)]
    pub points: usize,

    /// Number of training series.
    #[arg(long, default_value_t = 4)]
    pub series: usize,

    /// Number of test points.
    #[arg(long, default_value_t = 100)]
    pub test_points: usize,

    /// Standard deviation of the added noise.
    #[arg(long, default_value_t = 0.3)]
    pub noise: f64,

    /// Share of test points that are uniform outliers.
    #[arg(long, default_value_t = 0.1)]
    pub outliers: f64,
}
