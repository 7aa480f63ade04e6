//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - loads `.env` and initialises logging
//! - parses CLI arguments into a [`RunConfig`]
//! - runs selection + classification through [`pipeline`]
//! - prints reports/plots and writes optional exports

use std::collections::BTreeSet;

use clap::Parser;

use crate::catalog::CurveCatalog;
use crate::classify::summarize;
use crate::cli::{Command, DemoArgs, PlotArgs, RunArgs};
use crate::data::{SampleConfig, generate_sample, write_sample};
use crate::domain::{AcceptancePolicy, ColumnRoles, IDEAL_TABLE, PolicyKind, RunConfig};
use crate::error::AppError;
use crate::io::selection::{SelectionManifest, read_selection_json, write_selection_json};
use crate::plot::{curves_for_ids, curves_for_selection, render_ascii_plot};
use crate::report::{ResultSink, format_classification, format_run_summary, format_selection, load_assignments};
use crate::store::{CsvDirStore, MemoryStore, TableStore};

pub mod pipeline;

/// Entry point for the `idealfit` binary.
pub fn run() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = crate::cli::Cli::parse();

    match cli.command {
        Command::Run(args) => handle_run(&args),
        Command::Select(args) => handle_select(&args),
        Command::Plot(args) => handle_plot(&args),
        Command::Demo(args) => handle_demo(&args),
    }
}

fn handle_run(args: &RunArgs) -> Result<(), AppError> {
    let config = run_config_from_args(args)?;
    let mut store = CsvDirStore::open(&config.store_dir)?;
    let run = pipeline::run_pipeline(&config, &mut store)?;

    println!(
        "{}",
        format_run_summary(&run.inputs.training, &run.inputs.catalog, &run.inputs.test, &config.policy)
    );
    println!("{}", format_selection(&run.selection));
    println!("{}", format_classification(&run.summary, &run.selection));

    if config.plot {
        let curves = curves_for_selection(&run.inputs.catalog, &run.selection)?;
        println!(
            "{}",
            render_ascii_plot(&run.assignments, &curves, config.plot_width, config.plot_height)
        );
    }

    if let Some(path) = &config.export_selection {
        export_selection(path, &run.inputs, &run.selection, &config)?;
    }

    Ok(())
}

fn handle_select(args: &RunArgs) -> Result<(), AppError> {
    let config = run_config_from_args(args)?;

    // Selection only: raw tables stay in memory.
    let mut store = MemoryStore::new();
    let inputs = pipeline::load_inputs(&config, &mut store)?;
    let selection = pipeline::select_functions(&config, &inputs)?;

    println!(
        "{}",
        format_run_summary(&inputs.training, &inputs.catalog, &inputs.test, &config.policy)
    );
    println!("{}", format_selection(&selection));

    if let Some(path) = &config.export_selection {
        export_selection(path, &inputs, &selection, &config)?;
    }

    Ok(())
}

fn handle_plot(args: &PlotArgs) -> Result<(), AppError> {
    let mut store = CsvDirStore::open(&args.store)?;
    let assignments = load_assignments(&store, &args.results_table)?;

    let ideal = store.load(IDEAL_TABLE)?;
    // Stored input tables always carry the x column first.
    let x_column = ideal
        .columns
        .first()
        .cloned()
        .ok_or_else(|| AppError::load(IDEAL_TABLE, "Table has no columns."))?;
    let catalog = CurveCatalog::from_table(IDEAL_TABLE, &ideal, &x_column)?;

    let curves = match &args.selection {
        Some(path) => {
            let manifest = read_selection_json(path)?;
            println!("{}", format_selection(&manifest.selection));
            println!("Acceptance: {}", manifest.policy.describe());
            curves_for_selection(&catalog, &manifest.selection)?
        }
        None => {
            let ids: BTreeSet<usize> = assignments.iter().filter_map(|a| a.function_id).collect();
            curves_for_ids(&catalog, ids)?
        }
    };

    let summary = summarize(&assignments);
    println!(
        "Loaded {} rows from '{}': {} assigned, {} unassigned",
        summary.total, args.results_table, summary.assigned, summary.unassigned
    );

    if args.plot {
        println!("{}", render_ascii_plot(&assignments, &curves, args.width, args.height));
    }

    let sink = ResultSink::new(&mut store, args.results_table.as_str())?;
    sink.render(&assignments, &curves, &args.chart)?;
    println!("Chart written to {}", args.chart.display());
    Ok(())
}

fn handle_demo(args: &DemoArgs) -> Result<(), AppError> {
    let config = SampleConfig {
        seed: args.seed,
        functions: args.functions,
        grid_points: args.points,
        training_series: args.series,
        test_points: args.test_points,
        noise_sd: args.noise,
        outlier_fraction: args.outliers,
        ..SampleConfig::default()
    };
    let data = generate_sample(&config)?;
    let paths = write_sample(&args.out, &data)?;

    let truth: Vec<String> = data.truth.iter().map(|id| format!("y{}", id + 1)).collect();
    println!("Wrote demo dataset (seed {}):", args.seed);
    println!("  training: {}", paths.train.display());
    println!("  ideal:    {}", paths.ideal.display());
    println!("  test:     {}", paths.test.display());
    println!("Training series were generated from: {}", truth.join(", "));
    println!(
        "Try: idealfit run --train {} --ideal {} --test {} -k {}",
        paths.train.display(),
        paths.ideal.display(),
        paths.test.display(),
        args.series
    );
    Ok(())
}

fn export_selection(
    path: &std::path::Path,
    inputs: &pipeline::LoadedInputs,
    selection: &crate::domain::SelectionResult,
    config: &RunConfig,
) -> Result<(), AppError> {
    let manifest = SelectionManifest::new(
        selection,
        inputs.catalog.count(),
        inputs.training.iter().map(|s| s.label.clone()).collect(),
        config.policy,
    );
    write_selection_json(path, &manifest)
}

/// Resolve the acceptance policy flags.
pub fn policy_from_args(args: &RunArgs) -> Result<AcceptancePolicy, AppError> {
    match args.policy {
        PolicyKind::Scaled => {
            if !(args.factor.is_finite() && args.factor > 0.0) {
                return Err(AppError::Config(format!("--factor must be > 0 (got {}).", args.factor)));
            }
            Ok(AcceptancePolicy::Scaled { factor: args.factor })
        }
        PolicyKind::Absolute => match args.threshold {
            Some(t) if t.is_finite() && t >= 0.0 => Ok(AcceptancePolicy::Absolute { threshold: t }),
            Some(t) => Err(AppError::Config(format!("--threshold must be >= 0 (got {t})."))),
            None => Err(AppError::Config("--policy absolute requires --threshold.".to_string())),
        },
        PolicyKind::Nearest => Ok(AcceptancePolicy::Nearest),
    }
}

pub fn run_config_from_args(args: &RunArgs) -> Result<RunConfig, AppError> {
    let train_columns = ColumnRoles {
        x: args.x_column.clone(),
        y: args.train_y_columns.clone(),
    };

    Ok(RunConfig {
        train_paths: args.train.clone(),
        ideal_path: args.ideal.clone(),
        test_path: args.test.clone(),
        train_columns,
        ideal_x_column: args.x_column.clone(),
        test_columns: ColumnRoles::single_y(args.x_column.as_str(), args.test_y_column.as_str()),
        expected_functions: args.expect_functions,
        k: args.k,
        policy: policy_from_args(args)?,
        store_dir: args.store.clone(),
        results_table: args.results_table.clone(),
        chart_path: (!args.no_chart).then(|| args.chart.clone()),
        export_selection: args.export_selection.clone(),
        plot: args.plot,
        plot_width: args.width,
        plot_height: args.height,
    })
}
