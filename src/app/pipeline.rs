//! Shared run pipeline used by the `run` and `select` commands.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! CSV ingest -> table store -> catalog/series -> selection -> classification -> persist
//!
//! The command handlers can then focus on presentation (printing, charts, exports).

use crate::catalog::CurveCatalog;
use crate::classify::{ClassificationSummary, Classifier, summarize};
use crate::domain::{
    Assignment, ColumnRoles, IDEAL_TABLE, RunConfig, SelectionResult, Series, TEST_TABLE, TRAINING_TABLE,
};
use crate::error::AppError;
use crate::io::ingest::{load_csv_table, series_from_table, test_series_from_table};
use crate::plot::curves_for_selection;
use crate::report::ResultSink;
use crate::store::TableStore;

/// Training series, catalog and test series as read back from the store.
#[derive(Debug, Clone)]
pub struct LoadedInputs {
    pub training: Vec<Series>,
    pub catalog: CurveCatalog,
    pub test: Series,
}

/// All computed outputs of a single `idealfit run`.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub inputs: LoadedInputs,
    pub selection: SelectionResult,
    pub assignments: Vec<Assignment>,
    pub summary: ClassificationSummary,
}

/// Table name of the `n`-th training file (0-based index, 1-based name).
pub fn training_table_name(index: usize) -> String {
    format!("{TRAINING_TABLE}_{}", index + 1)
}

/// Read the input CSVs, store them as raw tables, and rebuild the in-memory
/// series and catalog from what was stored.
pub fn load_inputs<S: TableStore>(config: &RunConfig, store: &mut S) -> Result<LoadedInputs, AppError> {
    if config.train_paths.is_empty() {
        return Err(AppError::Config("At least one training file is required.".to_string()));
    }

    let mut training_tables = Vec::with_capacity(config.train_paths.len());
    for (i, path) in config.train_paths.iter().enumerate() {
        let name = training_table_name(i);
        let table = load_csv_table(path, &config.train_columns)?;
        store.save(&name, &table)?;
        training_tables.push(name);
    }

    let ideal = load_csv_table(&config.ideal_path, &ColumnRoles::all_y(config.ideal_x_column.as_str()))?;
    store.save(IDEAL_TABLE, &ideal)?;

    let test = load_csv_table(&config.test_path, &config.test_columns)?;
    store.save(TEST_TABLE, &test)?;

    let mut training = Vec::new();
    for name in &training_tables {
        let table = store.load(name)?;
        training.extend(series_from_table(name, &table, &config.train_columns.x)?);
    }

    let catalog = CurveCatalog::from_table(IDEAL_TABLE, &store.load(IDEAL_TABLE)?, &config.ideal_x_column)?;
    if let Some(expected) = config.expected_functions.filter(|&n| n != catalog.count()) {
        return Err(AppError::load(
            IDEAL_TABLE,
            format!("Expected {expected} functions, found {}.", catalog.count()),
        ));
    }

    let test = test_series_from_table(TEST_TABLE, &store.load(TEST_TABLE)?, &config.test_columns.x)?;

    log::info!(
        "loaded {} training series, {} candidate functions, {} test points",
        training.len(),
        catalog.count(),
        test.len()
    );

    Ok(LoadedInputs {
        training,
        catalog,
        test,
    })
}

/// Select `config.k` functions for the loaded training data.
pub fn select_functions(config: &RunConfig, inputs: &LoadedInputs) -> Result<SelectionResult, AppError> {
    let selection = crate::fit::select(&inputs.training, &inputs.catalog, config.k)?;
    log::info!("selected functions {:?}", selection.ids());
    Ok(selection)
}

/// Execute the full pipeline, persist the assignments into `store` and
/// render the chart when `config.chart_path` is set.
pub fn run_pipeline<S: TableStore>(config: &RunConfig, store: &mut S) -> Result<RunOutput, AppError> {
    let inputs = load_inputs(config, store)?;
    let selection = select_functions(config, &inputs)?;

    let classifier = Classifier::new(&inputs.catalog, &selection, config.policy);
    let assignments = classifier.classify(&inputs.test)?;
    let summary = summarize(&assignments);

    if summary.total > 0 && summary.assigned == 0 {
        log::warn!(
            "all {} test points were rejected under {}",
            summary.total,
            config.policy.describe()
        );
    } else {
        log::info!("assigned {}/{} test points", summary.assigned, summary.total);
    }

    let mut sink = ResultSink::new(store, config.results_table.as_str())?;
    sink.persist(&assignments)?;
    if let Some(path) = &config.chart_path {
        let curves = curves_for_selection(&inputs.catalog, &selection)?;
        sink.render(&assignments, &curves, path)?;
    }

    Ok(RunOutput {
        inputs,
        selection,
        assignments,
        summary,
    })
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::Path;

    use super::*;
    use crate::domain::{AcceptancePolicy, DEFAULT_RESULTS_TABLE};
    use crate::report::load_assignments;
    use crate::store::MemoryStore;
    use crate::store::csv_dir::tests::scratch_dir;

    fn write_inputs(dir: &Path) -> RunConfig {
        let mut train = String::from("x,y1\n");
        let mut ideal = String::from("x,y1,y2\n");
        for i in 0..=10 {
            let x = i as f64;
            let noise = if i % 2 == 0 { 0.1 } else { -0.1 };
            train.push_str(&format!("{x},{}\n", x + noise));
            ideal.push_str(&format!("{x},{x},{}\n", 2.0 * x));
        }
        fs::write(dir.join("train.csv"), train).unwrap();
        fs::write(dir.join("ideal.csv"), ideal).unwrap();
        fs::write(dir.join("test.csv"), "x,y\n5,5.2\n5,20\n").unwrap();

        RunConfig {
            train_paths: vec![dir.join("train.csv")],
            ideal_path: dir.join("ideal.csv"),
            test_path: dir.join("test.csv"),
            train_columns: ColumnRoles::all_y("x"),
            ideal_x_column: "x".to_string(),
            test_columns: ColumnRoles::single_y("x", "y"),
            expected_functions: None,
            k: 1,
            policy: AcceptancePolicy::Absolute { threshold: 1.0 },
            store_dir: dir.join("store"),
            results_table: DEFAULT_RESULTS_TABLE.to_string(),
            chart_path: None,
            export_selection: None,
            plot: false,
            plot_width: 80,
            plot_height: 20,
        }
    }

    #[test]
    fn pipeline_selects_and_classifies() {
        let dir = scratch_dir("pipeline-basic");
        let config = write_inputs(&dir);
        let mut store = MemoryStore::new();

        let out = run_pipeline(&config, &mut store).unwrap();
        assert_eq!(out.selection.ids(), vec![0]);
        assert_eq!(out.inputs.training[0].label, "training_data_1:y1");

        assert_eq!(out.assignments[0].function_id, Some(0));
        assert!((out.assignments[0].deviation.unwrap() - 0.2).abs() < 1e-12);
        assert_eq!(out.assignments[1], Assignment::unassigned(5.0, 20.0));

        let names: Vec<&str> = store.table_names().collect();
        assert!(names.contains(&"training_data_1"));
        assert!(names.contains(&IDEAL_TABLE));
        assert!(names.contains(&TEST_TABLE));

        let stored = load_assignments(&store, DEFAULT_RESULTS_TABLE).unwrap();
        assert_eq!(stored, out.assignments);
    }

    #[test]
    fn expected_function_count_is_enforced() {
        let dir = scratch_dir("pipeline-expect");
        let mut config = write_inputs(&dir);
        config.expected_functions = Some(50);

        let err = run_pipeline(&config, &mut MemoryStore::new()).unwrap_err();
        assert!(matches!(err, AppError::Load { .. }));
    }

    #[test]
    fn too_many_requested_functions() {
        let dir = scratch_dir("pipeline-k");
        let mut config = write_inputs(&dir);
        config.k = 3;

        let err = run_pipeline(&config, &mut MemoryStore::new()).unwrap_err();
        assert!(matches!(err, AppError::InsufficientCandidates { requested: 3, available: 2 }));
        assert_eq!(err.exit_code(), 3);
    }
}
