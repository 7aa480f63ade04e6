use std::fs;
use std::path::{Path, PathBuf};

use idealfit::app::pipeline::run_pipeline;
use idealfit::data::{SampleConfig, generate_sample, write_sample};
use idealfit::domain::{AcceptancePolicy, ColumnRoles, DEFAULT_RESULTS_TABLE, DEFAULT_SCALE_FACTOR, RunConfig};
use idealfit::error::AppError;
use idealfit::report::load_assignments;
use idealfit::store::{CsvDirStore, TableStore};

fn scratch(tag: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("idealfit-it-{tag}-{}", std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).unwrap();
    dir
}

fn config(dir: &Path, train: PathBuf, ideal: PathBuf, test: PathBuf, k: usize, policy: AcceptancePolicy) -> RunConfig {
    RunConfig {
        train_paths: vec![train],
        ideal_path: ideal,
        test_path: test,
        train_columns: ColumnRoles::all_y("x"),
        ideal_x_column: "x".to_string(),
        test_columns: ColumnRoles::single_y("x", "y"),
        expected_functions: None,
        k,
        policy,
        store_dir: dir.join("store"),
        results_table: DEFAULT_RESULTS_TABLE.to_string(),
        chart_path: Some(dir.join("chart.svg")),
        export_selection: None,
        plot: false,
        plot_width: 80,
        plot_height: 20,
    }
}

#[test]
fn two_line_scenario_persists_results_and_chart() {
    let dir = scratch("lines");

    let mut train = String::from("x,y1\n");
    let mut ideal = String::from("x,y1,y2\n");
    for i in 0..=10 {
        let x = i as f64;
        let noise = [0.1, -0.2, 0.15, -0.05, 0.0, 0.12, -0.1, 0.08, -0.15, 0.05, 0.02][i];
        train.push_str(&format!("{x},{}\n", x + noise));
        ideal.push_str(&format!("{x},{x},{}\n", 2.0 * x));
    }
    fs::write(dir.join("train.csv"), train).unwrap();
    fs::write(dir.join("ideal.csv"), ideal).unwrap();
    fs::write(dir.join("test.csv"), "x,y\n5,5.2\n5,20\n2.5,2.5\n").unwrap();

    let cfg = config(
        &dir,
        dir.join("train.csv"),
        dir.join("ideal.csv"),
        dir.join("test.csv"),
        1,
        AcceptancePolicy::Absolute { threshold: 1.0 },
    );
    let mut store = CsvDirStore::open(&cfg.store_dir).unwrap();
    let out = run_pipeline(&cfg, &mut store).unwrap();

    assert_eq!(out.selection.ids(), vec![0]);
    assert_eq!(out.summary.assigned, 2);
    assert_eq!(out.summary.unassigned, 1);

    let reopened = CsvDirStore::open(&cfg.store_dir).unwrap();
    let stored = load_assignments(&reopened, DEFAULT_RESULTS_TABLE).unwrap();
    assert_eq!(stored.len(), 3);
    assert_eq!(stored[0].function_id, Some(0));
    assert!((stored[0].deviation.unwrap() - 0.2).abs() < 1e-9);
    assert_eq!(stored[1].function_id, None);
    assert_eq!(stored[1].deviation, None);
    // Midpoint between samples uses linear interpolation: f0(2.5) = 2.5.
    assert_eq!(stored[2].deviation, Some(0.0));

    assert!(reopened.contains("training_data_1"));
    assert!(reopened.contains("ideal_functions"));
    assert!(reopened.contains("test_data"));

    let svg = fs::read_to_string(dir.join("chart.svg")).unwrap();
    assert!(svg.contains("<svg"));
}

#[test]
fn demo_dataset_runs_end_to_end() {
    let dir = scratch("demo");
    let data = generate_sample(&SampleConfig {
        functions: 12,
        grid_points: 81,
        test_points: 40,
        ..SampleConfig::default()
    })
    .unwrap();
    let paths = write_sample(&dir.join("data"), &data).unwrap();

    let cfg = config(&dir, paths.train, paths.ideal, paths.test, 4, AcceptancePolicy::Nearest);
    let mut store = CsvDirStore::open(&cfg.store_dir).unwrap();
    let out = run_pipeline(&cfg, &mut store).unwrap();

    assert_eq!(out.inputs.training.len(), 4);
    assert_eq!(out.inputs.catalog.count(), 12);

    let mut ids = out.selection.ids();
    ids.sort_unstable();
    ids.dedup();
    assert_eq!(ids.len(), 4);

    // Nearest policy accepts every in-domain point.
    assert_eq!(out.summary.assigned, 40);
    for a in &out.assignments {
        let id = a.function_id.unwrap();
        let expected = a.y - out.inputs.catalog.evaluate(id, a.x).unwrap();
        assert_eq!(a.deviation, Some(expected));
        assert!(out.selection.get(id).is_some());
    }
}

#[test]
fn demo_dataset_default_policy_rejects_outliers() {
    let dir = scratch("demo-scaled");
    // Every catalog function has its own training series, so each selected
    // function's bound reflects only the noise on that series.
    let data = generate_sample(&SampleConfig {
        functions: 4,
        training_series: 4,
        grid_points: 81,
        test_points: 100,
        outlier_fraction: 0.3,
        ..SampleConfig::default()
    })
    .unwrap();
    let paths = write_sample(&dir.join("data"), &data).unwrap();

    let policy = AcceptancePolicy::Scaled { factor: DEFAULT_SCALE_FACTOR };
    let cfg = config(&dir, paths.train, paths.ideal, paths.test, 4, policy);
    let mut store = CsvDirStore::open(&cfg.store_dir).unwrap();
    let out = run_pipeline(&cfg, &mut store).unwrap();

    for f in &out.selection.chosen {
        // Noise sd is 0.3; the bound must not span other curves.
        assert!(f.max_deviation < 1.5, "{} bound {}", f.name, f.max_deviation);
        assert!(f.fitted_series.is_some());
    }

    assert!(out.summary.unassigned > 0, "{:?}", out.summary);
    assert!(out.summary.assigned > 0, "{:?}", out.summary);
    for a in out.assignments.iter().filter(|a| a.is_assigned()) {
        let f = out.selection.get(a.function_id.unwrap()).unwrap();
        assert!(a.deviation.unwrap().abs() <= DEFAULT_SCALE_FACTOR * f.max_deviation);
    }
}

#[test]
fn test_point_outside_catalog_domain_aborts() {
    let dir = scratch("domain");
    fs::write(dir.join("train.csv"), "x,y1\n0,0\n1,1\n2,2\n").unwrap();
    fs::write(dir.join("ideal.csv"), "x,y1\n0,0\n1,1\n2,2\n").unwrap();
    fs::write(dir.join("test.csv"), "x,y\n3,3\n").unwrap();

    let cfg = config(
        &dir,
        dir.join("train.csv"),
        dir.join("ideal.csv"),
        dir.join("test.csv"),
        1,
        AcceptancePolicy::Nearest,
    );
    let mut store = CsvDirStore::open(&cfg.store_dir).unwrap();
    let err = run_pipeline(&cfg, &mut store).unwrap_err();
    assert!(matches!(err, AppError::OutOfRange { .. }));
    assert_eq!(err.exit_code(), 4);
    assert!(!store.contains(DEFAULT_RESULTS_TABLE));
}
