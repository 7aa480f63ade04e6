//! Synthetic demo dataset generation.
//!
//! Produces the three inputs of a run:
//! - an ideal catalog of `functions` curves on a regular x grid
//! - `training_series` noisy copies of distinct, randomly chosen catalog curves
//! - a test set drawn around those curves, with a fraction of outliers
//!
//! Everything derives from a single seed so datasets are reproducible.

use std::fs::{File, create_dir_all};
use std::path::{Path, PathBuf};

use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;

use crate::error::AppError;

#[derive(Debug, Clone)]
pub struct SampleConfig {
    pub seed: u64,
    pub functions: usize,
    pub grid_points: usize,
    pub x_min: f64,
    pub x_max: f64,
    pub training_series: usize,
    pub test_points: usize,
    pub noise_sd: f64,
    /// Share of test points drawn uniformly instead of around a curve.
    pub outlier_fraction: f64,
}

impl Default for SampleConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            functions: 50,
            grid_points: 400,
            x_min: -20.0,
            x_max: 20.0,
            training_series: 4,
            test_points: 100,
            noise_sd: 0.3,
            outlier_fraction: 0.1,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SampleData {
    pub xs: Vec<f64>,
    /// One y column per catalog function.
    pub ideal: Vec<Vec<f64>>,
    /// One y column per training series, on the same grid.
    pub training: Vec<Vec<f64>>,
    /// Catalog ids the training series were generated from.
    pub truth: Vec<usize>,
    pub test: Vec<(f64, f64)>,
}

/// Paths of the written CSV files.
#[derive(Debug, Clone)]
pub struct SamplePaths {
    pub train: PathBuf,
    pub ideal: PathBuf,
    pub test: PathBuf,
}

pub fn generate_sample(config: &SampleConfig) -> Result<SampleData, AppError> {
    if config.functions == 0 {
        return Err(AppError::Config("Function count must be > 0.".to_string()));
    }
    if config.training_series == 0 || config.training_series > config.functions {
        return Err(AppError::Config(format!(
            "Training series count must be in 1..={}.",
            config.functions
        )));
    }
    if config.grid_points < 2 {
        return Err(AppError::Config("Grid needs at least 2 points.".to_string()));
    }
    if !(config.x_min.is_finite() && config.x_max.is_finite() && config.x_max > config.x_min) {
        return Err(AppError::Config("Invalid x range for sample generation.".to_string()));
    }
    if !(0.0..=1.0).contains(&config.outlier_fraction) {
        return Err(AppError::Config("Outlier fraction must be in [0, 1].".to_string()));
    }

    let mut rng = StdRng::seed_from_u64(config.seed);
    let noise = Normal::new(0.0, config.noise_sd)
        .map_err(|e| AppError::Config(format!("Noise distribution error: {e}")))?;

    let step = (config.x_max - config.x_min) / (config.grid_points as f64 - 1.0);
    let xs: Vec<f64> = (0..config.grid_points)
        .map(|i| round_grid(config.x_min + step * i as f64))
        .collect();

    let ideal: Vec<Vec<f64>> = (0..config.functions)
        .map(|id| {
            let shape = CurveShape::random(id, &mut rng);
            xs.iter().map(|&x| shape.eval(x)).collect()
        })
        .collect();

    let truth: Vec<usize> = rand::seq::index::sample(&mut rng, config.functions, config.training_series).into_vec();

    let training: Vec<Vec<f64>> = truth
        .iter()
        .map(|&id| ideal[id].iter().map(|&y| y + noise.sample(&mut rng)).collect())
        .collect();

    let (y_lo, y_hi) = truth
        .iter()
        .flat_map(|&id| ideal[id].iter().copied())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), y| (lo.min(y), hi.max(y)));

    let mut test = Vec::with_capacity(config.test_points);
    for _ in 0..config.test_points {
        let i = rng.gen_range(0..xs.len());
        let y = if rng.gen_bool(config.outlier_fraction) {
            rng.gen_range(y_lo..=y_hi)
        } else {
            let id = truth[rng.gen_range(0..truth.len())];
            ideal[id][i] + noise.sample(&mut rng)
        };
        test.push((xs[i], y));
    }

    Ok(SampleData {
        xs,
        ideal,
        training,
        truth,
        test,
    })
}

/// Write `train.csv`, `ideal.csv` and `test.csv` into `dir`.
pub fn write_sample(dir: &Path, data: &SampleData) -> Result<SamplePaths, AppError> {
    create_dir_all(dir).map_err(|e| AppError::io(format!("Failed to create '{}'", dir.display()), e))?;

    let paths = SamplePaths {
        train: dir.join("train.csv"),
        ideal: dir.join("ideal.csv"),
        test: dir.join("test.csv"),
    };

    write_columns(&paths.train, &data.xs, &data.training)?;
    write_columns(&paths.ideal, &data.xs, &data.ideal)?;

    let test_x: Vec<f64> = data.test.iter().map(|p| p.0).collect();
    let test_y: Vec<f64> = data.test.iter().map(|p| p.1).collect();
    write_rows(&paths.test, &["x".to_string(), "y".to_string()], &test_x, &[test_y])?;

    Ok(paths)
}

fn write_columns(path: &Path, xs: &[f64], columns: &[Vec<f64>]) -> Result<(), AppError> {
    let mut header = vec!["x".to_string()];
    header.extend((1..=columns.len()).map(|i| format!("y{i}")));
    write_rows(path, &header, xs, columns)
}

fn write_rows(path: &Path, header: &[String], xs: &[f64], columns: &[Vec<f64>]) -> Result<(), AppError> {
    let file = File::create(path).map_err(|e| AppError::io(format!("Failed to create '{}'", path.display()), e))?;
    let mut writer = csv::Writer::from_writer(file);
    let csv_err = |e: csv::Error| AppError::write(path.display().to_string(), e);

    writer.write_record(header).map_err(csv_err)?;
    for (i, x) in xs.iter().enumerate() {
        let mut record = vec![x.to_string()];
        record.extend(columns.iter().map(|c| c[i].to_string()));
        writer.write_record(&record).map_err(csv_err)?;
    }
    writer
        .flush()
        .map_err(|e| AppError::io(format!("Failed to flush '{}'", path.display()), e))?;
    Ok(())
}

/// Keep grid x values short in the CSV (e.g. `-19.9` instead of `-19.900000000000002`).
fn round_grid(x: f64) -> f64 {
    (x * 1e6).round() / 1e6
}

/// Parametric curve families used for the demo catalog.
#[derive(Debug, Clone, Copy)]
enum CurveShape {
    Linear { a: f64, b: f64 },
    Quadratic { a: f64, b: f64 },
    Sine { a: f64, w: f64, b: f64 },
    Cosine { a: f64, w: f64, b: f64 },
    Exp { a: f64, k: f64 },
}

impl CurveShape {
    fn random(id: usize, rng: &mut StdRng) -> Self {
        match id % 5 {
            0 => CurveShape::Linear {
                a: rng.gen_range(-3.0..3.0),
                b: rng.gen_range(-5.0..5.0),
            },
            1 => CurveShape::Quadratic {
                a: rng.gen_range(-0.5..0.5),
                b: rng.gen_range(-5.0..5.0),
            },
            2 => CurveShape::Sine {
                a: rng.gen_range(0.5..5.0),
                w: rng.gen_range(0.2..2.0),
                b: rng.gen_range(-5.0..5.0),
            },
            3 => CurveShape::Cosine {
                a: rng.gen_range(0.5..5.0),
                w: rng.gen_range(0.2..2.0),
                b: rng.gen_range(-5.0..5.0),
            },
            _ => CurveShape::Exp {
                a: rng.gen_range(0.1..2.0),
                k: rng.gen_range(-0.2..0.2),
            },
        }
    }

    fn eval(self, x: f64) -> f64 {
        match self {
            CurveShape::Linear { a, b } => a * x + b,
            CurveShape::Quadratic { a, b } => a * x * x + b,
            CurveShape::Sine { a, w, b } => a * (w * x).sin() + b,
            CurveShape::Cosine { a, w, b } => a * (w * x).cos() + b,
            CurveShape::Exp { a, k } => a * (k * x).exp(),
        }
    }
}
