//! Reference function catalog.
//!
//! The catalog is built once from a table whose x column is shared by every
//! function and whose remaining columns are one function each (in column
//! order, so the first non-x column is id `0`).
//!
//! Evaluation policy, used identically by scoring and classification:
//! - x equal to a sample: the sampled value
//! - x strictly between two samples: linear interpolation
//! - x outside `[x_min, x_max]`: [`AppError::OutOfRange`]

use crate::error::AppError;
use crate::store::Table;

/// One reference function: a name plus y-samples on the catalog's x grid.
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceFunction {
    pub id: usize,
    pub name: String,
    ys: Vec<f64>,
}

impl ReferenceFunction {
    pub fn samples(&self) -> &[f64] {
        &self.ys
    }
}

/// Immutable set of candidate functions on a shared, strictly increasing x grid.
#[derive(Debug, Clone, PartialEq)]
pub struct CurveCatalog {
    xs: Vec<f64>,
    functions: Vec<ReferenceFunction>,
}

impl CurveCatalog {
    /// Build a catalog from explicit samples.
    ///
    /// `columns` pairs each function name with its y-samples aligned to `xs`.
    /// Rows are sorted by x; duplicate or non-finite values are rejected.
    pub fn from_samples(
        source: &str,
        xs: Vec<f64>,
        columns: Vec<(String, Vec<f64>)>,
    ) -> Result<Self, AppError> {
        if columns.is_empty() {
            return Err(AppError::load(source, "No reference function columns."));
        }
        if xs.len() < 2 {
            return Err(AppError::load(
                source,
                format!("Need at least 2 x samples, found {}.", xs.len()),
            ));
        }
        if let Some(bad) = xs.iter().find(|x| !x.is_finite()) {
            return Err(AppError::load(source, format!("Non-finite x value {bad}.")));
        }
        for (name, ys) in &columns {
            if ys.len() != xs.len() {
                return Err(AppError::load(
                    source,
                    format!("Column `{name}` has {} samples, expected {}.", ys.len(), xs.len()),
                ));
            }
            if let Some(bad) = ys.iter().find(|y| !y.is_finite()) {
                return Err(AppError::load(source, format!("Column `{name}` has non-finite value {bad}.")));
            }
        }

        // Sort rows by x once so lookups can binary search.
        let mut order: Vec<usize> = (0..xs.len()).collect();
        order.sort_by(|&a, &b| xs[a].total_cmp(&xs[b]));

        let sorted_xs: Vec<f64> = order.iter().map(|&i| xs[i]).collect();
        if let Some(w) = sorted_xs.windows(2).find(|w| w[0] == w[1]) {
            return Err(AppError::load(source, format!("Duplicate x value {}.", w[0])));
        }

        let functions = columns
            .into_iter()
            .enumerate()
            .map(|(id, (name, ys))| ReferenceFunction {
                id,
                name,
                ys: order.iter().map(|&i| ys[i]).collect(),
            })
            .collect();

        Ok(Self {
            xs: sorted_xs,
            functions,
        })
    }

    /// Build a catalog from a stored table, with `x_column` as the shared grid.
    pub fn from_table(source: &str, table: &Table, x_column: &str) -> Result<Self, AppError> {
        let x_idx = table
            .column_index(x_column)
            .ok_or_else(|| AppError::load(source, format!("Missing x column `{x_column}`.")))?;

        let cell = |row: usize, col: usize| -> Result<f64, AppError> {
            table.rows[row][col].ok_or_else(|| {
                AppError::load(
                    source,
                    format!("Row {row}: empty value in column `{}`.", table.columns[col]),
                )
            })
        };

        let xs = (0..table.rows.len())
            .map(|r| cell(r, x_idx))
            .collect::<Result<Vec<_>, _>>()?;

        let mut columns = Vec::with_capacity(table.columns.len().saturating_sub(1));
        for (col, name) in table.columns.iter().enumerate() {
            if col == x_idx {
                continue;
            }
            let ys = (0..table.rows.len())
                .map(|r| cell(r, col))
                .collect::<Result<Vec<_>, _>>()?;
            columns.push((name.clone(), ys));
        }

        Self::from_samples(source, xs, columns)
    }

    pub fn count(&self) -> usize {
        self.functions.len()
    }

    pub fn ids(&self) -> impl Iterator<Item = usize> + '_ {
        self.functions.iter().map(|f| f.id)
    }

    pub fn function(&self, id: usize) -> Result<&ReferenceFunction, AppError> {
        self.functions
            .get(id)
            .ok_or(AppError::UnknownFunction { function_id: id })
    }

    pub fn name(&self, id: usize) -> Result<&str, AppError> {
        self.function(id).map(|f| f.name.as_str())
    }

    /// Inclusive sampled domain `(x_min, x_max)`.
    pub fn domain(&self) -> (f64, f64) {
        (self.xs[0], self.xs[self.xs.len() - 1])
    }

    pub fn xs(&self) -> &[f64] {
        &self.xs
    }

    /// Evaluate function `id` at `x` (exact sample or linear interpolation).
    pub fn evaluate(&self, id: usize, x: f64) -> Result<f64, AppError> {
        let f = self.function(id)?;
        let (min, max) = self.domain();
        if !(x >= min && x <= max) {
            return Err(AppError::OutOfRange {
                function_id: id,
                x,
                min,
                max,
            });
        }

        // First index with xs[i] >= x; always in range because x <= max.
        let i = self.xs.partition_point(|&v| v < x);
        if self.xs[i] == x {
            return Ok(f.ys[i]);
        }

        // x > min here, so i >= 1.
        let (x0, x1) = (self.xs[i - 1], self.xs[i]);
        let (y0, y1) = (f.ys[i - 1], f.ys[i]);
        let u = (x - x0) / (x1 - x0);
        Ok(y0 + u * (y1 - y0))
    }
}
