//! Persist classification results and hand them to the chart renderer.

use std::path::Path;

use crate::domain::Assignment;
use crate::error::AppError;
use crate::plot::chart::{ChartCurve, render_chart};
use crate::store::{Table, TableStore, validate_table_name};

pub const RESULT_COLUMNS: [&str; 4] = ["x", "y", "function_id", "deviation"];

/// Writes assignments to a fixed result table and renders the chart.
pub struct ResultSink<'a, S: TableStore> {
    store: &'a mut S,
    table: String,
}

impl<'a, S: TableStore> ResultSink<'a, S> {
    pub fn new(store: &'a mut S, table: impl Into<String>) -> Result<Self, AppError> {
        let table = table.into();
        validate_table_name(&table)?;
        Ok(Self { store, table })
    }

    pub fn table_name(&self) -> &str {
        &self.table
    }

    /// Replace the result table with `assignments`.
    pub fn persist(&mut self, assignments: &[Assignment]) -> Result<(), AppError> {
        let table = assignments_to_table(assignments);
        self.store.save(&self.table, &table)?;
        log::info!("persisted {} result rows to table '{}'", assignments.len(), self.table);
        Ok(())
    }

    /// Render the scatter/error-bar chart to `path`.
    pub fn render(&self, assignments: &[Assignment], curves: &[ChartCurve], path: &Path) -> Result<(), AppError> {
        render_chart(assignments, curves, path)?;
        log::info!("wrote chart to {}", path.display());
        Ok(())
    }
}

pub fn assignments_to_table(assignments: &[Assignment]) -> Table {
    let rows = assignments
        .iter()
        .map(|a| {
            vec![
                Some(a.x),
                Some(a.y),
                a.function_id.map(|id| id as f64),
                a.deviation,
            ]
        })
        .collect();
    Table::with_rows(RESULT_COLUMNS.iter().map(|c| c.to_string()).collect(), rows)
}

/// Read a result table back into assignments.
pub fn load_assignments<S: TableStore>(store: &S, table: &str) -> Result<Vec<Assignment>, AppError> {
    let t = store.load(table)?;
    let col = |name: &str| {
        t.column_index(name)
            .ok_or_else(|| AppError::load(table, format!("Missing column `{name}`.")))
    };
    let (xi, yi, fi, di) = (col("x")?, col("y")?, col("function_id")?, col("deviation")?);

    t.rows
        .iter()
        .enumerate()
        .map(|(r, row)| {
            let (Some(x), Some(y)) = (row[xi], row[yi]) else {
                return Err(AppError::load(table, format!("Row {r}: missing x or y.")));
            };
            let function_id = match row[fi] {
                None => None,
                Some(v) if v >= 0.0 && v.fract() == 0.0 => Some(v as usize),
                Some(v) => return Err(AppError::load(table, format!("Row {r}: invalid function id {v}."))),
            };
            if function_id.is_some() != row[di].is_some() {
                return Err(AppError::load(
                    table,
                    format!("Row {r}: function id and deviation must both be set or both be empty."),
                ));
            }
            Ok(Assignment {
                x,
                y,
                function_id,
                deviation: row[di],
            })
        })
        .collect()
}
