//! Named-table persistence.
//!
//! Raw inputs and classification results are kept as numeric tables keyed by
//! name. Two implementations:
//!
//! - [`CsvDirStore`]: one `<name>.csv` per table inside a directory
//! - [`MemoryStore`]: a map, used by tests and dry runs
//!
//! Store handles are passed explicitly to whoever needs them.

use crate::error::AppError;

pub mod csv_dir;
pub mod memory;

pub use csv_dir::CsvDirStore;
pub use memory::MemoryStore;

/// A rectangular numeric table. `None` cells are nulls.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Option<f64>>>,
}

impl Table {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn with_rows(columns: Vec<String>, rows: Vec<Vec<Option<f64>>>) -> Self {
        Self { columns, rows }
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.eq_ignore_ascii_case(name))
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Reject tables whose rows don't match the header width.
    pub fn validate(&self, name: &str) -> Result<(), AppError> {
        if self.columns.is_empty() {
            return Err(AppError::Config(format!("Table '{name}' has no columns.")));
        }
        for (i, row) in self.rows.iter().enumerate() {
            if row.len() != self.columns.len() {
                return Err(AppError::Config(format!(
                    "Table '{name}' row {i} has {} cells, expected {}.",
                    row.len(),
                    self.columns.len()
                )));
            }
        }
        Ok(())
    }
}

/// Load/replace persistence of named tables.
pub trait TableStore {
    /// Replace whatever is stored under `name` with `table`.
    ///
    /// Readers observe either the old or the new content, never a mix.
    fn save(&mut self, name: &str, table: &Table) -> Result<(), AppError>;

    /// Read back a saved table. Never-saved names are [`AppError::NotFound`].
    fn load(&self, name: &str) -> Result<Table, AppError>;

    fn contains(&self, name: &str) -> bool;
}

/// Table names double as file stems, so keep them boring.
pub fn validate_table_name(name: &str) -> Result<(), AppError> {
    let ok = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if ok {
        Ok(())
    } else {
        Err(AppError::Config(format!(
            "Invalid table name '{name}' (use letters, digits, '_' or '-')."
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_names_are_restricted() {
        assert!(validate_table_name("test_results").is_ok());
        assert!(validate_table_name("ideal-2").is_ok());
        assert!(validate_table_name("").is_err());
        assert!(validate_table_name("../etc").is_err());
        assert!(validate_table_name("a b").is_err());
    }

    #[test]
    fn ragged_rows_are_rejected() {
        let table = Table::with_rows(
            vec!["x".into(), "y".into()],
            vec![vec![Some(1.0), Some(2.0)], vec![Some(1.0)]],
        );
        assert!(matches!(table.validate("t"), Err(AppError::Config(_))));
    }

    #[test]
    fn column_lookup_ignores_case() {
        let table = Table::new(vec!["X".into(), "Y1".into()]);
        assert_eq!(table.column_index("y1"), Some(1));
        assert_eq!(table.column_index("y2"), None);
    }
}
