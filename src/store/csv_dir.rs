//! Directory-backed table store: one CSV file per table.
//!
//! Writes go to `<name>.csv.tmp` first and are renamed over `<name>.csv`, so a
//! reader sees the previous table or the new one, never a half-written file.
//! Numbers are written with `f64`'s shortest round-trip formatting; nulls are
//! empty fields.

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use crate::error::AppError;
use crate::store::{Table, TableStore, validate_table_name};

#[derive(Debug, Clone)]
pub struct CsvDirStore {
    dir: PathBuf,
}

impl CsvDirStore {
    /// Open (and create if needed) a store rooted at `dir`.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, AppError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .map_err(|e| AppError::io(format!("Failed to create store dir '{}'", dir.display()), e))?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn table_path(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{name}.csv"))
    }
}

impl TableStore for CsvDirStore {
    fn save(&mut self, name: &str, table: &Table) -> Result<(), AppError> {
        validate_table_name(name)?;
        table.validate(name)?;

        let path = self.table_path(name);
        let tmp = self.dir.join(format!("{name}.csv.tmp"));

        let file = File::create(&tmp)
            .map_err(|e| AppError::io(format!("Failed to create '{}'", tmp.display()), e))?;
        let mut writer = csv::Writer::from_writer(file);

        let csv_err = |e: csv::Error| AppError::write(tmp.display().to_string(), e);

        writer.write_record(&table.columns).map_err(csv_err)?;
        for row in &table.rows {
            writer
                .write_record(row.iter().map(|cell| cell.map(|v| v.to_string()).unwrap_or_default()))
                .map_err(csv_err)?;
        }
        writer
            .flush()
            .map_err(|e| AppError::io(format!("Failed to flush '{}'", tmp.display()), e))?;
        drop(writer);

        fs::rename(&tmp, &path)
            .map_err(|e| AppError::io(format!("Failed to replace '{}'", path.display()), e))?;

        log::debug!("saved table '{name}' ({} rows) to {}", table.rows.len(), path.display());
        Ok(())
    }

    fn load(&self, name: &str) -> Result<Table, AppError> {
        validate_table_name(name)?;
        let path = self.table_path(name);
        if !path.is_file() {
            return Err(AppError::NotFound {
                table: name.to_string(),
            });
        }

        let file = File::open(&path)
            .map_err(|e| AppError::io(format!("Failed to open '{}'", path.display()), e))?;
        let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(file);

        let columns: Vec<String> = reader
            .headers()
            .map_err(|e| AppError::load(name, format!("Failed to read header: {e}")))?
            .iter()
            .map(str::to_string)
            .collect();

        let mut rows = Vec::new();
        for (idx, record) in reader.records().enumerate() {
            let line = idx + 2;
            let record = record.map_err(|e| AppError::load(name, format!("line {line}: {e}")))?;
            let row = record
                .iter()
                .zip(&columns)
                .map(|(cell, column)| {
                    if cell.is_empty() {
                        return Ok(None);
                    }
                    cell.parse::<f64>().map(Some).map_err(|_| {
                        AppError::load(name, format!("line {line}, column `{column}`: not a number: '{cell}'"))
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;
            rows.push(row);
        }

        let table = Table::with_rows(columns, rows);
        table.validate(name)?;
        Ok(table)
    }

    fn contains(&self, name: &str) -> bool {
        validate_table_name(name).is_ok() && self.table_path(name).is_file()
    }
}
