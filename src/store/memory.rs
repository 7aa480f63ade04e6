use std::collections::BTreeMap;

use crate::error::AppError;
use crate::store::{Table, TableStore, validate_table_name};

/// In-process table store.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    tables: BTreeMap<String, Table>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn table_names(&self) -> impl Iterator<Item = &str> {
        self.tables.keys().map(String::as_str)
    }
}

impl TableStore for MemoryStore {
    fn save(&mut self, name: &str, table: &Table) -> Result<(), AppError> {
        validate_table_name(name)?;
        table.validate(name)?;
        self.tables.insert(name.to_string(), table.clone());
        Ok(())
    }

    fn load(&self, name: &str) -> Result<Table, AppError> {
        self.tables.get(name).cloned().ok_or_else(|| AppError::NotFound {
            table: name.to_string(),
        })
    }

    fn contains(&self, name: &str) -> bool {
        self.tables.contains_key(name)
    }
}
