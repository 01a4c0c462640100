use std::future::Future;
use std::sync::Arc;

use dashmap::DashMap;
use serde_json::Value;

use crate::adapter::DatabaseAdapter;
use crate::error::DataError;
use crate::record::{record_id, Record, ID_FIELD};

/// In-memory database for development and testing.
///
/// Each table keeps its records in insertion order, so `list` is stable for
/// a fixed dataset. Identifiers are random UUID v4 strings stored in `id`.
#[derive(Clone, Default)]
pub struct InMemoryDatabase {
    tables: Arc<DashMap<String, Vec<Record>>>,
}

impl InMemoryDatabase {
    /// Create a new empty in-memory database.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records currently stored in `table`.
    pub fn len(&self, table: &str) -> usize {
        self.tables.get(table).map(|rows| rows.len()).unwrap_or(0)
    }

    pub fn is_empty(&self, table: &str) -> bool {
        self.len(table) == 0
    }

    fn insert_now(&self, table: &str, mut record: Record) -> Record {
        let id = uuid::Uuid::new_v4().to_string();
        record.insert(ID_FIELD.to_string(), Value::String(id));
        self.tables
            .entry(table.to_string())
            .or_default()
            .push(record.clone());
        record
    }

    fn find_now(&self, table: &str, id: &str) -> Option<Record> {
        let rows = self.tables.get(table)?;
        rows.iter()
            .find(|row| record_id(row).as_deref() == Some(id))
            .cloned()
    }

    fn find_by_field_now(&self, table: &str, field: &str, value: &Value) -> Option<Record> {
        let rows = self.tables.get(table)?;
        rows.iter().find(|row| row.get(field) == Some(value)).cloned()
    }

    /// Apply `f` to the stored record with identifier `id`.
    fn update_now(
        &self,
        table: &str,
        id: &str,
        f: impl FnOnce(&mut Record),
    ) -> Result<Record, DataError> {
        let mut rows = self
            .tables
            .get_mut(table)
            .ok_or_else(|| DataError::not_found(table, id))?;
        let row = rows
            .iter_mut()
            .find(|row| record_id(row).as_deref() == Some(id))
            .ok_or_else(|| DataError::not_found(table, id))?;
        let stored_id = row.get(ID_FIELD).cloned();
        f(row);
        if let Some(stored_id) = stored_id {
            row.insert(ID_FIELD.to_string(), stored_id);
        }
        Ok(row.clone())
    }

    fn delete_now(&self, table: &str, id: &str) -> Result<(), DataError> {
        let mut rows = self
            .tables
            .get_mut(table)
            .ok_or_else(|| DataError::not_found(table, id))?;
        let position = rows
            .iter()
            .position(|row| record_id(row).as_deref() == Some(id))
            .ok_or_else(|| DataError::not_found(table, id))?;
        rows.remove(position);
        Ok(())
    }
}

impl DatabaseAdapter for InMemoryDatabase {
    fn insert(
        &self,
        table: &str,
        record: Record,
    ) -> impl Future<Output = Result<Record, DataError>> + Send {
        let result = self.insert_now(table, record);
        tracing::trace!(table, id = ?result.get(ID_FIELD), "Inserted record");
        async move { Ok(result) }
    }

    fn find_by_id(
        &self,
        table: &str,
        id: &str,
    ) -> impl Future<Output = Result<Option<Record>, DataError>> + Send {
        let result = self.find_now(table, id);
        async move { Ok(result) }
    }

    fn find_by_field(
        &self,
        table: &str,
        field: &str,
        value: &Value,
    ) -> impl Future<Output = Result<Option<Record>, DataError>> + Send {
        let result = self.find_by_field_now(table, field, value);
        async move { Ok(result) }
    }

    fn list(&self, table: &str) -> impl Future<Output = Result<Vec<Record>, DataError>> + Send {
        let result = self
            .tables
            .get(table)
            .map(|rows| rows.clone())
            .unwrap_or_default();
        async move { Ok(result) }
    }

    fn patch(
        &self,
        table: &str,
        id: &str,
        fields: Record,
    ) -> impl Future<Output = Result<Record, DataError>> + Send {
        let result = self.update_now(table, id, |row| {
            for (key, value) in fields {
                row.insert(key, value);
            }
        });
        async move { result }
    }

    fn replace(
        &self,
        table: &str,
        id: &str,
        record: Record,
    ) -> impl Future<Output = Result<Record, DataError>> + Send {
        let result = self.update_now(table, id, |row| *row = record);
        async move { result }
    }

    fn delete(&self, table: &str, id: &str) -> impl Future<Output = Result<(), DataError>> + Send {
        let result = self.delete_now(table, id);
        async move { result }
    }
}
