#![allow(dead_code)]

use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use rested_core::http::HeaderMap;
use rested_data::{DataError, DatabaseAdapter, InMemoryDatabase, Record};
use rested_security::{SecurityError, Session, SessionAdapter, SessionGrant};
use serde_json::{Map, Value};

/// In-memory database that counts the calls it receives.
#[derive(Clone, Default)]
pub struct CountingDatabase {
    pub inner: InMemoryDatabase,
    reads: Arc<AtomicUsize>,
    writes: Arc<AtomicUsize>,
}

impl CountingDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn calls(&self) -> usize {
        self.reads() + self.writes()
    }

    fn read(&self) {
        self.reads.fetch_add(1, Ordering::SeqCst);
    }

    fn write(&self) {
        self.writes.fetch_add(1, Ordering::SeqCst);
    }
}

impl DatabaseAdapter for CountingDatabase {
    fn insert(&self, table: &str, record: Record) -> impl Future<Output = Result<Record, DataError>> + Send {
        self.write();
        self.inner.insert(table, record)
    }

    fn find_by_id(
        &self,
        table: &str,
        id: &str,
    ) -> impl Future<Output = Result<Option<Record>, DataError>> + Send {
        self.read();
        self.inner.find_by_id(table, id)
    }

    fn find_by_field(
        &self,
        table: &str,
        field: &str,
        value: &Value,
    ) -> impl Future<Output = Result<Option<Record>, DataError>> + Send {
        self.read();
        self.inner.find_by_field(table, field, value)
    }

    fn list(&self, table: &str) -> impl Future<Output = Result<Vec<Record>, DataError>> + Send {
        self.read();
        self.inner.list(table)
    }

    fn patch(
        &self,
        table: &str,
        id: &str,
        fields: Record,
    ) -> impl Future<Output = Result<Record, DataError>> + Send {
        self.write();
        self.inner.patch(table, id, fields)
    }

    fn replace(
        &self,
        table: &str,
        id: &str,
        record: Record,
    ) -> impl Future<Output = Result<Record, DataError>> + Send {
        self.write();
        self.inner.replace(table, id, record)
    }

    fn delete(&self, table: &str, id: &str) -> impl Future<Output = Result<(), DataError>> + Send {
        self.write();
        self.inner.delete(table, id)
    }
}

/// Database whose every call fails with a backend error.
#[derive(Clone, Copy, Default)]
pub struct FailingDatabase;

fn unavailable<T: Send + 'static>() -> impl Future<Output = Result<T, DataError>> + Send {
    async { Err(DataError::Other("database adapter not implemented".into())) }
}

impl DatabaseAdapter for FailingDatabase {
    fn insert(&self, _: &str, _: Record) -> impl Future<Output = Result<Record, DataError>> + Send {
        unavailable()
    }

    fn find_by_id(&self, _: &str, _: &str) -> impl Future<Output = Result<Option<Record>, DataError>> + Send {
        unavailable()
    }

    fn find_by_field(
        &self,
        _: &str,
        _: &str,
        _: &Value,
    ) -> impl Future<Output = Result<Option<Record>, DataError>> + Send {
        unavailable()
    }

    fn list(&self, _: &str) -> impl Future<Output = Result<Vec<Record>, DataError>> + Send {
        unavailable()
    }

    fn patch(&self, _: &str, _: &str, _: Record) -> impl Future<Output = Result<Record, DataError>> + Send {
        unavailable()
    }

    fn replace(&self, _: &str, _: &str, _: Record) -> impl Future<Output = Result<Record, DataError>> + Send {
        unavailable()
    }

    fn delete(&self, _: &str, _: &str) -> impl Future<Output = Result<(), DataError>> + Send {
        unavailable()
    }
}

/// Session backend whose every call fails.
#[derive(Clone, Copy, Default)]
pub struct FailingSession;

impl SessionAdapter for FailingSession {
    fn load(&self, _: &HeaderMap) -> impl Future<Output = Result<Option<Session>, SecurityError>> + Send {
        async { Err(SecurityError::Backend("session adapter not implemented".into())) }
    }

    fn create(
        &self,
        _: &HeaderMap,
        _: &Map<String, Value>,
    ) -> impl Future<Output = Result<SessionGrant, SecurityError>> + Send {
        async { Err(SecurityError::Backend("session adapter not implemented".into())) }
    }

    fn destroy(&self, _: &HeaderMap, _: &Session) -> impl Future<Output = Result<(), SecurityError>> + Send {
        async { Err(SecurityError::Backend("session adapter not implemented".into())) }
    }
}

pub fn record(value: Value) -> Record {
    rested_data::into_record(value).expect("object literal")
}
