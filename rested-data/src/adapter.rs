use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde_json::Value;

use crate::error::DataError;
use crate::record::Record;

/// Boxed future used by the object-safe adapter wrappers.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Persistence capability consumed by resource controllers.
///
/// Implement this trait to back resources with your own storage. Every
/// operation that targets a missing identifier must fail with
/// [`DataError::NotFound`]; any other error is treated as an internal failure.
///
/// Uses RPITIT (return-position `impl Trait` in traits), no `async-trait` needed.
pub trait DatabaseAdapter: Send + Sync + 'static {
    /// Store a new record and return it with its identifier assigned.
    fn insert(
        &self,
        table: &str,
        record: Record,
    ) -> impl Future<Output = Result<Record, DataError>> + Send;

    fn find_by_id(
        &self,
        table: &str,
        id: &str,
    ) -> impl Future<Output = Result<Option<Record>, DataError>> + Send;

    /// Find the first record whose `field` equals `value`.
    fn find_by_field(
        &self,
        table: &str,
        field: &str,
        value: &Value,
    ) -> impl Future<Output = Result<Option<Record>, DataError>> + Send;

    /// All records of the table, in a stable backend-defined order.
    fn list(&self, table: &str) -> impl Future<Output = Result<Vec<Record>, DataError>> + Send;

    /// Merge `fields` onto the stored record and return the result.
    fn patch(
        &self,
        table: &str,
        id: &str,
        fields: Record,
    ) -> impl Future<Output = Result<Record, DataError>> + Send;

    /// Substitute the stored record, keeping its identifier.
    fn replace(
        &self,
        table: &str,
        id: &str,
        record: Record,
    ) -> impl Future<Output = Result<Record, DataError>> + Send;

    fn delete(&self, table: &str, id: &str) -> impl Future<Output = Result<(), DataError>> + Send;
}

/// Object-safe wrapper for `DatabaseAdapter`.
#[doc(hidden)]
pub trait ErasedDatabase: Send + Sync {
    fn insert<'a>(&'a self, table: &'a str, record: Record) -> BoxFuture<'a, Result<Record, DataError>>;
    fn find_by_id<'a>(
        &'a self,
        table: &'a str,
        id: &'a str,
    ) -> BoxFuture<'a, Result<Option<Record>, DataError>>;
    fn find_by_field<'a>(
        &'a self,
        table: &'a str,
        field: &'a str,
        value: &'a Value,
    ) -> BoxFuture<'a, Result<Option<Record>, DataError>>;
    fn list<'a>(&'a self, table: &'a str) -> BoxFuture<'a, Result<Vec<Record>, DataError>>;
    fn patch<'a>(
        &'a self,
        table: &'a str,
        id: &'a str,
        fields: Record,
    ) -> BoxFuture<'a, Result<Record, DataError>>;
    fn replace<'a>(
        &'a self,
        table: &'a str,
        id: &'a str,
        record: Record,
    ) -> BoxFuture<'a, Result<Record, DataError>>;
    fn delete<'a>(&'a self, table: &'a str, id: &'a str) -> BoxFuture<'a, Result<(), DataError>>;
}

impl<T: DatabaseAdapter> ErasedDatabase for T {
    fn insert<'a>(&'a self, table: &'a str, record: Record) -> BoxFuture<'a, Result<Record, DataError>> {
        Box::pin(DatabaseAdapter::insert(self, table, record))
    }

    fn find_by_id<'a>(
        &'a self,
        table: &'a str,
        id: &'a str,
    ) -> BoxFuture<'a, Result<Option<Record>, DataError>> {
        Box::pin(DatabaseAdapter::find_by_id(self, table, id))
    }

    fn find_by_field<'a>(
        &'a self,
        table: &'a str,
        field: &'a str,
        value: &'a Value,
    ) -> BoxFuture<'a, Result<Option<Record>, DataError>> {
        Box::pin(DatabaseAdapter::find_by_field(self, table, field, value))
    }

    fn list<'a>(&'a self, table: &'a str) -> BoxFuture<'a, Result<Vec<Record>, DataError>> {
        Box::pin(DatabaseAdapter::list(self, table))
    }

    fn patch<'a>(
        &'a self,
        table: &'a str,
        id: &'a str,
        fields: Record,
    ) -> BoxFuture<'a, Result<Record, DataError>> {
        Box::pin(DatabaseAdapter::patch(self, table, id, fields))
    }

    fn replace<'a>(
        &'a self,
        table: &'a str,
        id: &'a str,
        record: Record,
    ) -> BoxFuture<'a, Result<Record, DataError>> {
        Box::pin(DatabaseAdapter::replace(self, table, id, record))
    }

    fn delete<'a>(&'a self, table: &'a str, id: &'a str) -> BoxFuture<'a, Result<(), DataError>> {
        Box::pin(DatabaseAdapter::delete(self, table, id))
    }
}

/// Shared, type-erased handle to a database backend.
///
/// Cheap to clone; this is what controllers receive at construction time.
#[derive(Clone)]
pub struct Database {
    inner: Arc<dyn ErasedDatabase>,
}

impl Database {
    pub fn new(adapter: impl DatabaseAdapter) -> Self {
        Self {
            inner: Arc::new(adapter),
        }
    }

    pub async fn insert(&self, table: &str, record: Record) -> Result<Record, DataError> {
        self.inner.insert(table, record).await
    }

    pub async fn find_by_id(&self, table: &str, id: &str) -> Result<Option<Record>, DataError> {
        self.inner.find_by_id(table, id).await
    }

    pub async fn find_by_field(
        &self,
        table: &str,
        field: &str,
        value: &Value,
    ) -> Result<Option<Record>, DataError> {
        self.inner.find_by_field(table, field, value).await
    }

    pub async fn list(&self, table: &str) -> Result<Vec<Record>, DataError> {
        self.inner.list(table).await
    }

    pub async fn patch(&self, table: &str, id: &str, fields: Record) -> Result<Record, DataError> {
        self.inner.patch(table, id, fields).await
    }

    pub async fn replace(&self, table: &str, id: &str, record: Record) -> Result<Record, DataError> {
        self.inner.replace(table, id, record).await
    }

    pub async fn delete(&self, table: &str, id: &str) -> Result<(), DataError> {
        self.inner.delete(table, id).await
    }
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database").finish_non_exhaustive()
    }
}
