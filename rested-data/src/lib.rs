pub mod adapter;
pub mod error;
pub mod memory;
pub mod record;

pub use adapter::{BoxFuture, Database, DatabaseAdapter};
pub use error::DataError;
pub use memory::InMemoryDatabase;
pub use record::{into_record, record_id, Record, ID_FIELD};

#[doc(hidden)]
pub use adapter::ErasedDatabase;

pub mod prelude {
    //! Re-exports of the most commonly used data types.
    pub use crate::{Database, DatabaseAdapter, DataError, InMemoryDatabase, Record};
}
