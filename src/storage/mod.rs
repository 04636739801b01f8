pub mod json_backend;
pub mod memory;
pub mod persistence;

use crate::errors::LedgerError;

pub type Result<T> = std::result::Result<T, LedgerError>;

/// Durable string-valued key-value store the ledger persists into.
pub trait KeyValueStore: Send + Sync {
    /// Returns the value under `key`, or `None` when nothing is stored.
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn put(&self, key: &str, value: &str) -> Result<()>;
    /// Deletes `key`; returns whether a value existed.
    fn remove(&self, key: &str) -> Result<bool>;
}

pub use json_backend::JsonFileStore;
pub use memory::MemoryStore;
pub use persistence::{
    LoadReport, PersistenceAdapter, RetryPolicy, CURRENT_SCHEMA_VERSION, DEFAULT_STORAGE_KEY,
};
