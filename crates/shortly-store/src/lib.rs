//! Summary result store.
//!
//! This crate provides:
//! - The [`ResultStore`] trait injected into request handlers
//! - [`MemoryStore`], a lock-guarded map keyed by exact URL string
//! - [`PersistentStore`], an append-only REST table client
//! - [`MirroredStore`], memory first with a best-effort persistent mirror

pub mod error;
pub mod memory;
pub mod metrics;
pub mod mirrored;
pub mod persistent;

use async_trait::async_trait;
use shortly_models::SummaryRecord;

pub use error::{StoreError, StoreResult};
pub use memory::MemoryStore;
pub use mirrored::MirroredStore;
pub use persistent::{PersistentStore, PersistentStoreConfig};

/// Key-value mapping from source URL to its latest summary.
///
/// Keys are compared as exact strings. Writes overwrite unconditionally
/// (last write wins); nothing is ever evicted.
#[async_trait]
pub trait ResultStore: Send + Sync {
    /// Store a record under `record.source_url`, replacing any previous one.
    async fn put(&self, record: SummaryRecord) -> StoreResult<()>;

    /// Look up the record for an exact URL string.
    async fn get(&self, url: &str) -> StoreResult<Option<SummaryRecord>>;

    /// Number of records the store currently holds.
    async fn len(&self) -> StoreResult<usize>;

    async fn is_empty(&self) -> StoreResult<bool> {
        Ok(self.len().await? == 0)
    }

    /// Short backend name for logs and service info.
    fn backend(&self) -> &'static str;
}
