//! The cache store collaborator.
//!
//! The store that actually holds cached query data lives outside this
//! crate; [`QueryStore`] is the surface the side-effect machinery relies
//! on. [`MemStore`] is a reference in-memory implementation, suitable for
//! tests and for embedding where no richer cache is available.

use async_trait::async_trait;
use serde_json::Value;

use crate::key::CacheKey;

mod mem_store;

pub use mem_store::MemStore;

/// Scope of the refetch requested by an invalidation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidateScope {
    /// Refetch entries that currently have active observers.
    Active,
    /// Mark entries without observers; they refetch on next use.
    Inactive,
    /// Both of the above.
    All,
}

/// The external cache the side-effect machinery reads and writes.
///
/// All methods take `&self`; implementations are expected to use interior
/// mutability. The caller is single-threaded and cooperatively suspending,
/// and this crate takes no locks of its own: consistency of interleaved
/// writes to one key across concurrent mutations is the store's concern.
#[async_trait(?Send)]
pub trait QueryStore {
    /// Returns the cached value for `key`, if any.
    fn get_data(&self, key: &CacheKey) -> Option<Value>;

    /// Writes (`Some`) or clears (`None`) the cached value for `key`.
    fn set_data(&self, key: &CacheKey, value: Option<Value>);

    /// Requests cancellation of any in-flight fetch for `key`.
    ///
    /// Best effort: implementations should resolve promptly, and a no-op or
    /// timed-out cancellation is not an error. Completion is an
    /// acknowledgement, not a guarantee.
    async fn cancel_in_flight(&self, key: &CacheKey);

    /// Evicts the entry for `key` entirely.
    fn remove_entry(&self, key: &CacheKey);

    /// Marks the entry for `key` stale and requests a scoped refetch.
    async fn invalidate(&self, key: &CacheKey, scope: InvalidateScope);
}
