use std::cell::RefCell;
use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use serde_json::Value;

use super::{InvalidateScope, QueryStore};
use crate::key::CacheKey;

/// A reference in-memory [`QueryStore`].
///
/// Keeps entries and stale marks in process memory, indexed by the
/// canonical form of each key. It performs no fetching of its own, so
/// cancellation is a no-op and a scoped refetch reduces to the stale mark.
#[derive(Debug, Default)]
pub struct MemStore {
    entries: RefCell<HashMap<String, Value>>,
    stale: RefCell<HashSet<String>>,
}

impl MemStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of cached entries.
    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    /// Whether the store holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    /// Whether the entry for `key` is marked stale.
    pub fn is_stale(&self, key: &CacheKey) -> bool {
        self.stale.borrow().contains(&key.canonical())
    }
}

#[async_trait(?Send)]
impl QueryStore for MemStore {
    fn get_data(&self, key: &CacheKey) -> Option<Value> {
        self.entries.borrow().get(&key.canonical()).cloned()
    }

    fn set_data(&self, key: &CacheKey, value: Option<Value>) {
        let key = key.canonical();
        match value {
            Some(value) => {
                self.entries.borrow_mut().insert(key.clone(), value);
            }
            None => {
                self.entries.borrow_mut().remove(&key);
            }
        }
        // A fresh write supersedes any pending stale mark.
        self.stale.borrow_mut().remove(&key);
    }

    async fn cancel_in_flight(&self, _key: &CacheKey) {
        // Nothing fetches through this store, so there is nothing to cancel.
    }

    fn remove_entry(&self, key: &CacheKey) {
        let key = key.canonical();
        self.entries.borrow_mut().remove(&key);
        self.stale.borrow_mut().remove(&key);
    }

    async fn invalidate(&self, key: &CacheKey, _scope: InvalidateScope) {
        self.stale.borrow_mut().insert(key.canonical());
    }
}
