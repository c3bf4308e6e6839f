use std::collections::HashMap;

use serde_json::Value;

use crate::key::CacheKey;

/// Pre-patch snapshots of target cache entries, keyed by the canonical form
/// of each target key.
///
/// A context is owned by exactly one mutation invocation: created when the
/// mutation starts, handed by reference to the terminal phase, then
/// dropped. Combining fragments is a pure merge producing a new value;
/// nothing is assigned in place, so concurrent invocations never alias one
/// context.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RollbackContext {
    snapshots: HashMap<String, Option<Value>>,
}

impl RollbackContext {
    /// An empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// A single-entry fragment recording that `key` held `value` before any
    /// patch was applied.
    ///
    /// `None` records that the entry was absent.
    pub fn capture(key: &CacheKey, value: Option<Value>) -> Self {
        let mut snapshots = HashMap::with_capacity(1);
        snapshots.insert(key.canonical(), value);
        Self { snapshots }
    }

    /// Merges `fragment` into this context, producing the combined context.
    ///
    /// Fragments for distinct target keys do not collide; on the same key
    /// the later fragment wins.
    #[must_use]
    pub fn merged(mut self, fragment: RollbackContext) -> Self {
        self.snapshots.extend(fragment.snapshots);
        self
    }

    /// The snapshot captured for `key`, if one was.
    ///
    /// `Some(None)` means the entry was absent when the snapshot was taken.
    pub fn snapshot(&self, key: &CacheKey) -> Option<&Option<Value>> {
        self.snapshots.get(&key.canonical())
    }

    /// The value to restore for `key`: the captured snapshot, or absent
    /// when no fragment covers the key.
    pub fn restored(&self, key: &CacheKey) -> Option<Value> {
        self.snapshots.get(&key.canonical()).cloned().flatten()
    }

    /// Number of captured fragments.
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Whether no fragment was captured.
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}
