//! Declarative propagation of mutation side effects onto cached queries.
//!
//! A mutation rarely changes only its own result: saving a record should
//! also adjust the cached list that contains it, or force that list to be
//! fetched again. [`SideEffect`] declares one such relationship between a
//! source mutation and a target query; [`EffectChain`] composes several of
//! them into a single [`MutationEffect`] the mutation executor drives.
//!
//! One mutation attempt moves through the lifecycle exactly once:
//!
//! 1. **before mutation**: cancel the target's in-flight fetch, snapshot
//!    its cached value, apply the optimistic patch if one is declared.
//! 2. the source request is dispatched.
//! 3. **after success**: apply the declared update, then the invalidation
//!    policy. Or **after error**: restore every snapshot taken in step 1.
//!
//! The snapshots travel in a [`RollbackContext`] owned by that single
//! attempt, so overlapping invocations of the same mutation never share
//! rollback state.

use async_trait::async_trait;

use crate::error::{CallError, EffectResult};
use crate::methods::MutationMethod;
use crate::stores::QueryStore;

mod chain;
mod rollback;
mod side_effect;

pub use chain::EffectChain;
pub use rollback::RollbackContext;
pub use side_effect::SideEffect;

/// What happens to the target cache entry after the source mutation
/// succeeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InvalidatePolicy {
    /// Leave the entry alone.
    #[default]
    None,
    /// Evict the entry entirely.
    Remove,
    /// Mark the entry stale and refetch it where actively observed.
    Active,
    /// Mark the entry stale; it refetches on next use.
    Inactive,
    /// Mark the entry stale and refetch it regardless of observers.
    All,
}

impl From<bool> for InvalidatePolicy {
    /// `true` is shorthand for [`InvalidatePolicy::Active`].
    fn from(refetch: bool) -> Self {
        if refetch {
            Self::Active
        } else {
            Self::None
        }
    }
}

/// Lifecycle callbacks one mutation drives against the cache.
///
/// Implementations must not keep per-call state between phases: everything
/// a later phase needs is either recomputed from the request or carried in
/// the [`RollbackContext`] returned by [`before_mutation`].
///
/// [`before_mutation`]: MutationEffect::before_mutation
#[async_trait(?Send)]
pub trait MutationEffect<S>
where
    S: MutationMethod,
{
    /// Runs before the source request is dispatched.
    ///
    /// Returns the rollback fragment for this effect's target key, captured
    /// whether or not an optimistic patch was applied, so rollback is
    /// always possible.
    async fn before_mutation(
        &self,
        store: &dyn QueryStore,
        request: &S::Request,
    ) -> EffectResult<RollbackContext>;

    /// Runs after the source mutation resolved successfully.
    async fn after_success(
        &self,
        store: &dyn QueryStore,
        response: &S::Response,
        request: &S::Request,
        rollback: &RollbackContext,
    ) -> EffectResult<()>;

    /// Runs after the source mutation failed.
    ///
    /// Restores the pre-mutation snapshot unconditionally, regardless of
    /// the kind of `error`.
    async fn after_error(
        &self,
        store: &dyn QueryStore,
        error: &CallError,
        request: &S::Request,
        rollback: &RollbackContext,
    ) -> EffectResult<()>;
}
