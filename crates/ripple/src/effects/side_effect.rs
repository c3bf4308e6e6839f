use std::fmt;
use std::rc::Rc;

use async_trait::async_trait;
use serde_json::Value;

use super::{InvalidatePolicy, MutationEffect, RollbackContext};
use crate::error::{CallError, EffectResult};
use crate::key::{query_key, CacheKey};
use crate::methods::{MutationMethod, QueryMethod, ServiceMethod};
use crate::stores::{InvalidateScope, QueryStore};

type MapRequest<S, M> =
    Rc<dyn Fn(&<S as ServiceMethod>::Request) -> <M as ServiceMethod>::Request>;
type Patch<S, M> = Rc<
    dyn Fn(
        Option<<M as ServiceMethod>::Response>,
        &<S as ServiceMethod>::Request,
    ) -> <M as ServiceMethod>::Response,
>;
type Update<S, M> = Rc<
    dyn Fn(
        Option<<M as ServiceMethod>::Response>,
        &<S as ServiceMethod>::Response,
    ) -> <M as ServiceMethod>::Response,
>;

/// Declares how one mutation `S` affects the cached result of one query
/// `M`.
///
/// A descriptor is immutable once constructed and holds no per-call state;
/// everything request-specific lives in the [`RollbackContext`] the
/// lifecycle threads through.
///
/// ```ignore
/// // Saving a todo patches the cached todo optimistically, replaces it
/// // with the server's response on success, and forces the list to
/// // refetch.
/// let on_todo = SideEffect::<SaveTodo, TodoQuery>::new()
///     .patch(|current, request| merge(current, request))
///     .update(|_current, response| response.clone());
/// let on_list = SideEffect::<SaveTodo, TodoListQuery>::mapped(|_| ListRequest::all())
///     .invalidate(InvalidatePolicy::Active);
/// ```
pub struct SideEffect<S, M>
where
    S: MutationMethod,
    M: QueryMethod,
{
    map_request: MapRequest<S, M>,
    patch: Option<Patch<S, M>>,
    update: Option<Update<S, M>>,
    invalidate: InvalidatePolicy,
}

impl<S, M> SideEffect<S, M>
where
    S: MutationMethod,
    M: QueryMethod<Request = S::Request>,
{
    /// Creates a descriptor whose target key reuses the source request
    /// verbatim.
    pub fn new() -> Self {
        Self::mapped(|request: &S::Request| request.clone())
    }
}

impl<S, M> Default for SideEffect<S, M>
where
    S: MutationMethod,
    M: QueryMethod<Request = S::Request>,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<S, M> SideEffect<S, M>
where
    S: MutationMethod,
    M: QueryMethod,
{
    /// Creates a descriptor deriving the target key through `map`.
    ///
    /// `map` must be total and is re-evaluated in every lifecycle phase, so
    /// it should also be deterministic: a mapping that returns different
    /// target requests across phases patches one entry and rolls back
    /// another.
    pub fn mapped<F>(map: F) -> Self
    where
        F: 'static + Fn(&S::Request) -> M::Request,
    {
        Self {
            map_request: Rc::new(map),
            patch: None,
            update: None,
            invalidate: InvalidatePolicy::default(),
        }
    }

    /// Sets the optimistic patch applied when the mutation starts.
    ///
    /// Receives the currently cached target value (if any) and the source
    /// request; returns the speculative replacement.
    pub fn patch<F>(mut self, patch: F) -> Self
    where
        F: 'static + Fn(Option<M::Response>, &S::Request) -> M::Response,
    {
        self.patch = Some(Rc::new(patch));
        self
    }

    /// Sets the update applied after the mutation succeeds.
    ///
    /// Receives the currently cached target value (if any) and the source
    /// response; returns the replacement.
    pub fn update<F>(mut self, update: F) -> Self
    where
        F: 'static + Fn(Option<M::Response>, &S::Response) -> M::Response,
    {
        self.update = Some(Rc::new(update));
        self
    }

    /// Sets what happens to the target entry after the mutation succeeds.
    ///
    /// `bool` is accepted as shorthand: `true` behaves like
    /// [`InvalidatePolicy::Active`].
    pub fn invalidate(mut self, policy: impl Into<InvalidatePolicy>) -> Self {
        self.invalidate = policy.into();
        self
    }

    /// The target key for `request`, re-derived on every call.
    fn target_key(&self, request: &S::Request) -> EffectResult<CacheKey> {
        let target = (self.map_request)(request);
        query_key::<M>(Some(&target))
    }
}

fn decode<M>(value: Option<Value>) -> EffectResult<Option<M::Response>>
where
    M: ServiceMethod,
{
    Ok(value.map(serde_json::from_value).transpose()?)
}

#[async_trait(?Send)]
impl<S, M> MutationEffect<S> for SideEffect<S, M>
where
    S: MutationMethod,
    M: QueryMethod,
{
    async fn before_mutation(
        &self,
        store: &dyn QueryStore,
        request: &S::Request,
    ) -> EffectResult<RollbackContext> {
        let key = self.target_key(request)?;

        // An in-flight fetch resolving late would overwrite the patch
        // applied below.
        store.cancel_in_flight(&key).await;

        let current = store.get_data(&key);

        if let Some(ref patch) = self.patch {
            let existing = decode::<M>(current.clone())?;
            let patched = patch(existing, request);
            tracing::debug!(key = %key, "applying optimistic patch");
            store.set_data(&key, Some(serde_json::to_value(&patched)?));
        }

        // Snapshot even without a patch so rollback is always possible.
        Ok(RollbackContext::capture(&key, current))
    }

    async fn after_success(
        &self,
        store: &dyn QueryStore,
        response: &S::Response,
        request: &S::Request,
        _rollback: &RollbackContext,
    ) -> EffectResult<()> {
        let key = self.target_key(request)?;

        if let Some(ref update) = self.update {
            let existing = decode::<M>(store.get_data(&key))?;
            let updated = update(existing, response);
            store.set_data(&key, Some(serde_json::to_value(&updated)?));
        }

        // Update strictly before invalidate: a refetch requested below must
        // not be clobbered by a stale update afterwards.
        match self.invalidate {
            InvalidatePolicy::None => {}
            InvalidatePolicy::Remove => store.remove_entry(&key),
            InvalidatePolicy::Active => store.invalidate(&key, InvalidateScope::Active).await,
            InvalidatePolicy::Inactive => store.invalidate(&key, InvalidateScope::Inactive).await,
            InvalidatePolicy::All => store.invalidate(&key, InvalidateScope::All).await,
        }

        Ok(())
    }

    async fn after_error(
        &self,
        store: &dyn QueryStore,
        _error: &CallError,
        request: &S::Request,
        rollback: &RollbackContext,
    ) -> EffectResult<()> {
        let key = self.target_key(request)?;

        tracing::debug!(key = %key, "restoring pre-mutation snapshot");
        store.set_data(&key, rollback.restored(&key));

        Ok(())
    }
}

impl<S, M> Clone for SideEffect<S, M>
where
    S: MutationMethod,
    M: QueryMethod,
{
    fn clone(&self) -> Self {
        Self {
            map_request: self.map_request.clone(),
            patch: self.patch.clone(),
            update: self.update.clone(),
            invalidate: self.invalidate,
        }
    }
}

impl<S, M> fmt::Debug for SideEffect<S, M>
where
    S: MutationMethod,
    M: QueryMethod,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SideEffect")
            .field("source", &S::LABEL)
            .field("target", &M::LABEL)
            .field("patch", &self.patch.is_some())
            .field("update", &self.update.is_some())
            .field("invalidate", &self.invalidate)
            .finish()
    }
}
