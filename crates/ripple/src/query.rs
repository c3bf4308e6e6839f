//! The query executor.

use std::fmt;

use crate::context::RequestContext;
use crate::error::{DispatchResult, EffectError, EffectResult};
use crate::key::{query_key, CacheKey};
use crate::methods::QueryMethod;
use crate::stores::QueryStore;

/// Executes a query method through the cache.
///
/// [`run`](Query::run) serves a cached response when the store holds one
/// and otherwise calls the method with merged transport options, writing
/// the response through before returning it. The cache key is derived from
/// the method label and request unless a caller-supplied key overrides it.
pub struct Query<Q>
where
    Q: QueryMethod,
{
    method: Q,
    key: Option<CacheKey>,
}

impl<Q> Query<Q>
where
    Q: QueryMethod,
{
    /// Wraps `method` with derived cache keys.
    pub fn new(method: Q) -> Self {
        Self { method, key: None }
    }

    /// Overrides the derived cache key.
    ///
    /// Caller-supplied keys are opaque to this crate: they address the
    /// store as-is and no derivation happens.
    pub fn with_key(mut self, key: CacheKey) -> Self {
        self.key = Some(key);
        self
    }

    /// The cache key [`run`](Query::run) will use for `request`.
    pub fn key(&self, request: &Q::Request) -> EffectResult<CacheKey> {
        match self.key {
            Some(ref key) => Ok(key.clone()),
            None => query_key::<Q>(Some(request)),
        }
    }

    /// Returns the cached response for `request`, or dispatches the method
    /// and caches what it resolves to.
    pub async fn run(
        &self,
        store: &dyn QueryStore,
        context: &RequestContext,
        request: &Q::Request,
    ) -> DispatchResult<Q::Response> {
        let key = self.key(request)?;

        if let Some(value) = store.get_data(&key) {
            tracing::debug!(key = %key, "serving cached response");
            let cached = serde_json::from_value(value).map_err(EffectError::from)?;
            return Ok(cached);
        }

        let options = context.transport_options();
        let response = self.method.call(request, &options).await?;

        let encoded = serde_json::to_value(&response).map_err(EffectError::from)?;
        store.set_data(&key, Some(encoded));

        Ok(response)
    }
}

impl<Q> fmt::Debug for Query<Q>
where
    Q: QueryMethod,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Query")
            .field("method", &Q::LABEL)
            .field("key", &self.key)
            .finish()
    }
}
