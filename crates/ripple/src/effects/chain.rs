use std::fmt;
use std::rc::Rc;

use async_trait::async_trait;

use super::{MutationEffect, RollbackContext};
use crate::error::{CallError, EffectResult};
use crate::methods::MutationMethod;
use crate::stores::QueryStore;

/// An ordered collection of side effects driven as one.
///
/// Effects run strictly sequentially in registration order through every
/// lifecycle phase, which keeps cache-write ordering deterministic when two
/// effects target the same key. A chain is itself a [`MutationEffect`], so
/// chains compose.
///
/// Error policy per phase: `before_mutation` and `after_success` fail fast
/// on the first effect error (effects already run keep their cache
/// writes); `after_error` lets every effect attempt its rollback and then
/// reports the first failure.
pub struct EffectChain<S>
where
    S: MutationMethod,
{
    effects: Vec<Rc<dyn MutationEffect<S>>>,
}

impl<S> EffectChain<S>
where
    S: MutationMethod,
{
    /// An empty chain; every phase is an immediate no-op.
    pub fn new() -> Self {
        Self {
            effects: Vec::new(),
        }
    }

    /// Appends `effect` to the end of the chain.
    pub fn with<E>(mut self, effect: E) -> Self
    where
        E: 'static + MutationEffect<S>,
    {
        self.effects.push(Rc::new(effect));
        self
    }

    /// Number of registered effects.
    pub fn len(&self) -> usize {
        self.effects.len()
    }

    /// Whether the chain holds no effects.
    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }
}

impl<S> Default for EffectChain<S>
where
    S: MutationMethod,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<S> Clone for EffectChain<S>
where
    S: MutationMethod,
{
    fn clone(&self) -> Self {
        Self {
            effects: self.effects.clone(),
        }
    }
}

impl<S> fmt::Debug for EffectChain<S>
where
    S: MutationMethod,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EffectChain")
            .field("effects", &self.effects.len())
            .finish()
    }
}

#[async_trait(?Send)]
impl<S> MutationEffect<S> for EffectChain<S>
where
    S: MutationMethod,
{
    async fn before_mutation(
        &self,
        store: &dyn QueryStore,
        request: &S::Request,
    ) -> EffectResult<RollbackContext> {
        let mut rollback = RollbackContext::new();

        for effect in &self.effects {
            let fragment = effect.before_mutation(store, request).await?;
            rollback = rollback.merged(fragment);
        }

        Ok(rollback)
    }

    async fn after_success(
        &self,
        store: &dyn QueryStore,
        response: &S::Response,
        request: &S::Request,
        rollback: &RollbackContext,
    ) -> EffectResult<()> {
        for effect in &self.effects {
            effect
                .after_success(store, response, request, rollback)
                .await?;
        }

        Ok(())
    }

    async fn after_error(
        &self,
        store: &dyn QueryStore,
        error: &CallError,
        request: &S::Request,
        rollback: &RollbackContext,
    ) -> EffectResult<()> {
        // Every effect attempts its rollback; the first failure is reported
        // once all have run.
        let mut first_error = None;

        for effect in &self.effects {
            if let Err(e) = effect.after_error(store, error, request, rollback).await {
                tracing::error!(method = S::LABEL, "rollback failed for an effect: {e}");
                first_error.get_or_insert(e);
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}
