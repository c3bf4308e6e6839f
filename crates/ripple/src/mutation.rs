//! The mutation executor.

use std::fmt;
use std::rc::Rc;

use crate::context::RequestContext;
use crate::effects::{EffectChain, MutationEffect};
use crate::error::{CallError, DispatchResult, ServiceError};
use crate::methods::{MutationMethod, ServiceMethod};
use crate::stores::QueryStore;

type Recover<S> = Rc<dyn Fn(&ServiceError) -> Option<<S as ServiceMethod>::Response>>;

/// Executes a mutation method together with its declared side effects.
///
/// One [`run`](Mutation::run) drives the full lifecycle: the effect chain's
/// before-mutation phase, the method call with merged transport options,
/// the optional one-shot error recovery, and finally either the
/// after-success or the after-error phase. Exactly one of the two terminal
/// phases fires per attempt; there are no retries.
pub struct Mutation<S>
where
    S: MutationMethod,
{
    method: S,
    effects: EffectChain<S>,
    recover: Option<Recover<S>>,
}

impl<S> Mutation<S>
where
    S: MutationMethod,
{
    /// Wraps `method` with no side effects.
    pub fn new(method: S) -> Self {
        Self {
            method,
            effects: EffectChain::new(),
            recover: None,
        }
    }

    /// Appends a side effect; effects run in the order they are added.
    pub fn with_effect<E>(mut self, effect: E) -> Self
    where
        E: 'static + MutationEffect<S>,
    {
        self.effects = self.effects.with(effect);
        self
    }

    /// Replaces the effect chain wholesale.
    pub fn with_effects(mut self, effects: EffectChain<S>) -> Self {
        self.effects = effects;
        self
    }

    /// Sets a recovery function consulted when the service returns a
    /// structured error.
    ///
    /// Returning `Some` substitutes a fallback response and the mutation
    /// completes as a success, side effects included. The substitution
    /// happens exactly once, at the point the response first resolves, and
    /// never inside the side-effect lifecycle. Generic transport failures
    /// are never recovered.
    pub fn recover_with<F>(mut self, recover: F) -> Self
    where
        F: 'static + Fn(&ServiceError) -> Option<S::Response>,
    {
        self.recover = Some(Rc::new(recover));
        self
    }

    /// Runs the mutation against `store`, configured by `context`.
    pub async fn run(
        &self,
        store: &dyn QueryStore,
        context: &RequestContext,
        request: &S::Request,
    ) -> DispatchResult<S::Response> {
        let rollback = self.effects.before_mutation(store, request).await?;

        let options = context.transport_options();
        let outcome = match self.method.call(request, &options).await {
            Err(CallError::Service(service)) => {
                match self.recover.as_ref().and_then(|recover| recover(&service)) {
                    Some(fallback) => {
                        tracing::debug!(
                            method = S::LABEL,
                            code = service.code,
                            "substituted fallback response for service error"
                        );
                        Ok(fallback)
                    }
                    None => Err(CallError::Service(service)),
                }
            }
            outcome => outcome,
        };

        match outcome {
            Ok(response) => {
                self.effects
                    .after_success(store, &response, request, &rollback)
                    .await?;
                Ok(response)
            }
            Err(error) => {
                if let Err(effect_error) = self
                    .effects
                    .after_error(store, &error, request, &rollback)
                    .await
                {
                    tracing::warn!(
                        method = S::LABEL,
                        "mutation failed and rollback also failed: {error}"
                    );
                    return Err(effect_error.into());
                }
                Err(error.into())
            }
        }
    }
}

impl<S> fmt::Debug for Mutation<S>
where
    S: MutationMethod,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mutation")
            .field("method", &S::LABEL)
            .field("effects", &self.effects.len())
            .field("recover", &self.recover.is_some())
            .finish()
    }
}
