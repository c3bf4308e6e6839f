//! Adaptation layer between generated service clients and a cached query
//! store.
//!
//! This crate lets application code drive generated RPC-style
//! request/response methods as queries and mutations. It takes care of:
//!
//! - deriving stable cache keys from a method's identity and its request
//!   value ([`derive_key`] / [`query_key`]),
//! - centralising transport configuration through a shared
//!   [`RequestContext`],
//! - propagating the side effects of a mutation onto the cached results of
//!   related queries ([`effects::SideEffect`]): an optimistic patch applied
//!   before the request is dispatched, a post-success update, an
//!   invalidation policy, and rollback of the optimistic patch when the
//!   mutation fails.
//!
//! Several side effects compose into an [`effects::EffectChain`] that runs
//! through every lifecycle phase in registration order.
//!
//! The cache itself is an external collaborator behind the
//! [`stores::QueryStore`] trait; a reference in-memory implementation is
//! available as [`stores::MemStore`]. The transport is equally external:
//! generated client methods implement [`methods::ServiceMethod`] and
//! receive merged [`TransportOptions`] on every call.
//!
//! ```ignore
//! let effect = SideEffect::<SaveTodo, TodoQuery>::new()
//!     .patch(|current, request| merge(current, request))
//!     .update(|_current, response| response.clone())
//!     .invalidate(InvalidatePolicy::Active);
//!
//! let saved = Mutation::new(SaveTodo)
//!     .with_effect(effect)
//!     .run(&store, &context, &request)
//!     .await?;
//! ```

#![deny(clippy::all)]
#![deny(missing_debug_implementations)]
#![deny(unsafe_code)]
#![deny(non_snake_case)]
#![deny(clippy::cognitive_complexity)]
#![deny(missing_docs)]

mod context;
pub mod effects;
mod error;
mod key;
pub mod methods;
mod mutation;
mod query;
pub mod stores;

pub use context::{Credentials, RequestContext, TransportOptions};
pub use error::{
    CallError, CallResult, DispatchError, DispatchResult, EffectError, EffectResult, ServiceError,
};
pub use key::{derive_key, query_key, CacheKey};
pub use mutation::Mutation;
pub use query::Query;
