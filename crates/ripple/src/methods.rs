//! Capability contracts for generated service methods.
//!
//! A service method is anything callable with a request and transport
//! options that resolves to a response: typically a generated client
//! function wrapped in a unit struct. The method's identity is an explicit
//! [`ServiceMethod::LABEL`] supplied at implementation time; nothing here
//! relies on runtime introspection of the callable.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::context::TransportOptions;
use crate::error::CallResult;

/// A callable service method with a stable identity.
#[async_trait(?Send)]
pub trait ServiceMethod {
    /// The request message type.
    type Request: 'static + Serialize + Clone;

    /// The response message type.
    type Response: 'static + Serialize + DeserializeOwned + Clone;

    /// Stable identifier for the method.
    ///
    /// Used as the first element of every derived cache key, so it must not
    /// change across builds. Labels are assumed unique within one client;
    /// two distinct methods sharing a label share cache entries.
    const LABEL: &'static str;

    /// Calls the method over the underlying transport.
    async fn call(
        &self,
        request: &Self::Request,
        options: &TransportOptions,
    ) -> CallResult<Self::Response>;
}

/// Marker for methods that read data and whose responses may be cached.
pub trait QueryMethod: ServiceMethod {}

/// Marker for methods that write data and trigger side effects.
pub trait MutationMethod: ServiceMethod {}
