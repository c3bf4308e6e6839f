//! Shared request configuration.

use http::header::CONTENT_TYPE;
use http::{HeaderMap, HeaderValue};
use typed_builder::TypedBuilder;

/// Credentials mode forwarded to the transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Credentials {
    /// Never send credentials.
    Omit,
    /// Send credentials on same-origin requests only.
    #[default]
    SameOrigin,
    /// Always send credentials.
    Include,
}

/// Provider-scoped configuration applied to every dispatched request.
///
/// A context is a plain value: clone it freely, construct it once per
/// provider scope. The core only ever reads it.
///
/// ```
/// use ripple::RequestContext;
///
/// let context = RequestContext::builder().base_path("/api/v2").build();
/// assert_eq!(context.transport_options().base_path(), Some("/api/v2"));
/// ```
#[derive(TypedBuilder, Debug, Clone, PartialEq, Default)]
pub struct RequestContext {
    /// Prefix prepended to every request path.
    #[builder(setter(into, strip_option), default)]
    base_path: Option<String>,
    /// Headers applied to every request.
    ///
    /// These take precedence over the built-in defaults for keys they set.
    #[builder(default)]
    headers: HeaderMap,
    /// Credentials mode, for transports that distinguish one.
    #[builder(default)]
    credentials: Credentials,
}

impl RequestContext {
    /// Merged options for one dispatch.
    ///
    /// A `content-type: application/json` default is merged first; context
    /// headers override it and any other default on key conflict, but a
    /// default is never dropped unless explicitly overridden.
    pub fn transport_options(&self) -> TransportOptions {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.extend(self.headers.clone());

        TransportOptions {
            base_path: self.base_path.clone(),
            headers,
            credentials: self.credentials,
        }
    }
}

/// Options handed to a service method for one dispatch.
///
/// Produced by [`RequestContext::transport_options`]; the transport behind
/// the method is expected to honour all three fields.
#[derive(Debug, Clone, PartialEq)]
pub struct TransportOptions {
    base_path: Option<String>,
    headers: HeaderMap,
    credentials: Credentials,
}

impl TransportOptions {
    /// Path prefix for the request, if one is configured.
    pub fn base_path(&self) -> Option<&str> {
        self.base_path.as_deref()
    }

    /// Fully merged request headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Credentials mode for the request.
    pub fn credentials(&self) -> Credentials {
        self.credentials
    }
}
