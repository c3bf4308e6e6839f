//! Cache key derivation.

use std::fmt;

use serde::ser::SerializeSeq;
use serde::{Serialize, Serializer};
use serde_json::Value;

use crate::error::EffectResult;
use crate::methods::ServiceMethod;

/// Address of one cached query result.
///
/// A key is an ordered sequence: a stable method label, optionally followed
/// by a request-shaped value. It serialises as a one- or two-element JSON
/// array, and two keys are equal iff their serialised forms are equal.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheKey {
    method: String,
    request: Option<Value>,
}

impl CacheKey {
    /// The method label the key was derived from.
    pub fn method(&self) -> &str {
        &self.method
    }

    /// The request value embedded in the key, if any.
    pub fn request(&self) -> Option<&Value> {
        self.request.as_ref()
    }

    /// The canonical serialised form of the key.
    ///
    /// Stores and rollback contexts index by this form.
    pub fn canonical(&self) -> String {
        serde_json::to_string(self).expect("a JSON value always serialises")
    }
}

impl Serialize for CacheKey {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let len = 1 + usize::from(self.request.is_some());
        let mut seq = serializer.serialize_seq(Some(len))?;
        seq.serialize_element(&self.method)?;
        if let Some(ref request) = self.request {
            seq.serialize_element(request)?;
        }
        seq.end()
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical())
    }
}

/// Derives the cache key for a method label and an optional request value.
///
/// Pure and total: the same pair always derives the same key within a
/// process lifetime. Labels are assumed unique within one client; two
/// methods sharing a label share cache entries.
pub fn derive_key(method: &str, request: Option<Value>) -> CacheKey {
    CacheKey {
        method: method.to_string(),
        request,
    }
}

/// Derives the cache key for a typed service method.
///
/// The only failure mode is a request that cannot be represented as a JSON
/// value.
pub fn query_key<M>(request: Option<&M::Request>) -> EffectResult<CacheKey>
where
    M: ServiceMethod,
{
    let request = request.map(serde_json::to_value).transpose()?;
    Ok(derive_key(M::LABEL, request))
}
