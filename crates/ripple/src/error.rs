//! Error types crossing the dispatch boundary.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// A structured error returned by the service itself.
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[error("{message} (code {code})")]
pub struct ServiceError {
    /// Symbolic name of the error code, when the service provides one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code_name: Option<String>,
    /// Numeric service error code.
    pub code: u32,
    /// Human-readable message.
    pub message: String,
    /// Structured detail payloads attached to the error.
    #[serde(default)]
    pub details: Vec<Value>,
}

/// Normalised error produced by a method call.
///
/// Either a generic transport failure, propagated unchanged, or a
/// structured [`ServiceError`]. Use [`CallError::is_service`] /
/// [`CallError::as_service`] to tell the two forms apart.
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CallError {
    /// The transport failed before a structured response was produced.
    #[error("failed to communicate with server: {0}")]
    Transport(String),
    /// The service answered with a structured error.
    #[error(transparent)]
    Service(ServiceError),
}

impl CallError {
    /// Whether this error carries a structured service payload.
    pub fn is_service(&self) -> bool {
        matches!(self, Self::Service(_))
    }

    /// The structured service error, if this is one.
    pub fn as_service(&self) -> Option<&ServiceError> {
        match self {
            Self::Service(e) => Some(e),
            Self::Transport(_) => None,
        }
    }
}

impl From<ServiceError> for CallError {
    fn from(error: ServiceError) -> Self {
        Self::Service(error)
    }
}

/// Failure while applying a side effect to the cache.
///
/// Not swallowed anywhere: a failing patch or update surfaces to the caller
/// of the lifecycle phase that ran it.
#[derive(Error, Debug)]
pub enum EffectError {
    /// A cached value or key request could not be encoded / decoded.
    #[error("failed to encode / decode cached value")]
    Encoding(#[from] serde_json::Error),
}

/// Error produced by running a query or mutation end to end.
#[derive(Error, Debug)]
pub enum DispatchError {
    /// The method call itself failed.
    #[error(transparent)]
    Call(#[from] CallError),
    /// A side-effect lifecycle phase or the cache codec failed.
    #[error(transparent)]
    Effect(#[from] EffectError),
}

impl DispatchError {
    /// The underlying call error, if the method call failed.
    pub fn as_call(&self) -> Option<&CallError> {
        match self {
            Self::Call(e) => Some(e),
            Self::Effect(_) => None,
        }
    }
}

/// Result of a method call.
pub type CallResult<T> = Result<T, CallError>;

/// Result of a side-effect lifecycle phase.
pub type EffectResult<T> = Result<T, EffectError>;

/// Result of an executed query or mutation.
pub type DispatchResult<T> = Result<T, DispatchError>;
