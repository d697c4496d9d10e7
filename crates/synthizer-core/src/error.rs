//! Error taxonomy exposed across the engine's public API.

use thiserror::Error;

/// Errors returned by fallible public engine operations. This is the only
/// error type that crosses the engine's public surface.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SynthizerError {
    /// A [`crate::Handle`] does not refer to a live object.
    #[error("invalid handle")]
    InvalidHandle,
    /// A property name is not defined for the target object's kind.
    #[error("unknown property: {0}")]
    UnknownProperty(&'static str),
    /// A property was set with a value of the wrong [`crate::property::PropertyKind`].
    #[error("property type mismatch for {name}: expected {expected:?}, got {got:?}")]
    PropertyTypeMismatch {
        /// Name of the offending property.
        name: &'static str,
        /// Kind the property's schema entry declares.
        expected: crate::property::PropertyKind,
        /// Kind of the value that was actually supplied.
        got: crate::property::PropertyKind,
    },
    /// A property value failed its schema validator (e.g. out-of-range gain).
    #[error("invalid value for property {0}")]
    InvalidPropertyValue(&'static str),
    /// A bounded resource (handle table, voice pool, queue) is full.
    #[error("resource exhausted: {0}")]
    ResourceExhausted(&'static str),
    /// A decoder failed to produce audio.
    #[error("decode error: {0}")]
    DecodeError(String),
    /// The requested operation is not implemented by this build.
    #[error("not supported: {0}")]
    NotSupported(&'static str),
    /// An invariant the engine itself is responsible for was violated.
    ///
    /// In debug builds this is unreachable and indicates a bug; in release
    /// builds callers should treat it as fatal to the affected object only.
    #[error("internal error: {0}")]
    InternalError(&'static str),
}

impl SynthizerError {
    /// Shorthand for an [`SynthizerError::InternalError`], asserting in debug
    /// builds since these should never be reachable in correct usage.
    #[track_caller]
    pub fn internal(message: &'static str) -> Self {
        debug_assert!(false, "internal error: {message}");
        SynthizerError::InternalError(message)
    }
}
