//! Error types for sequence construction and traversal.
//!
//! Errors fall into four families, matching the point at which they are raised:
//!
//! - [`Error::Configuration`] -- an operation was built with invalid parameters.
//!   Returned by the chain method itself, before anything is pulled.
//! - [`Error::Resource`] -- a resource-backed source could not be opened or read.
//!   Raised on the first pull, never at construction.
//! - [`Error::Bounds`] -- a pull asked for something the sequence cannot give
//!   (a zero limit, more random samples than elements).
//! - [`Error::Callback`] -- a user callback failed. The original
//!   [`anyhow::Error`] is carried unchanged so callers can downcast it.
//!
//! [`Error::Type`] is raised by `strict()` when a value does not match the
//! type of the values seen before it.

use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Canonical error enumeration.
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid parameter given when configuring an operation.
    #[error("invalid configuration for '{operation}': {message}")]
    Configuration {
        operation: &'static str,
        message: String,
    },

    /// A resource (file, stream) could not be opened or read.
    #[error("resource error: {message}")]
    Resource {
        message: String,
        #[source]
        source: Option<std::io::Error>,
    },

    /// A pull violated the bounds of the sequence.
    #[error("out of bounds in '{operation}': {message}")]
    Bounds {
        operation: &'static str,
        message: String,
    },

    /// A value did not match the type enforced by `strict()`.
    #[error("type error: expected '{expected}', found '{found}'")]
    Type { expected: String, found: String },

    /// A user-supplied callback failed; the error is propagated unchanged.
    #[error(transparent)]
    Callback(anyhow::Error),
}

impl Error {
    pub(crate) fn configuration(operation: &'static str, message: impl Into<String>) -> Self {
        Self::Configuration {
            operation,
            message: message.into(),
        }
    }

    pub(crate) fn bounds(operation: &'static str, message: impl Into<String>) -> Self {
        Self::Bounds {
            operation,
            message: message.into(),
        }
    }

    pub(crate) fn resource(message: impl Into<String>, source: Option<std::io::Error>) -> Self {
        Self::Resource {
            message: message.into(),
            source,
        }
    }

    /// `true` for errors raised while configuring an operation.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration { .. })
    }

    /// `true` for errors that came out of a user callback.
    pub fn is_callback(&self) -> bool {
        matches!(self, Self::Callback(_))
    }

    /// Access the original callback error, if this is one.
    pub fn callback_error(&self) -> Option<&anyhow::Error> {
        match self {
            Self::Callback(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Self::resource(e.to_string(), Some(e))
    }
}
