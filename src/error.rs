//! Error types for the playback coordinator.

use crate::caps::Caps;
use crate::config::DecoderEngine;
use std::fmt;
use thiserror::Error;

/// Result type alias using the crate's [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for resolution and state-change operations.
#[derive(Error, Debug)]
pub enum Error {
    /// No source handler exists for the main locator.
    #[error("no source handler for '{locator}' (scheme '{scheme}')")]
    UnresolvedSource {
        /// The locator that could not be resolved.
        locator: String,
        /// The scheme that had no handler.
        scheme: String,
    },

    /// The secondary locator could not be resolved. Always recovered.
    #[error("secondary locator '{locator}' dropped: {reason}")]
    UnresolvedSubSource {
        /// The secondary locator.
        locator: String,
        /// Why it was dropped.
        reason: String,
    },

    /// No decoder could be found for a stream of the main resource.
    #[error("no decoder for stream '{0}'")]
    UnresolvedDecoder(Caps),

    /// The locator has no scheme separator or is otherwise unparsable.
    #[error("malformed locator '{locator}': {reason}")]
    MalformedLocator {
        /// The raw locator text.
        locator: String,
        /// Parser diagnostic.
        reason: String,
    },

    /// A scheme was registered twice in strict mode.
    #[error("scheme '{0}' is already registered")]
    DuplicateScheme(String),

    /// No registry entry matches the scheme.
    #[error("unknown scheme '{0}'")]
    UnknownScheme(String),

    /// No registered decoder declares support for the caps.
    #[error("no registered decoder accepts '{0}'")]
    NoCapabilityMatch(Caps),

    /// The resource behind a locator is not reachable.
    #[error("resource not found: {0}")]
    ResourceNotFound(String),

    /// The stream type of a resource could not be determined.
    #[error("could not determine stream type of '{0}'")]
    TypeNotFound(String),

    /// An element refused a state change.
    #[error("state change failed for '{element}': {reason}")]
    StateChange {
        /// The element that failed.
        element: String,
        /// Failure description.
        reason: String,
    },

    /// Configuration rejected at construction time.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a state change error.
    pub fn state_change(element: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::StateChange {
            element: element.into(),
            reason: reason.into(),
        }
    }

    /// Map this error to the domain and code of the terminal report.
    ///
    /// Decoder gaps depend on the configured [`DecoderEngine`]; every other
    /// mapping is fixed.
    pub fn classify(&self, engine: DecoderEngine) -> (ErrorDomain, ErrorCode) {
        match self {
            Error::UnresolvedSource { .. }
            | Error::UnresolvedSubSource { .. }
            | Error::UnknownScheme(_) => (ErrorDomain::Core, ErrorCode::MissingPlugin),
            Error::UnresolvedDecoder(_) | Error::NoCapabilityMatch(_) => engine.codec_gap(),
            Error::MalformedLocator { .. } | Error::ResourceNotFound(_) => {
                (ErrorDomain::Resource, ErrorCode::NotFound)
            }
            Error::TypeNotFound(_) => (ErrorDomain::Stream, ErrorCode::TypeNotFound),
            Error::StateChange { .. } => (ErrorDomain::Core, ErrorCode::StateChange),
            Error::DuplicateScheme(_) | Error::InvalidConfig(_) | Error::Io(_) => {
                (ErrorDomain::Core, ErrorCode::Failed)
            }
        }
    }
}

/// Error domain of a terminal report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorDomain {
    /// Core pipeline errors (missing plugins, state changes).
    Core,
    /// Stream errors (codecs, type detection).
    Stream,
    /// Resource errors (unreachable locations).
    Resource,
}

impl ErrorDomain {
    /// Wire name of the domain.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorDomain::Core => "core",
            ErrorDomain::Stream => "stream",
            ErrorDomain::Resource => "resource",
        }
    }
}

impl fmt::Display for ErrorDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error code of a terminal report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// A required plugin is not installed.
    MissingPlugin,
    /// No codec for the stream format.
    CodecNotFound,
    /// The resource does not exist.
    NotFound,
    /// The stream type could not be detected.
    TypeNotFound,
    /// An element failed to change state.
    StateChange,
    /// Generic failure.
    Failed,
}

impl ErrorCode {
    /// Wire name of the code.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::MissingPlugin => "MissingPlugin",
            ErrorCode::CodecNotFound => "CodecNotFound",
            ErrorCode::NotFound => "NotFound",
            ErrorCode::TypeNotFound => "TypeNotFound",
            ErrorCode::StateChange => "StateChange",
            ErrorCode::Failed => "Failed",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
