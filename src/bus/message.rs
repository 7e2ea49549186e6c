//! Messages carried by the diagnostic bus.

use crate::caps::Caps;
use crate::config::DecoderEngine;
use crate::error::{Error, ErrorCode, ErrorDomain};
use crate::pipeline::PipelineState;
use std::fmt;
use std::ops::BitOr;

/// Structure name of every missing-capability diagnostic.
pub const MISSING_PLUGIN: &str = "missing-plugin";

/// Which kind of component was missing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MissingPluginType {
    /// No source handler for a locator scheme.
    UriSource,
    /// No decoder for a stream format.
    Decoder,
}

impl MissingPluginType {
    /// Wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            MissingPluginType::UriSource => "urisource",
            MissingPluginType::Decoder => "decoder",
        }
    }
}

/// What exactly was missing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiagnosticDetail {
    /// A locator scheme.
    Scheme(String),
    /// A stream format.
    Caps(Caps),
}

impl DiagnosticDetail {
    /// The scheme, if this is a scheme detail.
    pub fn as_scheme(&self) -> Option<&str> {
        match self {
            DiagnosticDetail::Scheme(s) => Some(s),
            DiagnosticDetail::Caps(_) => None,
        }
    }

    /// The caps, if this is a caps detail.
    pub fn as_caps(&self) -> Option<&Caps> {
        match self {
            DiagnosticDetail::Caps(c) => Some(c),
            DiagnosticDetail::Scheme(_) => None,
        }
    }
}

impl fmt::Display for DiagnosticDetail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosticDetail::Scheme(s) => f.write_str(s),
            DiagnosticDetail::Caps(c) => write!(f, "{}", c),
        }
    }
}

/// Non-terminal notification about a missing capability.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementDiagnostic {
    /// Element that posted the diagnostic.
    pub source: String,
    /// Kind of missing component.
    pub plugin_type: MissingPluginType,
    /// The missing scheme or format.
    pub detail: DiagnosticDetail,
}

impl ElementDiagnostic {
    /// Missing source handler for `scheme`.
    pub fn missing_uri_source(source: impl Into<String>, scheme: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            plugin_type: MissingPluginType::UriSource,
            detail: DiagnosticDetail::Scheme(scheme.into()),
        }
    }

    /// Missing decoder for `caps`.
    pub fn missing_decoder(source: impl Into<String>, caps: Caps) -> Self {
        Self {
            source: source.into(),
            plugin_type: MissingPluginType::Decoder,
            detail: DiagnosticDetail::Caps(caps),
        }
    }

    /// Structure name, always `missing-plugin`.
    pub fn name(&self) -> &'static str {
        MISSING_PLUGIN
    }
}

impl fmt::Display for ElementDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {{ type: {}, detail: {} }}",
            self.name(),
            self.plugin_type.as_str(),
            self.detail
        )
    }
}

/// Terminal error report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorReport {
    /// Element that posted the report.
    pub source: String,
    /// Error domain.
    pub domain: ErrorDomain,
    /// Error code within the domain.
    pub code: ErrorCode,
    /// Human readable message.
    pub message: String,
}

impl ErrorReport {
    /// Create a report.
    pub fn new(
        source: impl Into<String>,
        domain: ErrorDomain,
        code: ErrorCode,
        message: impl Into<String>,
    ) -> Self {
        Self {
            source: source.into(),
            domain,
            code,
            message: message.into(),
        }
    }

    /// Build the terminal report for `error`.
    pub fn from_error(source: impl Into<String>, error: &Error, engine: DecoderEngine) -> Self {
        let (domain, code) = error.classify(engine);
        Self::new(source, domain, code, error.to_string())
    }
}

impl fmt::Display for ErrorReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "error {}/{} from {}: {}",
            self.domain, self.code, self.source, self.message
        )
    }
}

/// A message on the bus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BusMessage {
    /// Missing-capability diagnostic.
    Element(ElementDiagnostic),
    /// Terminal error.
    Error(ErrorReport),
    /// The pipeline changed state.
    StateChanged {
        /// Element whose state changed.
        source: String,
        /// Previous state.
        old: PipelineState,
        /// New state.
        new: PipelineState,
        /// State still pending, if any.
        pending: Option<PipelineState>,
    },
    /// An asynchronous transition finished successfully.
    AsyncDone {
        /// Element that finished.
        source: String,
    },
}

impl BusMessage {
    /// The mask bit of this message.
    pub fn message_type(&self) -> MessageMask {
        match self {
            BusMessage::Element(_) => MessageMask::ELEMENT,
            BusMessage::Error(_) => MessageMask::ERROR,
            BusMessage::StateChanged { .. } => MessageMask::STATE_CHANGED,
            BusMessage::AsyncDone { .. } => MessageMask::ASYNC_DONE,
        }
    }

    /// The diagnostic payload, if any.
    pub fn as_diagnostic(&self) -> Option<&ElementDiagnostic> {
        match self {
            BusMessage::Element(d) => Some(d),
            _ => None,
        }
    }

    /// The error payload, if any.
    pub fn as_error(&self) -> Option<&ErrorReport> {
        match self {
            BusMessage::Error(e) => Some(e),
            _ => None,
        }
    }
}

impl fmt::Display for BusMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BusMessage::Element(d) => write!(f, "{}", d),
            BusMessage::Error(e) => write!(f, "{}", e),
            BusMessage::StateChanged {
                source, old, new, ..
            } => write!(f, "{}: state changed {} -> {}", source, old, new),
            BusMessage::AsyncDone { source } => write!(f, "{}: async done", source),
        }
    }
}

/// Set of message types a consumer is interested in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MessageMask(u8);

impl MessageMask {
    /// Missing-capability diagnostics.
    pub const ELEMENT: Self = Self(1 << 0);
    /// Error reports.
    pub const ERROR: Self = Self(1 << 1);
    /// State changes.
    pub const STATE_CHANGED: Self = Self(1 << 2);
    /// Async completion.
    pub const ASYNC_DONE: Self = Self(1 << 3);
    /// Every message.
    pub const ANY: Self = Self(0b1111);

    /// Union of two masks, usable in constants.
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// Whether all bits of `other` are in this mask.
    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Whether `message` passes this mask.
    pub fn matches(self, message: &BusMessage) -> bool {
        self.contains(message.message_type())
    }
}

impl BitOr for MessageMask {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        self.union(rhs)
    }
}
