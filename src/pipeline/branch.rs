//! One decoded stream within a run.

use crate::caps::{Caps, StreamDescriptor, StreamKind};
use crate::element::{Decoder, MediaSink};
use std::fmt;
use std::sync::Arc;

/// Which locator a branch came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BranchOrigin {
    /// The main locator.
    Main,
    /// The secondary locator.
    Sub,
}

impl BranchOrigin {
    /// Lower-case name.
    pub fn as_str(&self) -> &'static str {
        match self {
            BranchOrigin::Main => "main",
            BranchOrigin::Sub => "sub",
        }
    }
}

impl fmt::Display for BranchOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A per-stream path from source to sink.
///
/// A branch is `resolved` once its stream has a decoder. Unresolved
/// branches only exist to hold a configured sink that no stream matched;
/// such a sink is never activated.
pub struct Branch {
    /// Stream kind served by this branch.
    pub kind: StreamKind,
    /// Locator the stream came from.
    pub origin: BranchOrigin,
    /// The stream, if one matched.
    pub stream: Option<StreamDescriptor>,
    /// Decoded output format.
    pub output: Option<Caps>,
    /// Sink this branch feeds, if any.
    pub bound_sink: Option<Arc<dyn MediaSink>>,
    /// Whether a stream and decoder were found.
    pub resolved: bool,
    pub(crate) decoder: Option<Box<dyn Decoder>>,
    pub(crate) active: bool,
}

impl Branch {
    /// A branch with a decoded stream.
    pub fn resolved(
        origin: BranchOrigin,
        stream: StreamDescriptor,
        decoder: Box<dyn Decoder>,
        output: Caps,
    ) -> Self {
        Self {
            kind: stream.kind,
            origin,
            stream: Some(stream),
            output: Some(output),
            bound_sink: None,
            resolved: true,
            decoder: Some(decoder),
            active: false,
        }
    }

    /// A branch holding a sink no stream matched.
    pub fn unresolved(kind: StreamKind, sink: Arc<dyn MediaSink>) -> Self {
        Self {
            kind,
            origin: BranchOrigin::Main,
            stream: None,
            output: None,
            bound_sink: Some(sink),
            resolved: false,
            decoder: None,
            active: false,
        }
    }

    /// Whether the bound sink has been moved out of Null by this branch.
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Name of the decoder, if any.
    pub fn decoder_name(&self) -> Option<&str> {
        self.decoder.as_ref().map(|d| d.name())
    }
}

impl fmt::Debug for Branch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Branch")
            .field("kind", &self.kind)
            .field("origin", &self.origin)
            .field("stream", &self.stream)
            .field("decoder", &self.decoder_name())
            .field("sink", &self.bound_sink.as_ref().map(|s| s.name()))
            .field("resolved", &self.resolved)
            .field("active", &self.active)
            .finish()
    }
}
