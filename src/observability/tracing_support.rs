//! Span helpers for structured logging.

use crate::pipeline::PipelineState;
use tracing::{Level, Span, span};

/// Configuration for tracing behavior.
#[derive(Debug, Clone)]
pub struct TracingConfig {
    /// Whether to create spans around state change requests.
    pub playbin_spans: bool,
    /// Whether to create spans around branch assembly on the preroll worker.
    pub branch_spans: bool,
    /// Default span level.
    pub level: Level,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            playbin_spans: true,
            branch_spans: false,
            level: Level::INFO,
        }
    }
}

impl TracingConfig {
    /// All spans at debug level.
    pub fn all() -> Self {
        Self {
            playbin_spans: true,
            branch_spans: true,
            level: Level::DEBUG,
        }
    }

    /// Disable all spans.
    pub fn none() -> Self {
        Self {
            playbin_spans: false,
            branch_spans: false,
            level: Level::INFO,
        }
    }

    /// Span for a state change request, or a disabled span.
    pub fn playbin_span(&self, name: &str) -> Span {
        if self.playbin_spans {
            span_playbin(name)
        } else {
            Span::none()
        }
    }

    /// Span for a branch, or a disabled span.
    pub fn branch_span(&self, playbin: &str, kind: &str, origin: &str) -> Span {
        if self.branch_spans {
            span_branch(playbin, kind, origin)
        } else {
            Span::none()
        }
    }
}

/// Create a span for playbin state handling.
///
/// # Example
///
/// ```rust,ignore
/// let span = span_playbin("playbin0");
/// let _guard = span.enter();
/// ```
#[inline]
pub fn span_playbin(name: &str) -> Span {
    span!(Level::INFO, "playbin", name = %name)
}

/// Create a span for one branch being assembled.
#[inline]
pub fn span_branch(playbin: &str, kind: &str, origin: &str) -> Span {
    span!(
        Level::DEBUG,
        "branch",
        playbin = %playbin,
        kind = %kind,
        origin = %origin
    )
}

/// Log a completed single-step state change.
#[inline]
pub fn trace_state_change(playbin: &str, from: PipelineState, to: PipelineState) {
    tracing::info!(
        playbin = %playbin,
        from = %from,
        to = %to,
        "state changed"
    );
}
