//! Component traits resolved through the registries.

use crate::caps::{Caps, StreamDescriptor};
use crate::error::Result;
use crate::locator::Locator;
use crate::pipeline::{PipelineState, StateSnapshot};
use std::fmt;
use std::sync::Arc;

// ============================================================================
// Source Trait
// ============================================================================

/// A source component created for a locator scheme.
///
/// # Lifecycle
///
/// - `set_locator()` right after creation; a source may reject a locator
///   its scheme handler was registered for (e.g. an unsupported host)
/// - `open()` synchronously during Ready→Paused; checks reachability
/// - `probe()` on the preroll worker; detects the streams the resource holds
/// - `close()` when the run is torn down
///
/// # Example
///
/// ```rust,ignore
/// #[derive(Debug)]
/// struct ToneSrc;
///
/// impl UriSource for ToneSrc {
///     fn name(&self) -> &str { "tonesrc" }
///     fn set_locator(&mut self, _locator: &Locator) -> Result<()> { Ok(()) }
///     fn open(&mut self) -> Result<()> { Ok(()) }
///     fn probe(&mut self) -> Result<Vec<StreamDescriptor>> {
///         Ok(vec![StreamDescriptor::new(StreamKind::Audio, Caps::new("audio/x-raw"))])
///     }
/// }
/// ```
pub trait UriSource: Send + fmt::Debug {
    /// Name of this source (for logging and reports).
    fn name(&self) -> &str;

    /// Configure the locator to read from.
    fn set_locator(&mut self, locator: &Locator) -> Result<()>;

    /// Open the resource.
    fn open(&mut self) -> Result<()>;

    /// Detect the streams contained in the resource.
    fn probe(&mut self) -> Result<Vec<StreamDescriptor>>;

    /// Release the resource. Must be safe to call on an unopened source.
    fn close(&mut self) {}
}

/// Constructor for source components.
pub type SourceFactory = Arc<dyn Fn() -> Box<dyn UriSource> + Send + Sync>;

// ============================================================================
// Decoder Trait
// ============================================================================

/// A decoding component created for a stream format.
pub trait Decoder: Send + fmt::Debug {
    /// Name of this decoder.
    fn name(&self) -> &str;

    /// Configure for `input` and return the decoded output format.
    fn negotiate(&mut self, input: &Caps) -> Result<Caps>;
}

/// Constructor for decoding components.
pub type DecoderFactory = Arc<dyn Fn() -> Box<dyn Decoder> + Send + Sync>;

// ============================================================================
// Sink Trait
// ============================================================================

/// An output component supplied by the application.
///
/// Sinks are shared between the application and the pipeline, so state
/// changes go through `&self`.
pub trait MediaSink: Send + Sync + fmt::Debug {
    /// Name of this sink.
    fn name(&self) -> &str;

    /// Move to `target`, walking every intermediate state.
    fn set_state(&self, target: PipelineState) -> Result<()>;

    /// Current and pending state.
    fn state(&self) -> StateSnapshot;
}
