//! # Parallax Playbin
//!
//! A playback-pipeline coordinator built on the parallax element model.
//!
//! A [`PlayBin`](pipeline::PlayBin) takes a main locator and an optional
//! secondary (subtitle) locator, resolves sources and decoders through
//! registries, binds application sinks to the streams it finds and walks
//! the pipeline through `Null → Ready → Paused → Playing`.
//!
//! ## Features
//!
//! - **Fatal vs. recoverable resolution**: the main locator must resolve;
//!   the secondary locator is dropped on any failure
//! - **Diagnosable gaps**: a missing source handler or decoder is announced
//!   on the bus before the terminal error report
//! - **Async preroll**: stream probing and decoder selection run on a worker
//!   thread; teardown cancels it and releases everything exactly once
//!
//! ## Quick Start
//!
//! ```rust
//! use parallax_playbin::prelude::*;
//! use std::sync::Arc;
//!
//! let video = Arc::new(FakeSink::new("video"));
//! let config = PlaybinConfig::builder()
//!     .main_locator("redvideo://")
//!     .video_sink(video.clone())
//!     .build()?;
//!
//! let playbin = PlayBin::with_defaults(config);
//! assert_eq!(playbin.request_state(PipelineState::Paused), StateChangeReturn::Async);
//! assert_eq!(playbin.await_completion(None), StateChangeReturn::Success);
//! assert_eq!(playbin.stream_info().len(), 1);
//!
//! playbin.request_state(PipelineState::Null);
//! # Ok::<(), parallax_playbin::Error>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod bus;
pub mod caps;
pub mod config;
pub mod element;
pub mod elements;
pub mod error;
pub mod locator;
pub mod observability;
pub mod pipeline;
pub mod plugin;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::bus::{BusMessage, DiagnosticBus, MessageMask};
    pub use crate::caps::{Caps, StreamDescriptor, StreamKind};
    pub use crate::config::{DecoderEngine, PlaybinConfig};
    pub use crate::element::{Decoder, MediaSink, UriSource};
    pub use crate::elements::FakeSink;
    pub use crate::error::{Error, ErrorCode, ErrorDomain, Result};
    pub use crate::pipeline::{PipelineState, PlayBin, StateChangeReturn};
    pub use crate::plugin::{CapabilityResolver, UriHandlerRegistry};
}

pub use error::{Error, Result};
