//! Component interfaces for playback pipelines.
//!
//! The coordinator never inspects component types at runtime. Every
//! component is reached through one of three traits:
//!
//! - [`UriSource`]: created by scheme through the
//!   [`UriHandlerRegistry`](crate::plugin::UriHandlerRegistry)
//! - [`Decoder`]: created by stream format through the
//!   [`CapabilityResolver`](crate::plugin::CapabilityResolver)
//! - [`MediaSink`]: supplied by the application in the
//!   [`PlaybinConfig`](crate::config::PlaybinConfig)
//!
//! Sources and decoders are owned by one run of the pipeline; sinks are
//! shared (`Arc`) so the application can inspect them afterwards.

mod traits;

pub use traits::{Decoder, DecoderFactory, MediaSink, SourceFactory, UriSource};
