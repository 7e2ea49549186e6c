//! Coordinator configuration.
//!
//! A [`PlaybinConfig`] is immutable once built. All settings that used to be
//! generic properties (locators, sinks, decoder engine) are explicit fields
//! checked by [`PlaybinConfigBuilder::build`].
//!
//! ```rust
//! use parallax_playbin::config::{DecoderEngine, PlaybinConfig};
//!
//! let config = PlaybinConfig::builder()
//!     .main_locator("redvideo://")
//!     .sub_locator("file:///tmp/movie.srt")
//!     .decoder_engine(DecoderEngine::V2)
//!     .build()
//!     .unwrap();
//! assert_eq!(config.request().main_locator(), "redvideo://");
//! ```

use crate::element::MediaSink;
use crate::error::{Error, ErrorCode, ErrorDomain, Result};
use crate::observability::TracingConfig;
use std::fmt;
use std::sync::Arc;

/// Selects how a missing decoder is reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DecoderEngine {
    /// Missing decoders are `stream/CodecNotFound`.
    #[default]
    V1,
    /// Missing decoders are `core/MissingPlugin`.
    V2,
}

impl DecoderEngine {
    /// Domain and code reported for a decoder gap.
    pub fn codec_gap(self) -> (ErrorDomain, ErrorCode) {
        match self {
            DecoderEngine::V1 => (ErrorDomain::Stream, ErrorCode::CodecNotFound),
            DecoderEngine::V2 => (ErrorDomain::Core, ErrorCode::MissingPlugin),
        }
    }
}

impl fmt::Display for DecoderEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecoderEngine::V1 => f.write_str("v1"),
            DecoderEngine::V2 => f.write_str("v2"),
        }
    }
}

/// The locators a run plays.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaybackRequest {
    main_locator: String,
    sub_locator: Option<String>,
}

impl PlaybackRequest {
    /// Create a request for a main locator only.
    pub fn new(main_locator: impl Into<String>) -> Self {
        Self {
            main_locator: main_locator.into(),
            sub_locator: None,
        }
    }

    /// Attach a secondary (subtitle/overlay) locator.
    pub fn with_sub_locator(mut self, sub_locator: impl Into<String>) -> Self {
        self.sub_locator = Some(sub_locator.into());
        self
    }

    /// The main locator.
    pub fn main_locator(&self) -> &str {
        &self.main_locator
    }

    /// The secondary locator, if any.
    pub fn sub_locator(&self) -> Option<&str> {
        self.sub_locator.as_deref()
    }
}

/// Validated, immutable coordinator configuration.
#[derive(Clone)]
pub struct PlaybinConfig {
    name: String,
    request: PlaybackRequest,
    video_sink: Option<Arc<dyn MediaSink>>,
    audio_sink: Option<Arc<dyn MediaSink>>,
    decoder_engine: DecoderEngine,
    tracing: TracingConfig,
}

impl PlaybinConfig {
    /// Start building a configuration.
    pub fn builder() -> PlaybinConfigBuilder {
        PlaybinConfigBuilder::default()
    }

    /// Element name used in logs and reports.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The playback request.
    pub fn request(&self) -> &PlaybackRequest {
        &self.request
    }

    /// Sink for the video branch.
    pub fn video_sink(&self) -> Option<&Arc<dyn MediaSink>> {
        self.video_sink.as_ref()
    }

    /// Sink for the audio branch.
    pub fn audio_sink(&self) -> Option<&Arc<dyn MediaSink>> {
        self.audio_sink.as_ref()
    }

    /// Decoder engine selecting the codec-gap mapping.
    pub fn decoder_engine(&self) -> DecoderEngine {
        self.decoder_engine
    }

    /// Span settings.
    pub fn tracing(&self) -> &TracingConfig {
        &self.tracing
    }
}

impl fmt::Debug for PlaybinConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlaybinConfig")
            .field("name", &self.name)
            .field("request", &self.request)
            .field("video_sink", &self.video_sink.as_ref().map(|s| s.name()))
            .field("audio_sink", &self.audio_sink.as_ref().map(|s| s.name()))
            .field("decoder_engine", &self.decoder_engine)
            .finish()
    }
}

/// Builder for [`PlaybinConfig`].
#[derive(Default)]
pub struct PlaybinConfigBuilder {
    name: Option<String>,
    main_locator: Option<String>,
    sub_locator: Option<String>,
    video_sink: Option<Arc<dyn MediaSink>>,
    audio_sink: Option<Arc<dyn MediaSink>>,
    decoder_engine: DecoderEngine,
    tracing: TracingConfig,
}

impl PlaybinConfigBuilder {
    /// Set the element name (default `playbin`).
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the main locator. Required.
    pub fn main_locator(mut self, locator: impl Into<String>) -> Self {
        self.main_locator = Some(locator.into());
        self
    }

    /// Set the secondary locator.
    pub fn sub_locator(mut self, locator: impl Into<String>) -> Self {
        self.sub_locator = Some(locator.into());
        self
    }

    /// Set both locators from a request.
    pub fn request(mut self, request: PlaybackRequest) -> Self {
        self.main_locator = Some(request.main_locator);
        self.sub_locator = request.sub_locator;
        self
    }

    /// Set the video sink.
    pub fn video_sink(mut self, sink: Arc<dyn MediaSink>) -> Self {
        self.video_sink = Some(sink);
        self
    }

    /// Set the audio sink.
    pub fn audio_sink(mut self, sink: Arc<dyn MediaSink>) -> Self {
        self.audio_sink = Some(sink);
        self
    }

    /// Select the decoder engine.
    pub fn decoder_engine(mut self, engine: DecoderEngine) -> Self {
        self.decoder_engine = engine;
        self
    }

    /// Set span settings.
    pub fn tracing(mut self, tracing: TracingConfig) -> Self {
        self.tracing = tracing;
        self
    }

    /// Validate and build.
    pub fn build(self) -> Result<PlaybinConfig> {
        let main_locator = self
            .main_locator
            .filter(|l| !l.trim().is_empty())
            .ok_or_else(|| Error::InvalidConfig("a main locator is required".into()))?;

        let name = self.name.unwrap_or_else(|| "playbin".to_string());
        if name.is_empty() {
            return Err(Error::InvalidConfig("element name must not be empty".into()));
        }

        if let (Some(video), Some(audio)) = (&self.video_sink, &self.audio_sink) {
            if Arc::ptr_eq(video, audio) {
                return Err(Error::InvalidConfig(
                    "video and audio branches need distinct sinks".into(),
                ));
            }
        }

        Ok(PlaybinConfig {
            name,
            request: PlaybackRequest {
                main_locator,
                sub_locator: self.sub_locator.filter(|l| !l.is_empty()),
            },
            video_sink: self.video_sink,
            audio_sink: self.audio_sink,
            decoder_engine: self.decoder_engine,
            tracing: self.tracing,
        })
    }
}
