//! Synthetic sources for the `redvideo://` and `codec://` schemes.

use crate::caps::{Caps, StreamDescriptor, StreamKind};
use crate::element::UriSource;
use crate::error::Result;
use crate::locator::Locator;

/// Produces a single raw I420 video stream, 64x64 at 1 fps.
///
/// The locator is recorded but not interpreted.
#[derive(Debug, Default)]
pub struct RedVideoSrc {
    locator: Option<Locator>,
    opened: bool,
}

impl RedVideoSrc {
    /// Create a source.
    pub fn new() -> Self {
        Self::default()
    }

    /// The configured locator.
    pub fn locator(&self) -> Option<&Locator> {
        self.locator.as_ref()
    }

    /// Whether `open()` was called and `close()` was not.
    pub fn is_open(&self) -> bool {
        self.opened
    }

    /// Caps of the produced stream.
    pub fn caps() -> Caps {
        Caps::new("video/x-raw")
            .with_field("format", "I420")
            .with_field("width", "64")
            .with_field("height", "64")
            .with_field("framerate", "1/1")
    }
}

impl UriSource for RedVideoSrc {
    fn name(&self) -> &str {
        "redvideosrc"
    }

    fn set_locator(&mut self, locator: &Locator) -> Result<()> {
        self.locator = Some(locator.clone());
        Ok(())
    }

    fn open(&mut self) -> Result<()> {
        self.opened = true;
        Ok(())
    }

    fn probe(&mut self) -> Result<Vec<StreamDescriptor>> {
        Ok(vec![StreamDescriptor::new(StreamKind::Video, Self::caps())])
    }

    fn close(&mut self) {
        self.opened = false;
    }
}

/// Produces a single stream in a format no built-in decoder handles.
#[derive(Debug, Default)]
pub struct CodecSrc {
    locator: Option<Locator>,
    opened: bool,
}

impl CodecSrc {
    /// Create a source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `open()` was called and `close()` was not.
    pub fn is_open(&self) -> bool {
        self.opened
    }

    /// The configured locator.
    pub fn locator(&self) -> Option<&Locator> {
        self.locator.as_ref()
    }

    /// Caps of the produced stream.
    pub fn caps() -> Caps {
        Caps::new("application/x-codec")
    }
}

impl UriSource for CodecSrc {
    fn name(&self) -> &str {
        "codecsrc"
    }

    fn set_locator(&mut self, locator: &Locator) -> Result<()> {
        self.locator = Some(locator.clone());
        Ok(())
    }

    fn open(&mut self) -> Result<()> {
        self.opened = true;
        Ok(())
    }

    fn probe(&mut self) -> Result<Vec<StreamDescriptor>> {
        Ok(vec![StreamDescriptor::new(StreamKind::Video, Self::caps())])
    }

    fn close(&mut self) {
        self.opened = false;
    }
}
