//! File-backed source.

use crate::caps::{Caps, StreamDescriptor, StreamKind};
use crate::element::UriSource;
use crate::error::{Error, Result};
use crate::locator::Locator;
use std::fs::Metadata;
use std::path::{Path, PathBuf};

/// Extension → stream table used for type detection.
///
/// Contents are never read; demuxing is outside this crate.
const TYPE_TABLE: &[(&str, StreamKind, &str)] = &[
    ("yuv", StreamKind::Video, "video/x-raw"),
    ("i420", StreamKind::Video, "video/x-raw"),
    ("h264", StreamKind::Video, "video/x-h264"),
    ("264", StreamKind::Video, "video/x-h264"),
    ("ivf", StreamKind::Video, "video/x-vp8"),
    ("pcm", StreamKind::Audio, "audio/x-raw"),
    ("opus", StreamKind::Audio, "audio/x-opus"),
    ("aac", StreamKind::Audio, "audio/mpeg"),
    ("srt", StreamKind::Subtitle, "application/x-subtitle"),
    ("sub", StreamKind::Subtitle, "application/x-subtitle"),
    ("vtt", StreamKind::Subtitle, "application/x-subtitle-vtt"),
    ("ass", StreamKind::Subtitle, "application/x-ssa"),
    ("ssa", StreamKind::Subtitle, "application/x-ssa"),
    ("txt", StreamKind::Subtitle, "text/plain"),
];

/// A source for `file://` locators.
///
/// `open()` checks that the path exists and is a regular file or device;
/// `probe()` derives the stream from the file extension.
///
/// # Example
///
/// ```rust,ignore
/// use parallax_playbin::elements::FileSrc;
///
/// let mut src = FileSrc::new();
/// src.set_locator(&Locator::parse("file:///media/clip.yuv")?)?;
/// src.open()?;
/// let streams = src.probe()?;
/// ```
#[derive(Debug)]
pub struct FileSrc {
    name: String,
    path: Option<PathBuf>,
    metadata: Option<Metadata>,
}

impl FileSrc {
    /// Create an unconfigured file source.
    pub fn new() -> Self {
        Self {
            name: "filesrc".to_string(),
            path: None,
            metadata: None,
        }
    }

    /// The configured path.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Whether `open()` succeeded and `close()` has not been called.
    pub fn is_open(&self) -> bool {
        self.metadata.is_some()
    }

    fn detect(path: &Path) -> Option<StreamDescriptor> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        TYPE_TABLE
            .iter()
            .find(|(e, _, _)| *e == ext)
            .map(|(_, kind, media_type)| StreamDescriptor::new(*kind, Caps::new(*media_type)))
    }
}

impl Default for FileSrc {
    fn default() -> Self {
        Self::new()
    }
}

impl UriSource for FileSrc {
    fn name(&self) -> &str {
        &self.name
    }

    fn set_locator(&mut self, locator: &Locator) -> Result<()> {
        let path = locator.to_file_path().ok_or_else(|| Error::MalformedLocator {
            locator: locator.to_string(),
            reason: "not a local file path".into(),
        })?;
        self.name = format!("filesrc:{}", path.display());
        self.path = Some(path);
        Ok(())
    }

    fn open(&mut self) -> Result<()> {
        let path = self
            .path
            .as_ref()
            .ok_or_else(|| Error::ResourceNotFound("no location set".into()))?;

        let metadata = std::fs::metadata(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => Error::ResourceNotFound(path.display().to_string()),
            _ => Error::Io(e),
        })?;
        if metadata.is_dir() {
            return Err(Error::ResourceNotFound(format!(
                "{} is a directory",
                path.display()
            )));
        }

        self.metadata = Some(metadata);
        Ok(())
    }

    fn probe(&mut self) -> Result<Vec<StreamDescriptor>> {
        let path = self
            .path
            .as_ref()
            .ok_or_else(|| Error::ResourceNotFound("no location set".into()))?;
        if self.metadata.is_none() {
            return Err(Error::state_change(&self.name, "probe before open"));
        }

        match Self::detect(path) {
            Some(stream) => Ok(vec![stream]),
            None => Err(Error::TypeNotFound(path.display().to_string())),
        }
    }

    fn close(&mut self) {
        self.metadata = None;
    }
}
