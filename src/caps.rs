//! Stream format descriptors.
//!
//! [`Caps`] is deliberately opaque to the coordinator: it is produced by a
//! source probe and matched by media type against the decoders registered
//! with the [`CapabilityResolver`](crate::plugin::CapabilityResolver).
//!
//! ```rust
//! use parallax_playbin::caps::Caps;
//!
//! let caps = Caps::new("video/x-raw")
//!     .with_field("format", "I420")
//!     .with_field("width", "64");
//! assert_eq!(caps.to_string(), "video/x-raw, format=I420, width=64");
//! assert!(caps.is_raw());
//! ```

use smallvec::SmallVec;
use std::fmt;

/// Media types that need no decoding.
const RAW_MEDIA_TYPES: &[&str] = &["video/x-raw", "audio/x-raw", "text/plain"];

/// Kind of a media stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StreamKind {
    /// Video frames.
    Video,
    /// Audio samples.
    Audio,
    /// Subtitle / overlay text.
    Subtitle,
}

impl StreamKind {
    /// Guess the stream kind from a media type prefix.
    pub fn from_media_type(media_type: &str) -> Option<Self> {
        let (top, sub) = media_type.split_once('/')?;
        match top {
            "video" => Some(StreamKind::Video),
            "audio" => Some(StreamKind::Audio),
            "text" => Some(StreamKind::Subtitle),
            "application" if sub.starts_with("x-subtitle") || sub == "x-ssa" => {
                Some(StreamKind::Subtitle)
            }
            _ => None,
        }
    }

    /// Lower-case name.
    pub fn as_str(&self) -> &'static str {
        match self {
            StreamKind::Video => "video",
            StreamKind::Audio => "audio",
            StreamKind::Subtitle => "subtitle",
        }
    }
}

impl fmt::Display for StreamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Opaque stream format descriptor: a media type plus ordered fields.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Caps {
    media_type: String,
    fields: SmallVec<[(String, String); 4]>,
}

impl Caps {
    /// Create caps with no fields.
    pub fn new(media_type: impl Into<String>) -> Self {
        Self {
            media_type: media_type.into(),
            fields: SmallVec::new(),
        }
    }

    /// Append a field. A field with the same key is replaced in place.
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let key = key.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.fields.push((key, value)),
        }
        self
    }

    /// The media type, e.g. `video/x-raw`.
    pub fn media_type(&self) -> &str {
        &self.media_type
    }

    /// Look up a field value.
    pub fn field(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Iterate over all fields in insertion order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Whether this is an already-decoded format.
    pub fn is_raw(&self) -> bool {
        RAW_MEDIA_TYPES.contains(&self.media_type.as_str())
    }
}

impl fmt::Display for Caps {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.media_type)?;
        for (key, value) in &self.fields {
            write!(f, ", {}={}", key, value)?;
        }
        Ok(())
    }
}

/// A stream produced by a resolved source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamDescriptor {
    /// Kind of stream.
    pub kind: StreamKind,
    /// Format of the stream.
    pub caps: Caps,
}

impl StreamDescriptor {
    /// Create a stream descriptor.
    pub fn new(kind: StreamKind, caps: Caps) -> Self {
        Self { kind, caps }
    }

    /// Create a descriptor whose kind is derived from the caps media type.
    pub fn from_caps(caps: Caps) -> Option<Self> {
        StreamKind::from_media_type(caps.media_type()).map(|kind| Self { kind, caps })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stream_kind_from_media_type() {
        assert_eq!(
            StreamKind::from_media_type("video/x-h264"),
            Some(StreamKind::Video)
        );
        assert_eq!(
            StreamKind::from_media_type("audio/x-raw"),
            Some(StreamKind::Audio)
        );
        assert_eq!(
            StreamKind::from_media_type("application/x-subtitle"),
            Some(StreamKind::Subtitle)
        );
        assert_eq!(StreamKind::from_media_type("application/x-codec"), None);
        assert_eq!(StreamKind::from_media_type("garbage"), None);
    }

    #[test]
    fn test_with_field_replaces() {
        let caps = Caps::new("video/x-raw")
            .with_field("width", "64")
            .with_field("width", "128");
        assert_eq!(caps.field("width"), Some("128"));
        assert_eq!(caps.fields().count(), 1);
    }

    #[test]
    fn test_raw_detection() {
        assert!(Caps::new("audio/x-raw").is_raw());
        assert!(Caps::new("text/plain").is_raw());
        assert!(!Caps::new("application/x-codec").is_raw());
    }

    #[test]
    fn test_display_without_fields() {
        assert_eq!(
            Caps::new("application/x-codec").to_string(),
            "application/x-codec"
        );
    }
}
