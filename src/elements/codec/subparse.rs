//! Subtitle parser.

use crate::caps::Caps;
use crate::element::Decoder;
use crate::error::{Error, Result};

/// Turns subtitle files into plain timed text.
#[derive(Debug, Default)]
pub struct SubParse {
    format: Option<String>,
}

impl SubParse {
    /// Subtitle formats the parser accepts.
    pub const MEDIA_TYPES: &'static [&'static str] = &[
        "application/x-subtitle",
        "application/x-subtitle-vtt",
        "application/x-ssa",
    ];

    /// Create a parser.
    pub fn new() -> Self {
        Self::default()
    }

    /// The short format name of the negotiated input.
    pub fn format(&self) -> Option<&str> {
        self.format.as_deref()
    }

    fn format_name(media_type: &str) -> &'static str {
        match media_type {
            "application/x-subtitle-vtt" => "vtt",
            "application/x-ssa" => "ssa",
            _ => "srt",
        }
    }
}

impl Decoder for SubParse {
    fn name(&self) -> &str {
        "subparse"
    }

    fn negotiate(&mut self, input: &Caps) -> Result<Caps> {
        if !Self::MEDIA_TYPES.contains(&input.media_type()) {
            return Err(Error::NoCapabilityMatch(input.clone()));
        }
        let format = Self::format_name(input.media_type());
        self.format = Some(format.to_string());
        Ok(Caps::new("text/plain").with_field("origin", format))
    }
}
