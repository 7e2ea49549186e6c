//! Decoder for formats that are already decoded.

use crate::caps::Caps;
use crate::element::Decoder;
use crate::error::Result;

/// Forwards its input format unchanged.
#[derive(Debug, Clone)]
pub struct PassthroughDecoder {
    name: String,
    negotiated: Option<Caps>,
}

impl PassthroughDecoder {
    /// Create a passthrough decoder with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            negotiated: None,
        }
    }

    /// The last negotiated format.
    pub fn negotiated(&self) -> Option<&Caps> {
        self.negotiated.as_ref()
    }
}

impl Decoder for PassthroughDecoder {
    fn name(&self) -> &str {
        &self.name
    }

    fn negotiate(&mut self, input: &Caps) -> Result<Caps> {
        self.negotiated = Some(input.clone());
        Ok(input.clone())
    }
}
