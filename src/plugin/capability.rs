//! Decoder lookup by stream format.

use crate::caps::Caps;
use crate::element::{Decoder, DecoderFactory};
use crate::error::{Error, Result};
use std::sync::{Arc, RwLock};

/// Rank of a decoder; the highest-ranked accepting decoder wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Rank(pub u16);

impl Rank {
    /// Never chosen automatically over a ranked decoder.
    pub const NONE: Rank = Rank(0);
    /// Fallback decoders.
    pub const MARGINAL: Rank = Rank(64);
    /// Alternative decoders.
    pub const SECONDARY: Rank = Rank(128);
    /// Preferred decoders.
    pub const PRIMARY: Rank = Rank(256);
}

/// A registered decoder.
#[derive(Clone)]
pub struct DecoderDescriptor {
    /// Decoder name.
    pub name: String,
    /// Media types the decoder declares support for.
    pub media_types: Vec<String>,
    /// Selection rank.
    pub rank: Rank,
    /// Constructor.
    pub factory: DecoderFactory,
}

impl DecoderDescriptor {
    /// Whether this decoder declares support for `caps`.
    pub fn accepts(&self, caps: &Caps) -> bool {
        self.media_types.iter().any(|m| m == caps.media_type())
    }
}

impl std::fmt::Debug for DecoderDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DecoderDescriptor")
            .field("name", &self.name)
            .field("media_types", &self.media_types)
            .field("rank", &self.rank)
            .finish_non_exhaustive()
    }
}

/// Maps stream formats to decoder factories.
pub struct CapabilityResolver {
    decoders: RwLock<Vec<DecoderDescriptor>>,
}

impl CapabilityResolver {
    /// Create a resolver with the built-in raw passthrough and subtitle
    /// parser decoders registered.
    pub fn new() -> Self {
        use crate::elements::{PassthroughDecoder, SubParse};

        let resolver = Self::empty();
        resolver.register(
            "rawpassthrough",
            &["video/x-raw", "audio/x-raw", "text/plain"],
            Rank::MARGINAL,
            || Box::new(PassthroughDecoder::new("rawpassthrough")),
        );
        resolver.register("subparse", SubParse::MEDIA_TYPES, Rank::PRIMARY, || {
            Box::new(SubParse::new())
        });
        resolver
    }

    /// Create a resolver with no decoders.
    pub fn empty() -> Self {
        Self {
            decoders: RwLock::new(Vec::new()),
        }
    }

    /// Register a decoder for a set of media types.
    pub fn register<F>(&self, name: &str, media_types: &[&str], rank: Rank, factory: F)
    where
        F: Fn() -> Box<dyn Decoder> + Send + Sync + 'static,
    {
        let descriptor = DecoderDescriptor {
            name: name.to_string(),
            media_types: media_types.iter().map(|m| m.to_string()).collect(),
            rank,
            factory: Arc::new(factory),
        };
        self.decoders.write().unwrap().push(descriptor);
    }

    /// Whether any decoder declares support for `caps`.
    pub fn supports(&self, caps: &Caps) -> bool {
        self.decoders.read().unwrap().iter().any(|d| d.accepts(caps))
    }

    /// Names of all registered decoders, in registration order.
    pub fn list_decoders(&self) -> Vec<String> {
        self.decoders
            .read()
            .unwrap()
            .iter()
            .map(|d| d.name.clone())
            .collect()
    }

    /// Create a decoder for `caps`.
    ///
    /// Among accepting decoders the highest rank wins; on equal rank the most
    /// recent registration wins. Fails with [`Error::NoCapabilityMatch`] if no
    /// decoder accepts the format.
    pub fn resolve(&self, caps: &Caps) -> Result<Box<dyn Decoder>> {
        let factory = {
            let decoders = self.decoders.read().unwrap();
            decoders
                .iter()
                .enumerate()
                .filter(|(_, d)| d.accepts(caps))
                .max_by_key(|(index, d)| (d.rank, *index))
                .map(|(_, d)| d.factory.clone())
        };

        match factory {
            Some(factory) => {
                let decoder = factory();
                tracing::debug!(caps = %caps, decoder = decoder.name(), "resolved decoder");
                Ok(decoder)
            }
            None => Err(Error::NoCapabilityMatch(caps.clone())),
        }
    }
}

impl Default for CapabilityResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CapabilityResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CapabilityResolver")
            .field("decoders", &self.list_decoders())
            .finish()
    }
}
