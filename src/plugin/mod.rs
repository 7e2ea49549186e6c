//! Component registries.
//!
//! Plugin enumeration itself is out of scope: components are made available
//! by registering factories.
//!
//! - [`UriHandlerRegistry`]: locator scheme → source factory
//! - [`CapabilityResolver`]: stream format → decoder factory
//!
//! # Example
//!
//! ```rust
//! use parallax_playbin::caps::Caps;
//! use parallax_playbin::elements::{PassthroughDecoder, RedVideoSrc};
//! use parallax_playbin::plugin::{CapabilityResolver, Rank, UriHandlerRegistry};
//!
//! let registry = UriHandlerRegistry::new();
//! registry.register("redvideo", || Box::new(RedVideoSrc::new()));
//!
//! let decoders = CapabilityResolver::new();
//! decoders.register("codecdec", &["application/x-codec"], Rank::PRIMARY, || {
//!     Box::new(PassthroughDecoder::new("codecdec"))
//! });
//! assert!(decoders.supports(&Caps::new("application/x-codec")));
//! ```

mod capability;
mod registry;

pub use capability::{CapabilityResolver, DecoderDescriptor, Rank};
pub use registry::{UriHandlerDescriptor, UriHandlerRegistry};
