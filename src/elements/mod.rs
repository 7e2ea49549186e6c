//! Built-in elements.
//!
//! # Sources
//!
//! - [`FileSrc`]: `file://` locators, stream type from the file extension
//! - [`RedVideoSrc`]: synthetic raw video for `redvideo://`
//! - [`CodecSrc`]: synthetic stream in an unknown format for `codec://`
//!
//! # Decoders
//!
//! - [`PassthroughDecoder`]: raw formats
//! - [`SubParse`]: subtitle formats
//!
//! # Sinks
//!
//! - [`FakeSink`]: discards everything, records state history

pub mod codec;
pub mod io;
pub mod testing;

pub use codec::{PassthroughDecoder, SubParse};
pub use io::FileSrc;
pub use testing::{CodecSrc, FakeSink, RedVideoSrc};
