//! Elements for tests and demos.
//!
//! - [`RedVideoSrc`]: raw video for `redvideo://`
//! - [`CodecSrc`]: an undecodable stream for `codec://`
//! - [`FakeSink`]: a sink that records its state history

mod fakesink;
mod testsrc;

pub use fakesink::FakeSink;
pub use testsrc::{CodecSrc, RedVideoSrc};
