//! Built-in decoders.
//!
//! - [`PassthroughDecoder`]: raw formats, output equals input
//! - [`SubParse`]: subtitle files to plain text

mod passthrough;
mod subparse;

pub use passthrough::PassthroughDecoder;
pub use subparse::SubParse;
