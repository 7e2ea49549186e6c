//! File-backed elements.
//!
//! - [`FileSrc`]: `file://` locators

mod file;

pub use file::FileSrc;
