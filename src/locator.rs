//! Scheme-prefixed resource locators.

use crate::error::{Error, Result};
use std::fmt;
use std::path::PathBuf;
use url::Url;

/// A validated locator such as `file:///media/clip.yuv` or `redvideo://`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locator {
    raw: String,
    url: Url,
}

impl Locator {
    /// Parse a locator.
    ///
    /// Fails with [`Error::MalformedLocator`] if there is no scheme separator
    /// or the text is not a valid URI.
    pub fn parse(raw: &str) -> Result<Self> {
        let url = Url::parse(raw).map_err(|e| Error::MalformedLocator {
            locator: raw.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self {
            raw: raw.to_string(),
            url,
        })
    }

    /// Best-effort scheme of text that may not parse.
    ///
    /// Returns the text before the first `:` lower-cased, or `None` if
    /// there is no separator.
    pub fn scheme_hint(raw: &str) -> Option<String> {
        raw.split_once(':')
            .map(|(scheme, _)| scheme.to_ascii_lowercase())
            .filter(|scheme| !scheme.is_empty())
    }

    /// The scheme, lower-cased.
    pub fn scheme(&self) -> &str {
        self.url.scheme()
    }

    /// The locator as supplied.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// The host part, if any.
    pub fn host(&self) -> Option<&str> {
        self.url.host_str().filter(|h| !h.is_empty())
    }

    /// The path component.
    pub fn path(&self) -> &str {
        self.url.path()
    }

    /// Filesystem path for `file` locators.
    pub fn to_file_path(&self) -> Option<PathBuf> {
        if self.scheme() != "file" {
            return None;
        }
        self.url.to_file_path().ok()
    }

    /// The parsed URL.
    pub fn url(&self) -> &Url {
        &self.url
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}
