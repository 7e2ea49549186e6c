//! Main and secondary locator resolution.
//!
//! The main locator is fatal: any failure to find a handler, configure it
//! or open the resource aborts the run. The secondary locator is
//! recoverable: every failure is recorded as a [`SubFailure`] and the run
//! continues without it.

use crate::bus::{DiagnosticBus, ElementDiagnostic, ErrorReport};
use crate::config::DecoderEngine;
use crate::element::UriSource;
use crate::error::{Error, Result};
use crate::locator::Locator;
use crate::plugin::UriHandlerRegistry;
use std::fmt;
use std::sync::Arc;

/// Why the secondary locator was dropped.
#[derive(Debug)]
pub struct SubFailure {
    locator: String,
    missing_scheme: Option<String>,
    cause: Error,
}

impl SubFailure {
    fn new(locator: &str, cause: Error) -> Self {
        let missing_scheme = match &cause {
            Error::UnknownScheme(scheme) => Some(scheme.clone()),
            _ => None,
        };
        Self {
            locator: locator.to_string(),
            missing_scheme,
            cause,
        }
    }

    /// The secondary locator.
    pub fn locator(&self) -> &str {
        &self.locator
    }

    /// The scheme that had no handler, if that was the cause.
    pub fn missing_scheme(&self) -> Option<&str> {
        self.missing_scheme.as_deref()
    }

    /// The underlying failure.
    pub fn cause(&self) -> &Error {
        &self.cause
    }

    /// The recovered-error form of this failure.
    pub fn to_error(&self) -> Error {
        Error::UnresolvedSubSource {
            locator: self.locator.clone(),
            reason: self.cause.to_string(),
        }
    }
}

/// Outcome of secondary resolution. Never an error.
#[derive(Debug)]
pub enum SubResolution {
    /// A source was created and opened.
    Resolved(Box<dyn UriSource>),
    /// The secondary locator was dropped.
    Recovered(SubFailure),
}

/// Resolves locators against a [`UriHandlerRegistry`] and announces gaps.
pub struct SourceResolver {
    registry: Arc<UriHandlerRegistry>,
    bus: DiagnosticBus,
    element: String,
}

impl SourceResolver {
    /// Create a resolver posting on `bus` as `element`.
    pub fn new(registry: Arc<UriHandlerRegistry>, bus: DiagnosticBus, element: impl Into<String>) -> Self {
        Self {
            registry,
            bus,
            element: element.into(),
        }
    }

    /// The registry in use.
    pub fn registry(&self) -> &Arc<UriHandlerRegistry> {
        &self.registry
    }

    /// Check that the main locator can possibly be resolved.
    ///
    /// Only an empty registry fails here; scheme lookup happens when the
    /// source is created. On failure the scheme diagnostic is posted.
    pub fn verify_main(&self, uri: &str) -> Result<()> {
        if !self.registry.is_empty() {
            return Ok(());
        }

        let scheme = Locator::scheme_hint(uri).unwrap_or_default();
        self.bus
            .post_diagnostic(ElementDiagnostic::missing_uri_source(&self.element, &scheme));
        Err(Error::UnresolvedSource {
            locator: uri.to_string(),
            scheme,
        })
    }

    /// Create and open the source for the main locator.
    ///
    /// A missing scheme handler posts `missing-plugin { urisource, scheme }`
    /// before [`Error::UnresolvedSource`] is returned. A locator without a
    /// scheme separator takes the same path with an empty scheme.
    pub fn resolve_main(&self, uri: &str) -> Result<Box<dyn UriSource>> {
        let mut source = match self.registry.resolve(uri) {
            Ok(source) => source,
            Err(Error::UnknownScheme(scheme)) => {
                tracing::warn!(element = %self.element, scheme = %scheme, "no handler for main locator");
                self.bus
                    .post_diagnostic(ElementDiagnostic::missing_uri_source(&self.element, &scheme));
                return Err(Error::UnresolvedSource {
                    locator: uri.to_string(),
                    scheme,
                });
            }
            Err(e) => return Err(e),
        };

        if let Err(e) = source.open() {
            source.close();
            return Err(e);
        }

        tracing::debug!(element = %self.element, source = source.name(), "main source opened");
        Ok(source)
    }

    /// Create and open the source for the secondary locator.
    ///
    /// Nothing is posted; failures are returned as [`SubResolution::Recovered`].
    /// An unparsable locator is recorded as malformed, never as a scheme gap.
    pub fn resolve_sub(&self, uri: &str) -> SubResolution {
        let attempt = Locator::parse(uri)
            .and_then(|locator| self.registry.resolve_locator(&locator))
            .and_then(|mut source| match source.open() {
                Ok(()) => Ok(source),
                Err(e) => {
                    source.close();
                    Err(e)
                }
            });

        match attempt {
            Ok(source) => {
                tracing::debug!(element = %self.element, source = source.name(), "sub source opened");
                SubResolution::Resolved(source)
            }
            Err(e) => {
                let failure = SubFailure::new(uri, e);
                tracing::debug!(element = %self.element, error = %failure.to_error(), "dropping sub locator");
                SubResolution::Recovered(failure)
            }
        }
    }

    /// Announce a recorded secondary scheme gap.
    ///
    /// Posts the diagnostic and a `core/MissingPlugin` report. Returns
    /// `false` for failures that are not scheme gaps, which stay silent.
    pub fn flush_sub_gap(&self, failure: &SubFailure, engine: DecoderEngine) -> bool {
        let Some(scheme) = failure.missing_scheme() else {
            return false;
        };

        self.bus
            .post_diagnostic(ElementDiagnostic::missing_uri_source(&self.element, scheme));
        let error = Error::UnresolvedSource {
            locator: failure.locator().to_string(),
            scheme: scheme.to_string(),
        };
        self.bus
            .post_error(ErrorReport::from_error(&self.element, &error, engine));
        true
    }
}

impl fmt::Debug for SourceResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SourceResolver")
            .field("element", &self.element)
            .field("schemes", &self.registry.schemes())
            .finish()
    }
}
