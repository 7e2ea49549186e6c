//! Scheme registry for source components.

use crate::element::{SourceFactory, UriSource};
use crate::error::{Error, Result};
use crate::locator::Locator;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// A registered scheme handler.
#[derive(Clone)]
pub struct UriHandlerDescriptor {
    /// Scheme handled, lower-case.
    pub scheme: String,
    /// Constructor for the source component.
    pub factory: SourceFactory,
}

impl std::fmt::Debug for UriHandlerDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UriHandlerDescriptor")
            .field("scheme", &self.scheme)
            .finish_non_exhaustive()
    }
}

/// Maps locator schemes to source factories.
///
/// Registration is a pure map operation. By default a later registration
/// shadows an earlier one; [`register_strict`](Self::register_strict)
/// refuses duplicates instead.
pub struct UriHandlerRegistry {
    handlers: RwLock<HashMap<String, UriHandlerDescriptor>>,
}

impl UriHandlerRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            handlers: RwLock::new(HashMap::new()),
        }
    }

    /// Create a registry with the built-in sources (`file`, `redvideo`,
    /// `codec`).
    pub fn with_builtin() -> Self {
        use crate::elements::{CodecSrc, FileSrc, RedVideoSrc};

        let registry = Self::new();
        registry.register("file", || Box::new(FileSrc::new()));
        registry.register("redvideo", || Box::new(RedVideoSrc::new()));
        registry.register("codec", || Box::new(CodecSrc::new()));
        registry
    }

    /// Register a factory for `scheme`, replacing any previous handler.
    ///
    /// Returns true if an earlier handler was shadowed.
    pub fn register<F>(&self, scheme: &str, factory: F) -> bool
    where
        F: Fn() -> Box<dyn UriSource> + Send + Sync + 'static,
    {
        let scheme = scheme.to_ascii_lowercase();
        let descriptor = UriHandlerDescriptor {
            scheme: scheme.clone(),
            factory: Arc::new(factory),
        };
        let shadowed = self
            .handlers
            .write()
            .unwrap()
            .insert(scheme.clone(), descriptor)
            .is_some();
        if shadowed {
            tracing::debug!(%scheme, "scheme handler shadowed");
        }
        shadowed
    }

    /// Register a factory, failing with [`Error::DuplicateScheme`] if the
    /// scheme already has a handler.
    pub fn register_strict<F>(&self, scheme: &str, factory: F) -> Result<()>
    where
        F: Fn() -> Box<dyn UriSource> + Send + Sync + 'static,
    {
        let scheme = scheme.to_ascii_lowercase();
        let mut handlers = self.handlers.write().unwrap();
        if handlers.contains_key(&scheme) {
            return Err(Error::DuplicateScheme(scheme));
        }
        handlers.insert(
            scheme.clone(),
            UriHandlerDescriptor {
                scheme,
                factory: Arc::new(factory),
            },
        );
        Ok(())
    }

    /// Remove the handler for `scheme`. Returns true if one was removed.
    pub fn unregister(&self, scheme: &str) -> bool {
        self.handlers
            .write()
            .unwrap()
            .remove(&scheme.to_ascii_lowercase())
            .is_some()
    }

    /// Check if a scheme has a handler.
    pub fn has_scheme(&self, scheme: &str) -> bool {
        self.handlers
            .read()
            .unwrap()
            .contains_key(&scheme.to_ascii_lowercase())
    }

    /// All registered schemes, sorted.
    pub fn schemes(&self) -> Vec<String> {
        let mut schemes: Vec<String> = self.handlers.read().unwrap().keys().cloned().collect();
        schemes.sort();
        schemes
    }

    /// Number of registered schemes.
    pub fn len(&self) -> usize {
        self.handlers.read().unwrap().len()
    }

    /// Whether no scheme is registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Create a source for `uri`.
    ///
    /// Fails with [`Error::UnknownScheme`] if no handler is registered for
    /// the scheme or `uri` has no scheme separator. A malformed `uri` reports
    /// whatever precedes its first `:`, or an empty scheme. The new source
    /// has its locator set.
    pub fn resolve(&self, uri: &str) -> Result<Box<dyn UriSource>> {
        let locator = Locator::parse(uri).map_err(|e| {
            tracing::debug!(error = %e, "unparsable locator");
            Error::UnknownScheme(Locator::scheme_hint(uri).unwrap_or_default())
        })?;
        self.resolve_locator(&locator)
    }

    /// Create a source for an already parsed locator.
    pub fn resolve_locator(&self, locator: &Locator) -> Result<Box<dyn UriSource>> {
        let factory = {
            let handlers = self.handlers.read().unwrap();
            handlers
                .get(locator.scheme())
                .map(|d| d.factory.clone())
                .ok_or_else(|| Error::UnknownScheme(locator.scheme().to_string()))?
        };

        let mut source = factory();
        source.set_locator(locator)?;
        tracing::debug!(locator = %locator, source = source.name(), "resolved scheme handler");
        Ok(source)
    }
}

impl Default for UriHandlerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for UriHandlerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UriHandlerRegistry")
            .field("schemes", &self.schemes())
            .finish()
    }
}
