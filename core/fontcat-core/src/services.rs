//! Collaborators the catalog consumes through narrow interfaces.

use std::path::Path;

use anyhow::Result;

use crate::features::HeuristicFeatureGuesser;
use crate::paths::FontPaths;
use crate::value::FontKey;

/// Reads face names and metrics out of font files.
///
/// Failures are per call: the scanner logs them and moves on.
pub trait FontIntrospector: Send + Sync {
    /// The `(family, style)` of every face in the file, in subfont order.
    fn introspect_names(&self, path: &Path) -> Result<Vec<FontKey>>;

    /// Whether a font resource with this logical name (file stem) is known.
    fn font_exists(&self, name: &str) -> bool;

    /// Metric characteristics of the named font resource.
    fn analyze_metrics(&self, name: &str) -> Result<Vec<String>>;
}

/// Best-effort feature tags for a family, from its name alone.
pub trait FeatureGuesser {
    fn guess_features(&self, family: &str) -> Vec<String>;
}

/// Notified after every successful save so dependent caches can be dropped.
pub trait CacheListener {
    fn catalog_changed(&self);
}

/// Listener that ignores every notification.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopListener;

impl CacheListener for NoopListener {
    fn catalog_changed(&self) {}
}

impl<F: Fn()> CacheListener for F {
    fn catalog_changed(&self) {
        self()
    }
}

/// Everything a [`Catalog`](crate::catalog::Catalog) talks to outside itself.
pub struct Services {
    pub paths: Box<dyn FontPaths>,
    pub introspector: Box<dyn FontIntrospector>,
    pub guesser: Box<dyn FeatureGuesser>,
    pub listener: Box<dyn CacheListener>,
}

impl Services {
    pub fn new(paths: impl FontPaths + 'static, introspector: impl FontIntrospector + 'static) -> Self {
        Self {
            paths: Box::new(paths),
            introspector: Box::new(introspector),
            guesser: Box::new(HeuristicFeatureGuesser::new()),
            listener: Box::new(NoopListener),
        }
    }

    pub fn with_guesser(mut self, guesser: impl FeatureGuesser + 'static) -> Self {
        self.guesser = Box::new(guesser);
        self
    }

    pub fn with_listener(mut self, listener: impl CacheListener + 'static) -> Self {
        self.listener = Box::new(listener);
        self
    }

    /// Search paths from the environment read with the fontations backend.
    #[cfg(feature = "fontations")]
    pub fn system() -> Self {
        let paths = crate::paths::SearchPaths::from_env();
        let introspector = crate::fontations::FontationsIntrospector::new(paths.roots());
        Self::new(paths, introspector)
    }
}
