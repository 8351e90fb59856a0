use std::sync::Arc;

use asdf_astro_registry::Version;
use indexmap::IndexSet;

use crate::ExtensionManager;

/// The context of one read or write of a document.
///
/// Converters receive the context and forward it to nested conversions unchanged.
#[derive(Clone, Debug)]
pub struct SerializationContext {
    version: Version,
    extension_manager: Option<Arc<ExtensionManager>>,
    extensions_used: IndexSet<String>,
}

impl SerializationContext {
    /// Create a new context for ASDF Standard `version`.
    #[must_use]
    pub fn new(version: Version) -> Self {
        Self {
            version,
            extension_manager: None,
            extensions_used: IndexSet::new(),
        }
    }

    /// Create a new context backed by `extension_manager`.
    #[must_use]
    pub fn with_extension_manager(extension_manager: Arc<ExtensionManager>) -> Self {
        Self {
            version: extension_manager.version(),
            extension_manager: Some(extension_manager),
            extensions_used: IndexSet::new(),
        }
    }

    /// Returns the ASDF Standard version of the document.
    #[must_use]
    pub const fn version(&self) -> Version {
        self.version
    }

    /// Returns true if an active converter can write values with `type_key`.
    ///
    /// Always false for a context without an extension manager.
    #[must_use]
    pub fn handles_type(&self, type_key: &str) -> bool {
        self.extension_manager
            .as_ref()
            .is_some_and(|manager| manager.handles_type(type_key, &[]))
    }

    /// Record that the extension with `extension_uri` was used.
    pub fn mark_extension_used(&mut self, extension_uri: &str) {
        if !self.extensions_used.contains(extension_uri) {
            self.extensions_used.insert(extension_uri.to_string());
        }
    }

    /// Returns the URIs of the extensions used, in order of first use.
    pub fn extensions_used(&self) -> impl Iterator<Item = &str> {
        self.extensions_used.iter().map(String::as_str)
    }
}
