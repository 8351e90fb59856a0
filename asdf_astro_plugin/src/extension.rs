use std::sync::Arc;

use asdf_astro_registry::{Manifest, TagDefinition, VersionRequirement};

use crate::{Converter, ExtensionBuildError, ResourceManager};

/// An extension.
///
/// An extension bundles the converters for the tags it is responsible for.
pub trait Extension: Send + Sync {
    /// The extension URI, recorded in the metadata of documents that use the extension.
    fn extension_uri(&self) -> &str;

    /// Class names that older software recorded in place of the extension URI.
    fn legacy_class_names(&self) -> &[String] {
        &[]
    }

    /// The ASDF Standard versions the extension supports.
    fn asdf_standard_requirement(&self) -> &VersionRequirement;

    /// The tags the extension is responsible for, in priority order.
    fn tags(&self) -> Vec<&TagDefinition>;

    /// The converters, in priority order.
    fn converters(&self) -> Vec<Arc<dyn Converter>>;
}

/// An extension built from a [`Manifest`].
pub struct ManifestExtension {
    manifest: Manifest,
    converters: Vec<Arc<dyn Converter>>,
    legacy_class_names: Vec<String>,
}

impl ManifestExtension {
    /// Create an extension from a manifest.
    #[must_use]
    pub fn from_manifest(manifest: Manifest, converters: Vec<Arc<dyn Converter>>) -> Self {
        Self {
            manifest,
            converters,
            legacy_class_names: Vec::new(),
        }
    }

    /// Create an extension from the manifest resource with `uri`.
    ///
    /// # Errors
    /// Returns an [`ExtensionBuildError`] if `resources` does not provide `uri` or the manifest is invalid.
    pub fn from_uri(
        uri: &str,
        resources: &ResourceManager,
        converters: Vec<Arc<dyn Converter>>,
    ) -> Result<Self, ExtensionBuildError> {
        let content = resources
            .get(uri)
            .ok_or_else(|| ExtensionBuildError::UnknownResource(uri.to_string()))?;
        let manifest =
            Manifest::from_yaml(content).map_err(|source| ExtensionBuildError::InvalidManifest {
                uri: uri.to_string(),
                source,
            })?;
        Ok(Self::from_manifest(manifest, converters))
    }

    /// Set the legacy class names.
    #[must_use]
    pub fn with_legacy_class_names<S: Into<String>>(
        mut self,
        legacy_class_names: impl IntoIterator<Item = S>,
    ) -> Self {
        self.legacy_class_names = legacy_class_names.into_iter().map(Into::into).collect();
        self
    }

    /// Returns the manifest.
    #[must_use]
    pub const fn manifest(&self) -> &Manifest {
        &self.manifest
    }
}

impl Extension for ManifestExtension {
    fn extension_uri(&self) -> &str {
        &self.manifest.extension_uri
    }

    fn legacy_class_names(&self) -> &[String] {
        &self.legacy_class_names
    }

    fn asdf_standard_requirement(&self) -> &VersionRequirement {
        &self.manifest.asdf_standard_requirement
    }

    fn tags(&self) -> Vec<&TagDefinition> {
        self.manifest.tags.iter().collect()
    }

    fn converters(&self) -> Vec<Arc<dyn Converter>> {
        self.converters.clone()
    }
}

/// An extension combining the tags and converters of several extensions under one identity.
///
/// The extension URI, ASDF Standard requirement and legacy class names are those of the first member.
/// Tags and converters are concatenated in member order, so earlier members take priority.
pub struct CompoundExtension {
    extensions: Vec<Arc<dyn Extension>>,
}

impl CompoundExtension {
    /// Create a compound extension.
    ///
    /// # Errors
    /// Returns [`ExtensionBuildError::EmptyCompound`] if `extensions` is empty.
    pub fn new(extensions: Vec<Arc<dyn Extension>>) -> Result<Self, ExtensionBuildError> {
        if extensions.is_empty() {
            Err(ExtensionBuildError::EmptyCompound)
        } else {
            Ok(Self { extensions })
        }
    }

    /// Returns the member extensions.
    #[must_use]
    pub fn extensions(&self) -> &[Arc<dyn Extension>] {
        &self.extensions
    }

    fn primary(&self) -> &dyn Extension {
        self.extensions[0].as_ref()
    }
}

impl Extension for CompoundExtension {
    fn extension_uri(&self) -> &str {
        self.primary().extension_uri()
    }

    fn legacy_class_names(&self) -> &[String] {
        self.primary().legacy_class_names()
    }

    fn asdf_standard_requirement(&self) -> &VersionRequirement {
        self.primary().asdf_standard_requirement()
    }

    fn tags(&self) -> Vec<&TagDefinition> {
        self.extensions
            .iter()
            .flat_map(|extension| extension.tags())
            .collect()
    }

    fn converters(&self) -> Vec<Arc<dyn Converter>> {
        self.extensions
            .iter()
            .flat_map(|extension| extension.converters())
            .collect()
    }
}
