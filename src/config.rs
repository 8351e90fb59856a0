//! asdf_astro global configuration options.

use std::{
    cell::RefCell,
    marker::PhantomData,
    ops::{Deref, DerefMut},
    sync::{Arc, OnceLock, RwLock, RwLockWriteGuard},
};

use asdf_astro_plugin::{
    extension_plugins, resource_mapping_plugins, Extension, ExtensionManager, PluginCreateError,
    ResourceManager, ResourceMapping,
};
use asdf_astro_registry::{
    standard::{is_supported, DEFAULT_VERSION, SUPPORTED_VERSIONS},
    Version,
};
use itertools::Itertools;
use thiserror::Error;

/// An unsupported ASDF Standard version.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
#[error("unsupported ASDF Standard version {_0}")]
pub struct UnsupportedVersionError(pub Version);

/// Global configuration options for the asdf_astro crate.
///
/// Retrieve the effective [`Config`] with [`global_config`] and modify it with [`global_config_mut`].
/// A configuration can be temporarily installed for the current thread with [`config_context`].
///
/// ## Extensions
/// > default: the extensions of every registered [`ExtensionPlugin`](asdf_astro_plugin::ExtensionPlugin)
///
/// The installed extensions, highest priority first.
/// Plugins contribute their extensions in plugin priority order.
///
/// ## Resource Manager
/// > default: the mappings of every registered [`ResourceMappingPlugin`](asdf_astro_plugin::ResourceMappingPlugin)
///
/// Resolves manifest URIs when extensions are built.
///
/// ## Default Version
/// > default: `1.5.0`
///
/// The ASDF Standard version documents are written with when no version is requested.
#[derive(Clone)]
pub struct Config {
    extensions: Vec<Arc<dyn Extension>>,
    resource_manager: ResourceManager,
    default_version: Version,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field(
                "extensions",
                &self
                    .extensions
                    .iter()
                    .map(|extension| extension.extension_uri())
                    .collect_vec(),
            )
            .field("resource_manager", &self.resource_manager)
            .field("default_version", &self.default_version)
            .finish()
    }
}

impl Config {
    /// Create a configuration without extensions or resources.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            extensions: Vec::new(),
            resource_manager: ResourceManager::default(),
            default_version: DEFAULT_VERSION,
        }
    }

    /// Create a configuration from the registered plugins.
    ///
    /// Resource mappings are collected first, then every extension plugin builds its extensions against them.
    ///
    /// # Errors
    /// Returns a [`PluginCreateError`] if a plugin fails to create its resources or extensions.
    pub fn try_default() -> Result<Self, PluginCreateError> {
        let mappings = resource_mapping_plugins()
            .into_iter()
            .map(|plugin| plugin.create(&()))
            .collect::<Result<Vec<ResourceMapping>, _>>()?;
        let resource_manager = ResourceManager::new(&mappings);

        let mut extensions = Vec::new();
        for plugin in extension_plugins() {
            log::debug!("loading extensions from plugin {}", plugin.identifier());
            extensions.extend(plugin.create(&resource_manager)?);
        }

        Ok(Self {
            extensions,
            resource_manager,
            default_version: DEFAULT_VERSION,
        })
    }

    /// Get the installed [extensions](#extensions), highest priority first.
    #[must_use]
    pub fn extensions(&self) -> &[Arc<dyn Extension>] {
        &self.extensions
    }

    /// Install `extension`.
    ///
    /// An installed extension with the same extension URI is replaced in place.
    /// Otherwise the extension is installed with the highest priority.
    pub fn add_extension(&mut self, extension: Arc<dyn Extension>) {
        if let Some(existing) = self
            .extensions
            .iter_mut()
            .find(|existing| existing.extension_uri() == extension.extension_uri())
        {
            *existing = extension;
        } else {
            self.extensions.insert(0, extension);
        }
    }

    /// Remove the extension with `extension_uri`.
    ///
    /// Returns the removed extension, or [`None`] if it was not installed.
    pub fn remove_extension(&mut self, extension_uri: &str) -> Option<Arc<dyn Extension>> {
        let index = self
            .extensions
            .iter()
            .position(|extension| extension.extension_uri() == extension_uri)?;
        Some(self.extensions.remove(index))
    }

    /// Get the [resource manager](#resource-manager).
    #[must_use]
    pub fn resource_manager(&self) -> &ResourceManager {
        &self.resource_manager
    }

    /// Add the resources of `mapping` that are not already provided.
    pub fn add_resource_mapping(&mut self, mapping: &ResourceMapping) {
        self.resource_manager.add_mapping(mapping);
    }

    /// Get the [default version](#default-version) configuration.
    #[must_use]
    pub fn default_version(&self) -> Version {
        self.default_version
    }

    /// Set the [default version](#default-version) configuration.
    ///
    /// # Errors
    /// Returns an [`UnsupportedVersionError`] if `version` is not a supported ASDF Standard version.
    pub fn set_default_version(&mut self, version: Version) -> Result<(), UnsupportedVersionError> {
        if is_supported(version) {
            self.default_version = version;
            Ok(())
        } else {
            Err(UnsupportedVersionError(version))
        }
    }

    /// Returns the supported ASDF Standard versions, oldest first.
    #[must_use]
    pub fn supported_versions(&self) -> &'static [Version] {
        SUPPORTED_VERSIONS
    }

    /// Build an extension manager for ASDF Standard `version` from the installed extensions.
    ///
    /// # Errors
    /// Returns an [`UnsupportedVersionError`] if `version` is not a supported ASDF Standard version.
    pub fn extension_manager(
        &self,
        version: Version,
    ) -> Result<ExtensionManager, UnsupportedVersionError> {
        if is_supported(version) {
            Ok(ExtensionManager::new(&self.extensions, version))
        } else {
            Err(UnsupportedVersionError(version))
        }
    }
}

static CONFIG: OnceLock<RwLock<Arc<Config>>> = OnceLock::new();

thread_local! {
    static CONFIG_OVERRIDES: RefCell<Vec<Arc<Config>>> = const { RefCell::new(Vec::new()) };
}

fn config_lock() -> &'static RwLock<Arc<Config>> {
    CONFIG.get_or_init(|| {
        let config = Config::try_default()
            .unwrap_or_else(|err| panic!("the registered plugins failed to load: {err}"));
        RwLock::new(Arc::new(config))
    })
}

/// Returns the effective asdf_astro configuration.
///
/// This is the innermost [`config_context`] of the current thread, if any, otherwise the global configuration.
///
/// # Panics
/// This function panics if the underlying lock has been poisoned, or if the registered plugins fail to load when the global configuration is first initialised.
pub fn global_config() -> Arc<Config> {
    CONFIG_OVERRIDES
        .with_borrow(|overrides| overrides.last().cloned())
        .unwrap_or_else(|| config_lock().read().unwrap().clone())
}

/// A write guard over the global configuration.
pub struct GlobalConfigGuard(RwLockWriteGuard<'static, Arc<Config>>);

impl Deref for GlobalConfigGuard {
    type Target = Config;

    fn deref(&self) -> &Config {
        &self.0
    }
}

impl DerefMut for GlobalConfigGuard {
    fn deref_mut(&mut self) -> &mut Config {
        Arc::make_mut(&mut self.0)
    }
}

/// Returns a mutable reference to the global asdf_astro configuration.
///
/// Modifications do not affect snapshots already returned by [`global_config`], or an active [`config_context`].
///
/// # Panics
/// This function panics if the underlying lock has been poisoned and might panic if the global config is already held by the current thread.
/// It also panics if the registered plugins fail to load when the global configuration is first initialised.
pub fn global_config_mut() -> GlobalConfigGuard {
    GlobalConfigGuard(config_lock().write().unwrap())
}

/// A scoped configuration override, see [`config_context`].
#[must_use = "the configuration is restored when the guard is dropped"]
pub struct ConfigContext {
    depth: usize,
    _not_send: PhantomData<*const ()>,
}

impl Drop for ConfigContext {
    fn drop(&mut self) {
        CONFIG_OVERRIDES.with_borrow_mut(|overrides| overrides.truncate(self.depth));
    }
}

/// Install `config` as the effective configuration of the current thread until the returned guard is dropped.
///
/// The previous configuration is restored when the guard is dropped, including when a panic unwinds through its scope.
/// Contexts nest.
pub fn config_context(config: Config) -> ConfigContext {
    let depth = CONFIG_OVERRIDES.with_borrow_mut(|overrides| {
        overrides.push(Arc::new(config));
        overrides.len() - 1
    });
    ConfigContext {
        depth,
        _not_send: PhantomData,
    }
}

#[cfg(test)]
mod tests {
    use asdf_astro_plugin::ManifestExtension;
    use asdf_astro_registry::Manifest;

    use super::*;

    fn test_extension(extension_uri: &str) -> Arc<dyn Extension> {
        let manifest = Manifest {
            id: format!("{extension_uri}/manifest"),
            extension_uri: extension_uri.to_string(),
            title: None,
            description: None,
            asdf_standard_requirement: asdf_astro_registry::VersionRequirement::at_least(
                Version::new(1, 0, 0),
            ),
            tags: Vec::new(),
        };
        Arc::new(ManifestExtension::from_manifest(manifest, Vec::new()))
    }

    #[test]
    fn config_default() {
        let config = Config::try_default().unwrap();
        assert_eq!(config.default_version(), Version::new(1, 5, 0));
        assert_eq!(
            config.extensions()[0].extension_uri(),
            "asdf://astropy.org/astropy/extensions/astropy-1.0.0"
        );
        assert_eq!(config.supported_versions().len(), 7);
    }

    #[test]
    fn config_default_version() {
        let mut config = Config::empty();
        assert!(config.set_default_version(Version::new(1, 6, 0)).is_ok());
        assert_eq!(
            config.set_default_version(Version::new(2, 0, 0)),
            Err(UnsupportedVersionError(Version::new(2, 0, 0)))
        );
        assert_eq!(config.default_version(), Version::new(1, 6, 0));
        assert!(config.extension_manager(Version::new(0, 9, 0)).is_err());
    }

    #[test]
    fn config_add_remove_extension() {
        let mut config = Config::empty();
        config.add_extension(test_extension("asdf://example.org/extensions/a-1.0.0"));
        config.add_extension(test_extension("asdf://example.org/extensions/b-1.0.0"));
        config.add_extension(test_extension("asdf://example.org/extensions/a-1.0.0"));
        let uris = config
            .extensions()
            .iter()
            .map(|extension| extension.extension_uri())
            .collect_vec();
        assert_eq!(
            uris,
            [
                "asdf://example.org/extensions/b-1.0.0",
                "asdf://example.org/extensions/a-1.0.0"
            ]
        );
        assert!(config
            .remove_extension("asdf://example.org/extensions/a-1.0.0")
            .is_some());
        assert!(config
            .remove_extension("asdf://example.org/extensions/a-1.0.0")
            .is_none());
        assert_eq!(config.extensions().len(), 1);
    }

    #[test]
    fn config_context_nested() {
        let outer = global_config();
        {
            let _first = config_context(Config::empty());
            assert!(global_config().extensions().is_empty());
            {
                let mut second = Config::empty();
                second.add_extension(test_extension("asdf://example.org/extensions/c-1.0.0"));
                let _second = config_context(second);
                assert_eq!(global_config().extensions().len(), 1);
            }
            assert!(global_config().extensions().is_empty());
        }
        assert_eq!(global_config().extensions().len(), outer.extensions().len());
    }
}
