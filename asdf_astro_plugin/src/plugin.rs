use std::sync::Arc;

use thiserror::Error;

use crate::{Extension, ExtensionBuildError, ResourceManager, ResourceMapping};

/// A plugin.
///
/// Plugins are registered at compile time with [`inventory::submit!`] and collected when the configuration is created.
/// Plugins are sorted by priority (highest first) and then identifier, so discovery order never depends on link order.
pub struct Plugin<TPlugin, TInputs> {
    /// The identifier of the plugin.
    identifier: &'static str,
    /// The priority of the plugin.
    priority: i32,
    /// Create an implementation of this plugin from inputs.
    create_fn: fn(inputs: &TInputs) -> Result<TPlugin, PluginCreateError>,
}

/// A plugin creation error.
#[derive(Error, Debug)]
pub enum PluginCreateError {
    /// An extension failed to build.
    #[error(transparent)]
    ExtensionBuild(#[from] ExtensionBuildError),
    /// Other
    #[error("{_0}")]
    Other(String),
}

impl From<&str> for PluginCreateError {
    fn from(err_string: &str) -> Self {
        Self::Other(err_string.to_string())
    }
}

impl From<String> for PluginCreateError {
    fn from(err_string: String) -> Self {
        Self::Other(err_string)
    }
}

impl<TPlugin, TInputs> Plugin<TPlugin, TInputs> {
    /// Create a new plugin for registration.
    pub const fn new(
        identifier: &'static str,
        priority: i32,
        create_fn: fn(inputs: &TInputs) -> Result<TPlugin, PluginCreateError>,
    ) -> Self {
        Self {
            identifier,
            priority,
            create_fn,
        }
    }

    /// Create a `TPlugin` plugin from `inputs`.
    ///
    /// # Errors
    /// Returns a [`PluginCreateError`] if plugin creation fails.
    pub fn create(&self, inputs: &TInputs) -> Result<TPlugin, PluginCreateError> {
        (self.create_fn)(inputs)
    }

    /// Returns the identifier of the plugin.
    #[must_use]
    pub const fn identifier(&self) -> &'static str {
        self.identifier
    }

    /// Returns the priority of the plugin.
    #[must_use]
    pub const fn priority(&self) -> i32 {
        self.priority
    }
}

/// A plugin providing extensions, highest priority first.
pub type ExtensionPlugin = Plugin<Vec<Arc<dyn Extension>>, ResourceManager>;
inventory::collect!(ExtensionPlugin);

/// A plugin providing resources such as manifests.
pub type ResourceMappingPlugin = Plugin<ResourceMapping, ()>;
inventory::collect!(ResourceMappingPlugin);

fn sort_plugins<TPlugin, TInputs>(plugins: &mut [&Plugin<TPlugin, TInputs>]) {
    plugins.sort_by(|a, b| {
        b.priority
            .cmp(&a.priority)
            .then_with(|| a.identifier.cmp(b.identifier))
    });
}

/// Returns the registered [`ExtensionPlugin`]s, highest priority first.
#[must_use]
pub fn extension_plugins() -> Vec<&'static ExtensionPlugin> {
    let mut plugins = inventory::iter::<ExtensionPlugin>.into_iter().collect::<Vec<_>>();
    sort_plugins(&mut plugins);
    plugins
}

/// Returns the registered [`ResourceMappingPlugin`]s, highest priority first.
#[must_use]
pub fn resource_mapping_plugins() -> Vec<&'static ResourceMappingPlugin> {
    let mut plugins = inventory::iter::<ResourceMappingPlugin>
        .into_iter()
        .collect::<Vec<_>>();
    sort_plugins(&mut plugins);
    plugins
}

#[cfg(test)]
mod tests {
    use super::*;

    struct TestPlugin;

    fn create_test(input: &String) -> Result<TestPlugin, PluginCreateError> {
        if input == "test" {
            Ok(TestPlugin)
        } else {
            Err(PluginCreateError::from("invalid input"))
        }
    }

    #[test]
    fn plugin() {
        let plugin = Plugin::new("test", 10, create_test);
        assert_eq!(plugin.identifier(), "test");
        assert_eq!(plugin.priority(), 10);
        assert!(plugin.create(&"test".to_string()).is_ok());
        assert!(plugin.create(&"fail".to_string()).is_err());
    }

    fn create_mapping(_: &()) -> Result<ResourceMapping, PluginCreateError> {
        Ok(ResourceMapping::new().with_resource("asdf://example.org/plugin-test", "content"))
    }

    inventory::submit! {
        ResourceMappingPlugin::new("plugin-test-low", -100, create_mapping)
    }

    inventory::submit! {
        ResourceMappingPlugin::new("plugin-test-high", 100, create_mapping)
    }

    #[test]
    fn plugins_sorted_by_priority() {
        let identifiers = resource_mapping_plugins()
            .into_iter()
            .map(ResourceMappingPlugin::identifier)
            .filter(|identifier| identifier.starts_with("plugin-test"))
            .collect::<Vec<_>>();
        assert_eq!(identifiers, ["plugin-test-high", "plugin-test-low"]);
    }
}
