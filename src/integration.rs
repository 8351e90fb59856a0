//! Plugin registration of the built-in resources and extensions.
//!
//! The resources are registered as a [`ResourceMappingPlugin`] and the extensions as an [`ExtensionPlugin`],
//! both with identifier `asdf_astro` and priority 0.
//! Other crates can register plugins with a higher priority to take precedence.

use std::sync::Arc;

use asdf_astro_plugin::{
    Extension, ExtensionPlugin, PluginCreateError, ResourceManager, ResourceMapping,
    ResourceMappingPlugin,
};
use asdf_astro_registry::builtin_resources;

use crate::extensions::builtin_extensions;

/// The identifier of the built-in plugins.
pub const PLUGIN_IDENTIFIER: &str = "asdf_astro";

/// Returns the built-in manifests as a resource mapping.
#[must_use]
pub fn get_resource_mappings() -> ResourceMapping {
    builtin_resources().iter().copied().collect()
}

/// Returns the built-in extensions, highest priority first.
///
/// # Errors
/// Returns a [`PluginCreateError`] if a manifest is missing from `resources` or an extension fails to build.
pub fn get_extensions(
    resources: &ResourceManager,
) -> Result<Vec<Arc<dyn Extension>>, PluginCreateError> {
    Ok(builtin_extensions(resources)?)
}

fn create_resource_mapping(_: &()) -> Result<ResourceMapping, PluginCreateError> {
    Ok(get_resource_mappings())
}

inventory::submit! {
    ResourceMappingPlugin::new(PLUGIN_IDENTIFIER, 0, create_resource_mapping)
}

inventory::submit! {
    ExtensionPlugin::new(PLUGIN_IDENTIFIER, 0, get_extensions)
}
