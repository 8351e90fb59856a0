//! The converter and extension API for the [`asdf_astro`] crate.
//!
//! A [`Converter`] maps runtime values ([`AstroObject`]) to and from nodes of a document tree ([`Node`]) under versioned tags.
//! An [`Extension`] bundles converters with the tags listed in a manifest, and an [`ExtensionManager`] resolves the one converter responsible for a runtime type or a tag for a given ASDF Standard version.
//!
//! Reading a value is a two-phase process.
//! [`Converter::from_node`] constructs the value from everything except its *deferred* fields (such as a model inverse, which may refer back to the value itself), and [`Converter::finish_from_node`] completes it once the rest of the document is resolved.
//!
//! Extensions and resources are registered at compile time with the [`inventory`](https://docs.rs/inventory/latest/inventory/) crate, see [`ExtensionPlugin`] and [`ResourceMappingPlugin`].
//!
//! ## Licence
//! `asdf_astro_plugin` is licensed under either of
//!  - the Apache License, Version 2.0 <http://www.apache.org/licenses/LICENSE-2.0> or
//!  - the MIT license <http://opensource.org/licenses/MIT>, at your option.
//!
//! [`asdf_astro`]: https://docs.rs/asdf_astro/latest/asdf_astro/index.html

mod context;
mod converter;
mod error;
mod extension;
mod extension_manager;
mod node;
mod object;
mod plugin;
mod resource;

pub use context::SerializationContext;
pub use converter::{newest_tag, Construct, Converter};
pub use error::{ConvertError, ExtensionBuildError};
pub use extension::{CompoundExtension, Extension, ManifestExtension};
pub use extension_manager::{ConverterProxy, ExtensionManager};
pub use node::{Node, NodeMap, NodeMapExt, TaggedNode};
pub use object::{AstroObject, ObjectRef};
pub use plugin::{
    extension_plugins, resource_mapping_plugins, ExtensionPlugin, Plugin, PluginCreateError,
    ResourceMappingPlugin,
};
pub use resource::{ResourceManager, ResourceMapping};

pub use asdf_astro_registry::{Tag, TagPattern, Version};
