use std::{collections::HashMap, sync::Arc};

use asdf_astro_registry::{Tag, TagPattern, Version};
use itertools::Itertools;

use crate::{
    AstroObject, Construct, ConvertError, Converter, Extension, Node, NodeMap, ObjectRef,
    SerializationContext,
};

/// A converter bound to the tags of one extension.
pub struct ConverterProxy {
    converter: Arc<dyn Converter>,
    tags: Vec<Tag>,
    extension_uri: String,
}

impl ConverterProxy {
    /// Bind `converter` to the `extension` tags matched by its patterns.
    ///
    /// Returns [`None`] if no tag matches, in which case the converter is inactive in the extension.
    fn new(converter: Arc<dyn Converter>, extension: &dyn Extension) -> Option<Self> {
        let patterns = converter
            .tags()
            .iter()
            .map(|pattern| TagPattern::new(pattern))
            .collect_vec();
        let tags = extension
            .tags()
            .into_iter()
            .filter(|definition| patterns.iter().any(|p| p.matches(&definition.tag_uri)))
            .filter_map(|definition| Tag::parse(&definition.tag_uri).ok())
            .collect_vec();
        if tags.is_empty() {
            log::debug!(
                "converter {} has no tags in extension {}",
                converter.name(),
                extension.extension_uri()
            );
            None
        } else {
            Some(Self {
                converter,
                tags,
                extension_uri: extension.extension_uri().to_string(),
            })
        }
    }

    /// Returns the underlying converter.
    #[must_use]
    pub fn converter(&self) -> &Arc<dyn Converter> {
        &self.converter
    }

    /// Returns the candidate tags, in manifest order.
    #[must_use]
    pub fn tags(&self) -> &[Tag] {
        &self.tags
    }

    /// Returns the URI of the extension the converter belongs to.
    #[must_use]
    pub fn extension_uri(&self) -> &str {
        &self.extension_uri
    }

    /// Select the tag to write `object` with.
    ///
    /// # Errors
    /// Returns a [`ConvertError`] if the converter fails to select a tag, or selects a tag that is not a candidate.
    pub fn select_tag(
        &self,
        object: &dyn AstroObject,
        ctx: &SerializationContext,
    ) -> Result<Tag, ConvertError> {
        let tag = if let [tag] = self.tags.as_slice() {
            tag.clone()
        } else {
            let tag = self.converter.select_tag(object, &self.tags, ctx)?;
            if !self.tags.contains(&tag) {
                return Err(ConvertError::Other(format!(
                    "converter {} selected tag {tag} which is not supported by extension {}",
                    self.converter.name(),
                    self.extension_uri
                )));
            }
            tag
        };
        log::trace!("selected tag {tag} for {}", object.type_key());
        Ok(tag)
    }

    /// Convert `object` to a node, see [`Converter::to_node`].
    ///
    /// # Errors
    /// Returns a [`ConvertError`] if conversion fails.
    pub fn to_node(
        &self,
        object: &dyn AstroObject,
        tag: &Tag,
        ctx: &mut SerializationContext,
    ) -> Result<Node, ConvertError> {
        self.converter.to_node(object, tag, ctx)
    }

    /// See [`Converter::deferred_keys`].
    #[must_use]
    pub fn deferred_keys(&self, tag: &Tag) -> &'static [&'static str] {
        self.converter.deferred_keys(tag)
    }

    /// Construct a value from a node, see [`Converter::from_node`].
    ///
    /// # Errors
    /// Returns a [`ConvertError`] if construction fails.
    pub fn from_node(
        &self,
        node: Node,
        tag: &Tag,
        ctx: &mut SerializationContext,
    ) -> Result<Construct, ConvertError> {
        self.converter.from_node(node, tag, ctx)
    }

    /// Complete a deferred value, see [`Converter::finish_from_node`].
    ///
    /// # Errors
    /// Returns a [`ConvertError`] if a deferred field is invalid.
    pub fn finish_from_node(
        &self,
        object: &ObjectRef,
        deferred: NodeMap,
        tag: &Tag,
        ctx: &mut SerializationContext,
    ) -> Result<(), ConvertError> {
        self.converter.finish_from_node(object, deferred, tag, ctx)
    }
}

/// Resolves the converter responsible for a runtime type or a tag.
///
/// An extension manager is built for one ASDF Standard version from the installed extensions in priority order.
/// Only extensions supporting the version are enabled.
/// When more than one converter claims a type or tag, the first registered wins.
///
/// An extension manager is immutable once built.
pub struct ExtensionManager {
    version: Version,
    extensions: Vec<Arc<dyn Extension>>,
    extensions_by_id: HashMap<String, Arc<dyn Extension>>,
    converters_by_tag: HashMap<String, Arc<ConverterProxy>>,
    converters_by_type: HashMap<&'static str, Arc<ConverterProxy>>,
}

impl std::fmt::Debug for ExtensionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExtensionManager")
            .field("version", &self.version)
            .field(
                "extensions",
                &self
                    .extensions
                    .iter()
                    .map(|extension| extension.extension_uri())
                    .collect::<Vec<_>>(),
            )
            .finish_non_exhaustive()
    }
}

impl ExtensionManager {
    /// Create an extension manager for ASDF Standard `version` from `extensions`, highest priority first.
    #[must_use]
    pub fn new(extensions: &[Arc<dyn Extension>], version: Version) -> Self {
        let mut manager = Self {
            version,
            extensions: Vec::new(),
            extensions_by_id: HashMap::new(),
            converters_by_tag: HashMap::new(),
            converters_by_type: HashMap::new(),
        };
        for extension in extensions {
            if extension.asdf_standard_requirement().matches(version) {
                manager.register(extension);
            } else {
                log::debug!(
                    "extension {} does not support ASDF Standard {version}",
                    extension.extension_uri()
                );
            }
        }
        manager
    }

    fn register(&mut self, extension: &Arc<dyn Extension>) {
        self.extensions.push(extension.clone());
        let ids = std::iter::once(extension.extension_uri())
            .chain(extension.legacy_class_names().iter().map(String::as_str));
        for id in ids {
            self.extensions_by_id
                .entry(id.to_string())
                .or_insert_with(|| extension.clone());
        }

        for converter in extension.converters() {
            let Some(proxy) = ConverterProxy::new(converter, extension.as_ref()) else {
                continue;
            };
            let proxy = Arc::new(proxy);
            for tag in &proxy.tags {
                if let Some(existing) = self.converters_by_tag.get(tag.as_str()) {
                    log::debug!(
                        "tag {tag} of {} is already handled by {} from {}",
                        proxy.converter.name(),
                        existing.converter.name(),
                        existing.extension_uri
                    );
                } else {
                    self.converters_by_tag
                        .insert(tag.as_str().to_string(), proxy.clone());
                }
            }
            for type_key in proxy.converter.types() {
                if let Some(existing) = self.converters_by_type.get(type_key) {
                    log::debug!(
                        "type {type_key} of {} is already handled by {} from {}",
                        proxy.converter.name(),
                        existing.converter.name(),
                        existing.extension_uri
                    );
                } else {
                    self.converters_by_type.insert(*type_key, proxy.clone());
                }
            }
        }
    }

    /// Returns the ASDF Standard version.
    #[must_use]
    pub const fn version(&self) -> Version {
        self.version
    }

    /// Returns the enabled extensions, highest priority first.
    #[must_use]
    pub fn extensions(&self) -> &[Arc<dyn Extension>] {
        &self.extensions
    }

    /// Returns the enabled extension with an extension URI or legacy class name of `id`.
    #[must_use]
    pub fn extension(&self, id: &str) -> Option<&Arc<dyn Extension>> {
        self.extensions_by_id.get(id)
    }

    /// Returns true if an enabled extension has an extension URI or legacy class name of `id`.
    #[must_use]
    pub fn handles_extension(&self, id: &str) -> bool {
        self.extensions_by_id.contains_key(id)
    }

    /// Returns true if a converter handles `tag`.
    #[must_use]
    pub fn handles_tag(&self, tag: &str) -> bool {
        self.converters_by_tag.contains_key(tag)
    }

    /// Returns true if a converter handles `type_key`, or one of `ancestors`.
    #[must_use]
    pub fn handles_type(&self, type_key: &str, ancestors: &[&str]) -> bool {
        std::iter::once(type_key)
            .chain(ancestors.iter().copied())
            .any(|key| self.converters_by_type.contains_key(key))
    }

    /// Returns the converter for `object`.
    ///
    /// The exact type is searched first, then its ancestors nearest first.
    ///
    /// # Errors
    /// Returns [`ConvertError::TypeNotSerializable`] if no converter handles the type.
    pub fn converter_for_type(
        &self,
        object: &dyn AstroObject,
    ) -> Result<&Arc<ConverterProxy>, ConvertError> {
        std::iter::once(object.type_key())
            .chain(object.type_ancestors().iter().copied())
            .find_map(|key| self.converters_by_type.get(key))
            .ok_or_else(|| ConvertError::TypeNotSerializable {
                type_key: object.type_key().to_string(),
                version: self.version,
            })
    }

    /// Returns the converter for `tag`.
    ///
    /// # Errors
    /// Returns [`ConvertError::UnknownTag`] if no converter handles the tag.
    pub fn converter_for_tag(&self, tag: &str) -> Result<&Arc<ConverterProxy>, ConvertError> {
        self.converters_by_tag
            .get(tag)
            .ok_or_else(|| ConvertError::UnknownTag(tag.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use asdf_astro_registry::{Manifest, VersionRequirement};

    use super::*;
    use crate::{astro_object, ManifestExtension};

    #[derive(Debug, PartialEq)]
    struct Length(f64);
    astro_object!(Length, "test.Length");

    #[derive(Debug, PartialEq)]
    struct Radius(f64);
    astro_object!(Radius, "test.Radius", ["test.Length"]);

    #[derive(Debug, PartialEq)]
    struct Colour;
    astro_object!(Colour, "test.Colour");

    struct LengthConverter {
        name: &'static str,
        tags: Vec<&'static str>,
    }

    impl Converter for LengthConverter {
        fn name(&self) -> &'static str {
            self.name
        }

        fn tags(&self) -> &[&'static str] {
            &self.tags
        }

        fn types(&self) -> &[&'static str] {
            &["test.Length"]
        }

        fn to_node(
            &self,
            object: &dyn AstroObject,
            _tag: &Tag,
            _ctx: &mut SerializationContext,
        ) -> Result<Node, ConvertError> {
            let length = object.as_any().downcast_ref::<Length>().ok_or("not a length")?;
            Ok(Node::Float(length.0))
        }

        fn from_node(
            &self,
            node: Node,
            _tag: &Tag,
            _ctx: &mut SerializationContext,
        ) -> Result<Construct, ConvertError> {
            Ok(Construct::Complete(ObjectRef::new(Length(node.to_f64()?))))
        }
    }

    fn extension(
        name: &str,
        requirement: &str,
        tags: &[&str],
        converters: Vec<Arc<dyn Converter>>,
    ) -> Arc<dyn Extension> {
        let manifest = Manifest {
            id: format!("asdf://example.org/manifests/{name}"),
            extension_uri: format!("asdf://example.org/extensions/{name}"),
            title: None,
            description: None,
            asdf_standard_requirement: requirement.parse::<VersionRequirement>().unwrap(),
            tags: tags
                .iter()
                .map(|tag| asdf_astro_registry::TagDefinition {
                    tag_uri: (*tag).to_string(),
                    schema_uri: tag.replace("/tags/", "/schemas/"),
                    title: None,
                    description: None,
                })
                .collect(),
        };
        Arc::new(
            ManifestExtension::from_manifest(manifest, converters)
                .with_legacy_class_names([format!("example.{name}")]),
        )
    }

    fn converter(name: &'static str) -> Arc<dyn Converter> {
        Arc::new(LengthConverter {
            name,
            tags: vec!["asdf://example.org/tags/length-*"],
        })
    }

    #[test]
    fn first_registered_wins() {
        let tags = ["asdf://example.org/tags/length-1.0.0"];
        let extensions = [
            extension("a-1.0.0", ">=1.0.0", &tags, vec![converter("a")]),
            extension("b-1.0.0", ">=1.0.0", &tags, vec![converter("b")]),
        ];
        let manager = ExtensionManager::new(&extensions, Version::new(1, 5, 0));
        let proxy = manager.converter_for_type(&Length(1.0)).unwrap();
        assert_eq!(proxy.converter().name(), "a");
        assert_eq!(proxy.extension_uri(), "asdf://example.org/extensions/a-1.0.0");
        let proxy = manager.converter_for_tag(tags[0]).unwrap();
        assert_eq!(proxy.converter().name(), "a");

        let reversed = [extensions[1].clone(), extensions[0].clone()];
        let manager = ExtensionManager::new(&reversed, Version::new(1, 5, 0));
        let proxy = manager.converter_for_type(&Length(1.0)).unwrap();
        assert_eq!(proxy.converter().name(), "b");
    }

    #[test]
    fn requirement_filters_extensions() {
        let extensions = [
            extension(
                "new-1.0.0",
                ">=1.6.0",
                &["asdf://example.org/tags/length-2.0.0"],
                vec![converter("new")],
            ),
            extension(
                "old-1.0.0",
                ">=1.0.0",
                &["asdf://example.org/tags/length-1.0.0"],
                vec![converter("old")],
            ),
        ];
        let manager = ExtensionManager::new(&extensions, Version::new(1, 5, 0));
        assert_eq!(manager.extensions().len(), 1);
        assert!(!manager.handles_tag("asdf://example.org/tags/length-2.0.0"));
        assert!(manager.handles_tag("asdf://example.org/tags/length-1.0.0"));
        assert!(manager.handles_extension("example.old-1.0.0"));
        assert!(manager.extension("asdf://example.org/extensions/new-1.0.0").is_none());

        let manager = ExtensionManager::new(&extensions, Version::new(1, 6, 0));
        let proxy = manager.converter_for_type(&Length(1.0)).unwrap();
        assert_eq!(proxy.converter().name(), "new");
    }

    #[test]
    fn type_lookup_uses_ancestors() {
        let extensions = [extension(
            "a-1.0.0",
            ">=1.0.0",
            &["asdf://example.org/tags/length-1.0.0"],
            vec![converter("a")],
        )];
        let manager = ExtensionManager::new(&extensions, Version::new(1, 5, 0));
        assert!(manager.converter_for_type(&Radius(1.0)).is_ok());
        assert!(manager.handles_type("test.Radius", &["test.Length"]));
        assert!(matches!(
            manager.converter_for_type(&Colour),
            Err(ConvertError::TypeNotSerializable { type_key, version })
                if type_key == "test.Colour" && version == Version::new(1, 5, 0)
        ));
        assert!(matches!(
            manager.converter_for_tag("asdf://example.org/tags/colour-1.0.0"),
            Err(ConvertError::UnknownTag(_))
        ));
    }

    #[test]
    fn select_tag_newest_candidate() {
        let extensions = [extension(
            "a-1.0.0",
            ">=1.0.0",
            &[
                "asdf://example.org/tags/length-1.0.0",
                "asdf://example.org/tags/length-1.1.0",
                "asdf://example.org/tags/width-1.2.0",
            ],
            vec![converter("a")],
        )];
        let manager = ExtensionManager::new(&extensions, Version::new(1, 5, 0));
        let proxy = manager.converter_for_type(&Length(1.0)).unwrap();
        assert_eq!(proxy.tags().len(), 2);
        let ctx = SerializationContext::new(Version::new(1, 5, 0));
        let tag = proxy.select_tag(&Length(1.0), &ctx).unwrap();
        assert_eq!(tag.as_str(), "asdf://example.org/tags/length-1.1.0");
        assert_eq!(proxy.select_tag(&Length(1.0), &ctx).unwrap(), tag);
    }

    #[test]
    fn inactive_converter() {
        let extensions = [extension(
            "a-1.0.0",
            ">=1.0.0",
            &["asdf://example.org/tags/width-1.0.0"],
            vec![converter("a")],
        )];
        let manager = ExtensionManager::new(&extensions, Version::new(1, 5, 0));
        assert!(!manager.handles_type("test.Length", &[]));
    }
}
