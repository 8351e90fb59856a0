use asdf_astro_registry::Tag;

use crate::{AstroObject, ConvertError, Node, NodeMap, ObjectRef, SerializationContext};

/// The result of the first phase of reading a value.
#[derive(Debug)]
pub enum Construct {
    /// The value is complete.
    Complete(ObjectRef),
    /// The value is partially constructed.
    ///
    /// [`Converter::finish_from_node`] is called exactly once with the deferred fields once the rest of the document is resolved.
    Deferred(ObjectRef),
}

impl Construct {
    /// Returns the constructed value.
    #[must_use]
    pub fn object(&self) -> &ObjectRef {
        match self {
            Self::Complete(object) | Self::Deferred(object) => object,
        }
    }
}

/// A converter between runtime values and tagged nodes.
///
/// A converter declares the tag patterns it can read and write, and the runtime types it can write.
/// The tags it is responsible for in a given extension are the extension's tags that match its patterns.
pub trait Converter: Send + Sync {
    /// A name for logging and error messages.
    fn name(&self) -> &'static str;

    /// The tag patterns handled by the converter.
    fn tags(&self) -> &[&'static str];

    /// The type keys of the runtime values the converter writes.
    ///
    /// A converter without types is read-only.
    fn types(&self) -> &[&'static str];

    /// Select the tag to write `object` with from the `tags` supported by the extension.
    ///
    /// Only called when there is more than one candidate tag.
    /// The default selects the newest version, and the first candidate of equal versions.
    ///
    /// Implementations must not depend on anything other than `object`, `tags` and the context version.
    ///
    /// # Errors
    /// Returns a [`ConvertError`] if `object` cannot be written with any of `tags`.
    fn select_tag(
        &self,
        object: &dyn AstroObject,
        tags: &[Tag],
        ctx: &SerializationContext,
    ) -> Result<Tag, ConvertError> {
        let _ = (object, ctx);
        newest_tag(tags)
            .cloned()
            .ok_or_else(|| ConvertError::Other(format!("{} has no candidate tags", self.name())))
    }

    /// Convert `object` to a node for `tag`.
    ///
    /// Nested convertible values are returned as [`Node::Object`].
    ///
    /// # Errors
    /// Returns a [`ConvertError`] if `object` is not supported or cannot be represented by `tag`.
    fn to_node(
        &self,
        object: &dyn AstroObject,
        tag: &Tag,
        ctx: &mut SerializationContext,
    ) -> Result<Node, ConvertError>;

    /// The mapping keys of a `tag` node whose values are resolved after the rest of the document.
    ///
    /// The deferred fields are removed from the node passed to [`from_node`](Converter::from_node) and passed to [`finish_from_node`](Converter::finish_from_node).
    fn deferred_keys(&self, tag: &Tag) -> &'static [&'static str] {
        let _ = tag;
        &[]
    }

    /// Construct a value from a `tag` node, without its deferred fields.
    ///
    /// Nested convertible values are resolved to [`Node::Object`] before this is called.
    ///
    /// # Errors
    /// Returns a [`ConvertError`] if the node is invalid.
    fn from_node(
        &self,
        node: Node,
        tag: &Tag,
        ctx: &mut SerializationContext,
    ) -> Result<Construct, ConvertError>;

    /// Complete a value returned as [`Construct::Deferred`] with its resolved deferred fields.
    ///
    /// # Errors
    /// Returns a [`ConvertError`] if a deferred field is invalid.
    fn finish_from_node(
        &self,
        object: &ObjectRef,
        deferred: NodeMap,
        tag: &Tag,
        ctx: &mut SerializationContext,
    ) -> Result<(), ConvertError> {
        let _ = (object, tag, ctx);
        if let Some(key) = deferred.keys().next() {
            return Err(ConvertError::InvalidNode(format!(
                "{} does not support deferred field `{key}`",
                self.name()
            )));
        }
        Ok(())
    }
}

/// Returns the tag with the newest version, or the first of equal versions.
#[must_use]
pub fn newest_tag(tags: &[Tag]) -> Option<&Tag> {
    tags.iter()
        .reduce(|newest, tag| if tag.version() > newest.version() { tag } else { newest })
}
