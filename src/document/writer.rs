use std::collections::{HashMap, HashSet};

use asdf_astro_plugin::{
    ConvertError, ExtensionManager, Node, NodeMap, ObjectRef, SerializationContext, TaggedNode,
};

use super::DocumentError;

enum ObjectState {
    /// The value is being written with an anchor, starting at a deferred field depth.
    ///
    /// It may only be referenced through a deferred field entered after that depth.
    InProgress(String, usize),
    /// The value has been written with an anchor.
    Emitted(String),
}

/// Converts the runtime values of a tree into tagged nodes.
pub(super) struct TreeWriter<'a> {
    manager: &'a ExtensionManager,
    ctx: &'a mut SerializationContext,
    states: HashMap<usize, ObjectState>,
    aliased: HashSet<String>,
    deferred_depth: usize,
    // Keeps written values alive so their identifiers are not reused.
    written: Vec<ObjectRef>,
}

impl<'a> TreeWriter<'a> {
    pub(super) fn new(manager: &'a ExtensionManager, ctx: &'a mut SerializationContext) -> Self {
        Self {
            manager,
            ctx,
            states: HashMap::new(),
            aliased: HashSet::new(),
            deferred_depth: 0,
            written: Vec::new(),
        }
    }

    /// Write `tree`, anchoring only values that are aliased.
    pub(super) fn write(mut self, tree: &Node) -> Result<Node, DocumentError> {
        let mut tree = self.write_node(tree)?;
        let mut renamed = HashMap::new();
        rename_anchors(&mut tree, &self.aliased, &mut renamed);
        Ok(tree)
    }

    fn write_node(&mut self, node: &Node) -> Result<Node, DocumentError> {
        Ok(match node {
            Node::Object(object) => self.write_object(object)?,
            Node::Sequence(items) => Node::Sequence(
                items
                    .iter()
                    .map(|item| self.write_node(item))
                    .collect::<Result<_, _>>()?,
            ),
            Node::Mapping(map) => Node::Mapping(self.write_mapping(map, &[])?),
            Node::Tagged(tagged) => Node::Tagged(Box::new(TaggedNode {
                tag: tagged.tag.clone(),
                anchor: None,
                value: self.write_node(&tagged.value)?,
            })),
            other => other.clone(),
        })
    }

    fn write_mapping(&mut self, map: &NodeMap, skip: &[&str]) -> Result<NodeMap, DocumentError> {
        map.iter()
            .map(|(key, value)| {
                let value = if skip.contains(&key.as_str()) {
                    Node::Null
                } else {
                    self.write_node(value)?
                };
                Ok((key.clone(), value))
            })
            .collect()
    }

    fn write_object(&mut self, object: &ObjectRef) -> Result<Node, DocumentError> {
        match self.states.get(&object.id()) {
            Some(ObjectState::Emitted(anchor)) => {
                self.aliased.insert(anchor.clone());
                return Ok(Node::Alias(anchor.clone()));
            }
            Some(ObjectState::InProgress(anchor, depth)) if self.deferred_depth > *depth => {
                self.aliased.insert(anchor.clone());
                return Ok(Node::Alias(anchor.clone()));
            }
            Some(ObjectState::InProgress(..)) => {
                return Err(self.write_error(
                    object.type_key(),
                    ConvertError::Other(
                        "the value refers to itself outside of a deferred field".to_string(),
                    ),
                ));
            }
            None => {}
        }

        let anchor = format!("id{:03}", self.written.len() + 1);
        self.states.insert(
            object.id(),
            ObjectState::InProgress(anchor.clone(), self.deferred_depth),
        );
        self.written.push(object.clone());

        let (proxy, tag, node) = {
            let guard = object.read();
            let type_key = guard.type_key();
            let proxy = self
                .manager
                .converter_for_type(&*guard)
                .map_err(|err| self.write_error(type_key, err))?
                .clone();
            let tag = proxy
                .select_tag(&*guard, &*self.ctx)
                .map_err(|err| self.write_error(type_key, err))?;
            let node = proxy
                .to_node(&*guard, &tag, &mut *self.ctx)
                .map_err(|err| self.write_error(type_key, err))?;
            (proxy, tag, node)
        };
        self.ctx.mark_extension_used(proxy.extension_uri());

        // Deferred fields may refer back to this value, so they are written after it is anchored.
        let deferred = proxy.deferred_keys(&tag);
        let value = match node {
            Node::Mapping(map) => {
                let mut value = self.write_mapping(&map, deferred)?;
                self.emitted(object, anchor.clone());
                self.deferred_depth += 1;
                let fields = deferred
                    .iter()
                    .filter_map(|key| map.get(*key).map(|field| (*key, field)))
                    .map(|(key, field)| Ok((key.to_string(), self.write_node(field)?)))
                    .collect::<Result<Vec<_>, DocumentError>>();
                self.deferred_depth -= 1;
                value.extend(fields?);
                Node::Mapping(value)
            }
            node => {
                let value = self.write_node(&node)?;
                self.emitted(object, anchor.clone());
                value
            }
        };

        Ok(Node::Tagged(Box::new(TaggedNode {
            tag: tag.as_str().to_string(),
            anchor: Some(anchor),
            value,
        })))
    }

    fn emitted(&mut self, object: &ObjectRef, anchor: String) {
        self.states.insert(object.id(), ObjectState::Emitted(anchor));
    }

    fn write_error(&self, type_key: &str, source: ConvertError) -> DocumentError {
        DocumentError::Write {
            type_key: type_key.to_string(),
            version: self.manager.version(),
            source,
        }
    }
}

/// Remove unused anchors and number the rest in document order.
fn rename_anchors(
    node: &mut Node,
    aliased: &HashSet<String>,
    renamed: &mut HashMap<String, String>,
) {
    match node {
        Node::Tagged(tagged) => {
            if let Some(anchor) = tagged.anchor.take() {
                if aliased.contains(&anchor) {
                    let new_anchor = format!("id{:03}", renamed.len() + 1);
                    renamed.insert(anchor, new_anchor.clone());
                    tagged.anchor = Some(new_anchor);
                }
            }
            rename_anchors(&mut tagged.value, aliased, renamed);
        }
        Node::Alias(anchor) => {
            if let Some(new_anchor) = renamed.get(anchor.as_str()) {
                anchor.clone_from(new_anchor);
            }
        }
        Node::Sequence(items) => {
            for item in items {
                rename_anchors(item, aliased, renamed);
            }
        }
        Node::Mapping(map) => {
            for value in map.values_mut() {
                rename_anchors(value, aliased, renamed);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use asdf_astro_plugin::{node_map, TagPattern};
    use asdf_astro_registry::tags::unit;

    use super::*;
    use crate::{
        config::global_config,
        values::{Quantity, Unit},
    };

    #[test]
    fn writer_anchors_only_aliased_values() {
        let manager = global_config()
            .extension_manager(asdf_astro_registry::Version::new(1, 5, 0))
            .unwrap();
        let mut ctx = SerializationContext::new(manager.version());
        let shared = ObjectRef::new(Quantity::new(1.0, Unit::parse("m").unwrap()));
        let single = ObjectRef::new(Quantity::new(2.0, Unit::parse("s").unwrap()));
        let tree = Node::Mapping(node_map! {
            "single" => single,
            "shared" => shared.clone(),
            "again" => shared,
        });
        let tree = TreeWriter::new(&manager, &mut ctx).write(&tree).unwrap();
        let tree = tree.as_mapping().unwrap();

        let Node::Tagged(single) = &tree["single"] else {
            panic!("expected a tagged node");
        };
        assert!(TagPattern::new(unit::QUANTITY).matches(&single.tag));
        assert_eq!(single.anchor, None);
        let Node::Tagged(shared) = &tree["shared"] else {
            panic!("expected a tagged node");
        };
        assert_eq!(shared.anchor.as_deref(), Some("id001"));
        assert_eq!(tree["again"], Node::Alias("id001".to_string()));
        assert!(ctx.extensions_used().next().is_some());
    }

    #[test]
    fn writer_type_not_serializable() {
        let config = crate::config::Config::empty();
        let manager = config
            .extension_manager(asdf_astro_registry::Version::new(1, 5, 0))
            .unwrap();
        let mut ctx = SerializationContext::new(manager.version());
        let tree = Node::Object(ObjectRef::new(Quantity::new(
            1.0,
            Unit::parse("m").unwrap(),
        )));
        let err = TreeWriter::new(&manager, &mut ctx).write(&tree).unwrap_err();
        assert!(matches!(
            err,
            DocumentError::Write {
                source: ConvertError::TypeNotSerializable { .. },
                ..
            }
        ));
    }
}
