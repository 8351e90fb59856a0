use std::{
    collections::{HashMap, HashSet, VecDeque},
    sync::Arc,
};

use asdf_astro_plugin::{
    Construct, ConvertError, ConverterProxy, ExtensionManager, Node, NodeMap, ObjectRef,
    SerializationContext, Tag, TaggedNode,
};

use super::{child_path, AsdfWarning, DocumentError};

/// A value whose deferred fields are applied once the whole tree is read.
struct PendingFinish {
    proxy: Arc<ConverterProxy>,
    object: ObjectRef,
    deferred: NodeMap,
    tag: Tag,
    path: String,
}

impl PendingFinish {
    fn error(&self, source: ConvertError) -> DocumentError {
        DocumentError::DeferredConstruction {
            tag: self.tag.as_str().to_string(),
            path: self.path.clone(),
            source,
        }
    }
}

/// Returns true if `node` contains an alias of any of `anchors`.
fn refers_to(node: &Node, anchors: &HashSet<String>) -> bool {
    match node {
        Node::Alias(anchor) => anchors.contains(anchor),
        Node::Tagged(tagged) => refers_to(&tagged.value, anchors),
        Node::Sequence(items) => items.iter().any(|item| refers_to(item, anchors)),
        Node::Mapping(map) => map.values().any(|value| refers_to(value, anchors)),
        _ => false,
    }
}

/// Converts the tagged nodes of a tree into runtime values.
pub(super) struct TreeReader<'a> {
    manager: &'a ExtensionManager,
    ctx: &'a mut SerializationContext,
    anchors: HashMap<String, Node>,
    // Anchors of values whose immediate fields are being read.
    constructing: HashSet<String>,
    // Values whose unread deferred fields refer to a value that was under construction.
    postponed: VecDeque<PendingFinish>,
    pending: Vec<PendingFinish>,
    warnings: Vec<AsdfWarning>,
}

impl<'a> TreeReader<'a> {
    pub(super) fn new(manager: &'a ExtensionManager, ctx: &'a mut SerializationContext) -> Self {
        Self {
            manager,
            ctx,
            anchors: HashMap::new(),
            constructing: HashSet::new(),
            postponed: VecDeque::new(),
            pending: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Read `tree`, then complete every deferred value exactly once, innermost first.
    ///
    /// Deferred fields that refer back to an enclosing value are read once every value of the
    /// primary pass is anchored.
    pub(super) fn read(mut self, tree: &Node) -> Result<(Node, Vec<AsdfWarning>), DocumentError> {
        let tree = self.read_node(tree, "")?;
        while let Some(postponed) = self.postponed.pop_front() {
            self.read_deferred(postponed)?;
        }
        for mut pending in std::mem::take(&mut self.pending) {
            let deferred = std::mem::take(&mut pending.deferred);
            pending
                .proxy
                .finish_from_node(&pending.object, deferred, &pending.tag, self.ctx)
                .map_err(|source| pending.error(source))?;
        }
        Ok((tree, self.warnings))
    }

    /// Read the raw deferred fields of `pending` and queue it to be finished.
    fn read_deferred(&mut self, mut pending: PendingFinish) -> Result<(), DocumentError> {
        if pending
            .deferred
            .values()
            .any(|value| refers_to(value, &self.constructing))
        {
            self.postponed.push_back(pending);
            return Ok(());
        }
        pending.deferred = self.read_mapping(&pending.deferred, &pending.path)?;
        self.pending.push(pending);
        Ok(())
    }

    fn read_node(&mut self, node: &Node, path: &str) -> Result<Node, DocumentError> {
        Ok(match node {
            Node::Tagged(tagged) => self.read_tagged(tagged, path)?,
            Node::Alias(anchor) => {
                self.anchors
                    .get(anchor)
                    .cloned()
                    .ok_or_else(|| DocumentError::UnresolvedAlias {
                        anchor: anchor.clone(),
                        path: path.to_string(),
                    })?
            }
            Node::Sequence(items) => Node::Sequence(
                items
                    .iter()
                    .enumerate()
                    .map(|(index, item)| self.read_node(item, &child_path(path, index)))
                    .collect::<Result<_, _>>()?,
            ),
            Node::Mapping(map) => Node::Mapping(self.read_mapping(map, path)?),
            other => other.clone(),
        })
    }

    fn read_mapping(&mut self, map: &NodeMap, path: &str) -> Result<NodeMap, DocumentError> {
        map.iter()
            .map(|(key, value)| Ok((key.clone(), self.read_node(value, &child_path(path, key))?)))
            .collect()
    }

    fn read_tagged(&mut self, tagged: &TaggedNode, path: &str) -> Result<Node, DocumentError> {
        let Ok(proxy) = self.manager.converter_for_tag(&tagged.tag) else {
            return self.read_unknown(tagged, path);
        };
        let proxy = proxy.clone();
        let read_error = |source: ConvertError| DocumentError::Read {
            tag: tagged.tag.clone(),
            path: path.to_string(),
            source,
        };
        let tag = Tag::parse(&tagged.tag).map_err(|err| read_error(err.into()))?;

        if let Some(anchor) = &tagged.anchor {
            self.constructing.insert(anchor.clone());
        }
        let deferred_keys = proxy.deferred_keys(&tag);
        let (value, deferred) = match &tagged.value {
            Node::Mapping(map) if !deferred_keys.is_empty() => {
                let (deferred, immediate): (NodeMap, NodeMap) = map
                    .iter()
                    .map(|(key, value)| (key.clone(), value.clone()))
                    .partition(|(key, _)| deferred_keys.contains(&key.as_str()));
                (Node::Mapping(self.read_mapping(&immediate, path)?), deferred)
            }
            value => (self.read_node(value, path)?, NodeMap::new()),
        };

        let construct = proxy
            .from_node(value, &tag, self.ctx)
            .map_err(read_error)?;
        let object = construct.object().clone();
        if let Some(anchor) = &tagged.anchor {
            self.constructing.remove(anchor);
            self.anchors
                .insert(anchor.clone(), Node::Object(object.clone()));
        }

        let pending = PendingFinish {
            proxy,
            object: object.clone(),
            deferred,
            tag,
            path: path.to_string(),
        };
        match construct {
            Construct::Complete(_) if !pending.deferred.is_empty() => {
                Err(pending.error(ConvertError::Other(format!(
                    "{} completed a value with deferred fields",
                    pending.proxy.converter().name()
                ))))
            }
            Construct::Complete(_) => Ok(Node::Object(object)),
            Construct::Deferred(_) => {
                // Deferred fields are read after the anchor is registered, so they may refer back to the value.
                self.read_deferred(pending)?;
                Ok(Node::Object(object))
            }
        }
    }

    fn read_unknown(&mut self, tagged: &TaggedNode, path: &str) -> Result<Node, DocumentError> {
        let warning = AsdfWarning::UnknownTag {
            tag: tagged.tag.clone(),
            path: if path.is_empty() { "/" } else { path }.to_string(),
        };
        log::warn!("{warning}");
        self.warnings.push(warning);

        let node = Node::Tagged(Box::new(TaggedNode {
            tag: tagged.tag.clone(),
            anchor: None,
            value: self.read_node(&tagged.value, path)?,
        }));
        if let Some(anchor) = &tagged.anchor {
            self.anchors.insert(anchor.clone(), node.clone());
        }
        Ok(node)
    }
}

#[cfg(test)]
mod tests {
    use asdf_astro_plugin::node_map;
    use asdf_astro_registry::Version;

    use super::*;
    use crate::config::global_config;

    #[test]
    fn reader_unknown_tag() {
        let manager = global_config()
            .extension_manager(Version::new(1, 5, 0))
            .unwrap();
        let mut ctx = SerializationContext::new(manager.version());
        let unknown = Node::Tagged(Box::new(TaggedNode {
            tag: "asdf://example.org/tags/unknown-1.0.0".to_string(),
            anchor: Some("id001".to_string()),
            value: Node::Mapping(node_map! { "a" => 1_i64 }),
        }));
        let tree = Node::Mapping(node_map! {
            "thing" => unknown,
            "again" => Node::Alias("id001".to_string()),
        });
        let (tree, warnings) = TreeReader::new(&manager, &mut ctx).read(&tree).unwrap();
        assert_eq!(
            warnings,
            [AsdfWarning::UnknownTag {
                tag: "asdf://example.org/tags/unknown-1.0.0".to_string(),
                path: "/thing".to_string()
            }]
        );
        let tree = tree.as_mapping().unwrap();
        assert_eq!(tree["thing"], tree["again"]);
    }

    #[test]
    fn reader_unresolved_alias() {
        let manager = global_config()
            .extension_manager(Version::new(1, 5, 0))
            .unwrap();
        let mut ctx = SerializationContext::new(manager.version());
        let tree = Node::Sequence(vec![Node::Alias("id009".to_string())]);
        assert!(matches!(
            TreeReader::new(&manager, &mut ctx).read(&tree),
            Err(DocumentError::UnresolvedAlias { anchor, path })
                if anchor == "id009" && path == "/0"
        ));
    }
}
