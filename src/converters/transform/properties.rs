use asdf_astro_plugin::{
    AstroObject, Construct, ConvertError, Converter, Node, NodeMap, NodeMapExt, ObjectRef,
    SerializationContext, Tag,
};
use asdf_astro_registry::tags::transform;
use indexmap::IndexMap;

use crate::{
    converters::{complete, downcast},
    values::{BoundingBoxBuilder, CompoundBoundingBox, Interval, ModelBoundingBox, Order},
};

fn ignored_from_node(node: &mut NodeMap) -> Result<Vec<String>, ConvertError> {
    node.optional("ignore")
        .map(|ignored| ignored.to_string_vec())
        .transpose()
        .map(Option::unwrap_or_default)
}

fn order_from_node(node: &mut NodeMap) -> Result<Order, ConvertError> {
    node.optional_string("order")?
        .map_or(Ok(Order::default()), |order| Order::parse(&order))
}

fn model_bounding_box_to_node(bounding_box: &ModelBoundingBox) -> NodeMap {
    let intervals: NodeMap = bounding_box
        .intervals
        .iter()
        .map(|(name, (lower, upper))| (name.clone(), Node::from_f64s(&[*lower, *upper])))
        .collect();
    let mut node = NodeMap::new();
    node.insert("intervals".to_string(), Node::Mapping(intervals));
    node.insert("ignore".to_string(), Node::from_strs(&bounding_box.ignored));
    node.insert("order".to_string(), Node::from(bounding_box.order.to_string()));
    node
}

/// Reads and writes [`ModelBoundingBox`] with the `bounding_box` property tag.
///
/// Reading produces a [`BoundingBoxBuilder`], applied by the converter of the owning model.
#[derive(Debug, Default)]
pub struct ModelBoundingBoxConverter;

impl Converter for ModelBoundingBoxConverter {
    fn name(&self) -> &'static str {
        "ModelBoundingBoxConverter"
    }

    fn tags(&self) -> &[&'static str] {
        &[transform::BOUNDING_BOX]
    }

    fn types(&self) -> &[&'static str] {
        &["astropy.modeling.bounding_box.ModelBoundingBox"]
    }

    fn to_node(
        &self,
        object: &dyn AstroObject,
        _tag: &Tag,
        _ctx: &mut SerializationContext,
    ) -> Result<Node, ConvertError> {
        let bounding_box = downcast::<ModelBoundingBox>(object, self.name())?;
        Ok(Node::Mapping(model_bounding_box_to_node(bounding_box)))
    }

    fn from_node(
        &self,
        node: Node,
        _tag: &Tag,
        _ctx: &mut SerializationContext,
    ) -> Result<Construct, ConvertError> {
        let mut node = node.into_mapping()?;
        let intervals = node
            .required("intervals")?
            .into_mapping()?
            .into_iter()
            .map(|(name, interval)| match interval.to_f64_vec()?.as_slice() {
                [lower, upper] => Ok((name, (*lower, *upper))),
                _ => Err(ConvertError::InvalidNode(format!(
                    "the interval of {name} must have two bounds"
                ))),
            })
            .collect::<Result<IndexMap<String, Interval>, ConvertError>>()?;
        Ok(complete(BoundingBoxBuilder::Model {
            intervals,
            ignored: ignored_from_node(&mut node)?,
            order: order_from_node(&mut node)?,
        }))
    }
}

/// Reads and writes [`CompoundBoundingBox`] with the `compound_bounding_box` property tag.
///
/// Reading produces a [`BoundingBoxBuilder`], applied by the converter of the owning model.
#[derive(Debug, Default)]
pub struct CompoundBoundingBoxConverter;

impl Converter for CompoundBoundingBoxConverter {
    fn name(&self) -> &'static str {
        "CompoundBoundingBoxConverter"
    }

    fn tags(&self) -> &[&'static str] {
        &[transform::COMPOUND_BOUNDING_BOX]
    }

    fn types(&self) -> &[&'static str] {
        &["astropy.modeling.bounding_box.CompoundBoundingBox"]
    }

    fn to_node(
        &self,
        object: &dyn AstroObject,
        _tag: &Tag,
        _ctx: &mut SerializationContext,
    ) -> Result<Node, ConvertError> {
        let bounding_box = downcast::<CompoundBoundingBox>(object, self.name())?;
        let selector_args = bounding_box
            .selector_args
            .iter()
            .map(|selector| {
                let mut node = NodeMap::new();
                node.insert("argument".to_string(), Node::from(selector.argument.as_str()));
                node.insert("ignore".to_string(), Node::Bool(selector.ignore));
                Node::Mapping(node)
            })
            .collect();
        let cbbox = bounding_box
            .bounding_boxes
            .iter()
            .map(|(key, model_bounding_box)| {
                let mut node = NodeMap::new();
                node.insert("key".to_string(), Node::Sequence(key.clone()));
                node.insert(
                    "bbox".to_string(),
                    Node::Object(ObjectRef::new(model_bounding_box.clone())),
                );
                Node::Mapping(node)
            })
            .collect();
        let mut node = NodeMap::new();
        node.insert("selector_args".to_string(), Node::Sequence(selector_args));
        node.insert("cbbox".to_string(), Node::Sequence(cbbox));
        node.insert("ignore".to_string(), Node::from_strs(&bounding_box.ignored));
        node.insert("order".to_string(), Node::from(bounding_box.order.to_string()));
        Ok(Node::Mapping(node))
    }

    fn from_node(
        &self,
        node: Node,
        _tag: &Tag,
        _ctx: &mut SerializationContext,
    ) -> Result<Construct, ConvertError> {
        let mut node = node.into_mapping()?;
        let selector_args = node
            .required("selector_args")?
            .into_sequence()?
            .into_iter()
            .map(|selector| {
                let mut selector = selector.into_mapping()?;
                let argument = selector.required("argument")?;
                let ignore = selector.required("ignore")?.as_bool().ok_or_else(|| {
                    ConvertError::InvalidNode("ignore must be a boolean".to_string())
                })?;
                Ok((argument, ignore))
            })
            .collect::<Result<Vec<_>, ConvertError>>()?;
        let entries = node
            .required("cbbox")?
            .into_sequence()?
            .into_iter()
            .map(|entry| {
                let mut entry = entry.into_mapping()?;
                let key = match entry.required("key")? {
                    Node::Sequence(key) => key,
                    key => vec![key],
                };
                Ok((key, entry.required_object("bbox")?))
            })
            .collect::<Result<Vec<_>, ConvertError>>()?;
        Ok(complete(BoundingBoxBuilder::Compound {
            selector_args,
            entries,
            ignored: ignored_from_node(&mut node)?,
            order: order_from_node(&mut node)?,
        }))
    }
}
