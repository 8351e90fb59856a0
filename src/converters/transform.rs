//! Transform model converters.
//!
//! Most model converters implement [`TransformConverter`] and are wrapped in a [`ModelConverter`],
//! which reads and writes the properties common to every model.

mod compound;
mod mappings;
mod math_functions;
mod polynomial;
mod projections;
mod properties;
mod rotations;
mod simple;
mod spline;
mod tabular;

use asdf_astro_plugin::{
    newest_tag, AstroObject, Construct, ConvertError, Converter, Node, NodeMap, NodeMapExt,
    ObjectRef, SerializationContext, Tag,
};

pub use compound::CompoundConverter;
pub use mappings::{IdentityConverter, RemapAxesConverter, UnitsMappingConverter};
pub use math_functions::MathFunctionsConverter;
pub use polynomial::PolynomialConverter;
pub use projections::{projection_converters, ProjectionConverter};
pub use properties::{CompoundBoundingBoxConverter, ModelBoundingBoxConverter};
pub use rotations::{Rotate3DConverter, RotationSequenceConverter};
pub use simple::{simple_transform_converters, ConstantConverter, SimpleTransformConverter};
pub use spline::SplineConverter;
pub use tabular::TabularConverter;

use super::downcast;
use crate::values::{BoundingBox, BoundingBoxBuilder, Model, ModelBoundingBox};

/// The model properties resolved after the rest of the document.
const DEFERRED_KEYS: &[&str] = &["inverse", "bounding_box", "fixed", "bounds"];

/// The model-specific part of a transform converter.
pub trait TransformConverter: Send + Sync {
    /// See [`Converter::name`].
    fn name(&self) -> &'static str;

    /// See [`Converter::tags`].
    fn tags(&self) -> &[&'static str];

    /// See [`Converter::types`].
    fn types(&self) -> &[&'static str];

    /// Select the tag to write `model` with, see [`Converter::select_tag`].
    ///
    /// # Errors
    /// Returns a [`ConvertError`] if the model cannot be written with any of `tags`.
    fn select_tag(
        &self,
        model: &Model,
        tags: &[Tag],
        ctx: &SerializationContext,
    ) -> Result<Tag, ConvertError> {
        let _ = (model, ctx);
        newest_tag(tags)
            .cloned()
            .ok_or_else(|| ConvertError::Other(format!("{} has no candidate tags", self.name())))
    }

    /// Convert the parameters and structure of `model` to a node.
    ///
    /// # Errors
    /// Returns a [`ConvertError`] if the model cannot be represented by `tag`.
    fn to_node_transform(
        &self,
        model: &Model,
        tag: &Tag,
        ctx: &mut SerializationContext,
    ) -> Result<NodeMap, ConvertError>;

    /// Create a model from the parameters and structure of a node, removing the fields it reads.
    ///
    /// # Errors
    /// Returns a [`ConvertError`] if the node is invalid.
    fn from_node_transform(
        &self,
        node: &mut NodeMap,
        tag: &Tag,
        ctx: &mut SerializationContext,
    ) -> Result<Model, ConvertError>;
}

/// Wraps a [`TransformConverter`], adding the properties common to every model.
///
/// A model node carries `name`, `inputs` and `outputs` when they are not the defaults,
/// the user-supplied `inverse`, the `bounding_box`, and the non-default `fixed` and `bounds` of its parameters.
/// The inverse, bounding box and constraints are deferred, so that an inverse can refer back to its model.
#[derive(Debug)]
pub struct ModelConverter<T>(T);

impl<T: TransformConverter> ModelConverter<T> {
    /// Wrap `converter`.
    pub const fn new(converter: T) -> Self {
        Self(converter)
    }
}

fn bounding_box_to_node(
    bounding_box: &BoundingBox,
    model: &Model,
    ctx: &SerializationContext,
) -> Result<Node, ConvertError> {
    match bounding_box {
        BoundingBox::Model(bounding_box) if !ctx.handles_type(bounding_box.type_key()) => {
            bounding_box.to_legacy_node(model.inputs())
        }
        BoundingBox::Model(bounding_box) => {
            Ok(Node::Object(ObjectRef::new(bounding_box.clone())))
        }
        BoundingBox::Compound(bounding_box) => {
            Ok(Node::Object(ObjectRef::new(bounding_box.clone())))
        }
    }
}

fn constraints_to_node(model: &Model, node: &mut NodeMap) {
    let fixed: NodeMap = model
        .parameters()
        .iter()
        .filter(|(_, parameter)| parameter.fixed)
        .map(|(name, _)| (name.clone(), Node::Bool(true)))
        .collect();
    if !fixed.is_empty() {
        node.insert("fixed".to_string(), Node::Mapping(fixed));
    }
    let bounds: NodeMap = model
        .parameters()
        .iter()
        .filter(|(_, parameter)| parameter.bounds.0.is_some() || parameter.bounds.1.is_some())
        .map(|(name, parameter)| {
            (
                name.clone(),
                Node::Sequence(vec![
                    Node::from(parameter.bounds.0),
                    Node::from(parameter.bounds.1),
                ]),
            )
        })
        .collect();
    if !bounds.is_empty() {
        node.insert("bounds".to_string(), Node::Mapping(bounds));
    }
}

fn bound_from_node(node: &Node) -> Result<Option<f64>, ConvertError> {
    if node.is_null() {
        Ok(None)
    } else {
        node.to_f64().map(Some)
    }
}

impl<T: TransformConverter> Converter for ModelConverter<T> {
    fn name(&self) -> &'static str {
        self.0.name()
    }

    fn tags(&self) -> &[&'static str] {
        self.0.tags()
    }

    fn types(&self) -> &[&'static str] {
        self.0.types()
    }

    fn select_tag(
        &self,
        object: &dyn AstroObject,
        tags: &[Tag],
        ctx: &SerializationContext,
    ) -> Result<Tag, ConvertError> {
        self.0.select_tag(downcast::<Model>(object, self.name())?, tags, ctx)
    }

    fn to_node(
        &self,
        object: &dyn AstroObject,
        tag: &Tag,
        ctx: &mut SerializationContext,
    ) -> Result<Node, ConvertError> {
        let model = downcast::<Model>(object, self.name())?;
        let mut node = self.0.to_node_transform(model, tag, ctx)?;
        node.insert_some("name", model.name());
        if model.has_custom_inputs() {
            node.insert("inputs".to_string(), Node::from_strs(model.inputs()));
        }
        if model.has_custom_outputs() {
            node.insert("outputs".to_string(), Node::from_strs(model.outputs()));
        }
        node.insert_some("inverse", model.inverse().cloned());
        if let Some(bounding_box) = model.bounding_box() {
            node.insert(
                "bounding_box".to_string(),
                bounding_box_to_node(bounding_box, model, ctx)?,
            );
        }
        if !model.is_compound() {
            constraints_to_node(model, &mut node);
        }
        Ok(Node::Mapping(node))
    }

    fn deferred_keys(&self, _tag: &Tag) -> &'static [&'static str] {
        DEFERRED_KEYS
    }

    fn from_node(
        &self,
        node: Node,
        tag: &Tag,
        ctx: &mut SerializationContext,
    ) -> Result<Construct, ConvertError> {
        let mut node = node.into_mapping()?;
        let name = node.optional_string("name")?;
        let inputs = node
            .optional("inputs")
            .map(|inputs| inputs.to_string_vec())
            .transpose()?;
        let outputs = node
            .optional("outputs")
            .map(|outputs| outputs.to_string_vec())
            .transpose()?;
        let mut model = self.0.from_node_transform(&mut node, tag, ctx)?;
        model.set_name(name);
        if let Some(inputs) = inputs {
            model.set_inputs(inputs)?;
        }
        if let Some(outputs) = outputs {
            model.set_outputs(outputs)?;
        }
        Ok(Construct::Deferred(ObjectRef::new(model)))
    }

    fn finish_from_node(
        &self,
        object: &ObjectRef,
        mut deferred: NodeMap,
        tag: &Tag,
        _ctx: &mut SerializationContext,
    ) -> Result<(), ConvertError> {
        let inputs = object
            .downcast_ref::<Model>()
            .map(|model| model.inputs().to_vec())
            .ok_or_else(|| ConvertError::Other(format!("{tag} did not construct a model")))?;

        let inverse = deferred.optional("inverse").map(Node::into_object).transpose()?;
        let bounding_box = match deferred.optional("bounding_box") {
            None => None,
            Some(Node::Object(builder)) => {
                let builder = builder.downcast_ref::<BoundingBoxBuilder>().ok_or_else(|| {
                    ConvertError::InvalidNode(format!(
                        "expected a bounding box, got {}",
                        builder.type_key()
                    ))
                })?;
                Some(builder.build(&inputs)?)
            }
            Some(legacy) => Some(BoundingBox::Model(ModelBoundingBox::from_legacy_node(
                &legacy, &inputs,
            )?)),
        };
        let fixed = deferred
            .optional("fixed")
            .map(Node::into_mapping)
            .transpose()?
            .unwrap_or_default();
        let bounds = deferred
            .optional("bounds")
            .map(Node::into_mapping)
            .transpose()?
            .unwrap_or_default();

        let mut model = object
            .downcast_mut::<Model>()
            .ok_or_else(|| ConvertError::Other(format!("{tag} did not construct a model")))?;
        model.set_inverse(inverse)?;
        model.set_bounding_box(bounding_box)?;
        for (name, fixed) in fixed {
            let fixed = fixed.as_bool().ok_or_else(|| {
                ConvertError::InvalidNode(format!("fixed {name} is not a boolean"))
            })?;
            model
                .parameter_mut(&name)
                .ok_or_else(|| ConvertError::InvalidNode(format!("{tag} has no parameter {name}")))?
                .fixed = fixed;
        }
        for (name, bound) in bounds {
            let (lower, upper) = match bound.as_sequence() {
                Some([lower, upper]) => (bound_from_node(lower)?, bound_from_node(upper)?),
                _ => {
                    return Err(ConvertError::InvalidNode(format!(
                        "bounds of {name} must be a [lower, upper] pair"
                    )))
                }
            };
            model
                .parameter_mut(&name)
                .ok_or_else(|| ConvertError::InvalidNode(format!("{tag} has no parameter {name}")))?
                .bounds = (lower, upper);
        }
        Ok(())
    }
}
