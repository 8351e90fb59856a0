use asdf_astro_plugin::{
    ConvertError, ExtensionBuildError, Node, NodeMap, NodeMapExt, SerializationContext, Tag,
    Version,
};
use asdf_astro_registry::tags::transform;

use super::{ModelConverter, TransformConverter};
use crate::values::{
    transform::model_types::{self, ModelType},
    Model, Parameter,
};

/// Write every parameter of `model` by name.
pub(super) fn parameters_to_node(model: &Model, node: &mut NodeMap) {
    for (name, parameter) in model.parameters() {
        node.insert(name.clone(), parameter.to_node());
    }
}

/// Read the parameters present in `node` into `model`, keeping the defaults of absent parameters.
pub(super) fn parameters_from_node(
    model: &mut Model,
    node: &mut NodeMap,
) -> Result<(), ConvertError> {
    let names = model.parameters().keys().cloned().collect::<Vec<_>>();
    for name in names {
        if let Some(value) = node.optional(&name) {
            let value = Parameter::from_node(&value)?;
            if let Some(parameter) = model.parameter_mut(&name) {
                parameter.value = value.value;
                parameter.unit = value.unit;
            }
        }
    }
    Ok(())
}

/// A converter for a model fully described by its named parameters.
#[derive(Debug)]
pub struct SimpleTransformConverter {
    tags: [&'static str; 1],
    types: [&'static str; 1],
    model_type: &'static ModelType,
}

impl SimpleTransformConverter {
    /// Create a converter of the model type `type_key` with the tag pattern `tag`.
    ///
    /// # Errors
    /// Returns [`ExtensionBuildError::UnknownModelType`] if `type_key` is not a registered model type.
    pub fn new(tag: &'static str, type_key: &str) -> Result<Self, ExtensionBuildError> {
        let model_type = model_types::model_type(type_key)
            .ok_or_else(|| ExtensionBuildError::UnknownModelType(type_key.to_string()))?;
        Ok(Self {
            tags: [tag],
            types: [model_type.type_key],
            model_type,
        })
    }
}

impl TransformConverter for SimpleTransformConverter {
    fn name(&self) -> &'static str {
        "SimpleTransformConverter"
    }

    fn tags(&self) -> &[&'static str] {
        &self.tags
    }

    fn types(&self) -> &[&'static str] {
        &self.types
    }

    fn to_node_transform(
        &self,
        model: &Model,
        _tag: &Tag,
        _ctx: &mut SerializationContext,
    ) -> Result<NodeMap, ConvertError> {
        let mut node = NodeMap::new();
        parameters_to_node(model, &mut node);
        Ok(node)
    }

    fn from_node_transform(
        &self,
        node: &mut NodeMap,
        _tag: &Tag,
        _ctx: &mut SerializationContext,
    ) -> Result<Model, ConvertError> {
        let mut model = Model::new(self.model_type);
        parameters_from_node(&mut model, node)?;
        Ok(model)
    }
}

/// The tag and type key of each model family written by [`SimpleTransformConverter`].
const SIMPLE_TRANSFORMS: &[(&str, &str)] = &[
    (transform::SHIFT, "astropy.modeling.functional_models.Shift"),
    (transform::SCALE, "astropy.modeling.functional_models.Scale"),
    (transform::MULTIPLYSCALE, "astropy.modeling.functional_models.Multiply"),
    (transform::ROTATE2D, "astropy.modeling.rotations.Rotation2D"),
    (transform::AFFINE, "astropy.modeling.projections.AffineTransformation2D"),
    (transform::GAUSSIAN1D, "astropy.modeling.functional_models.Gaussian1D"),
    (transform::GAUSSIAN2D, "astropy.modeling.functional_models.Gaussian2D"),
    (transform::LINEAR1D, "astropy.modeling.functional_models.Linear1D"),
    (transform::PLANAR2D, "astropy.modeling.functional_models.Planar2D"),
    (transform::SINE1D, "astropy.modeling.functional_models.Sine1D"),
    (transform::LORENTZ1D, "astropy.modeling.functional_models.Lorentz1D"),
    (transform::BOX1D, "astropy.modeling.functional_models.Box1D"),
    (transform::POWER_LAW1D, "astropy.modeling.powerlaws.PowerLaw1D"),
];

/// Create the converters of the functional, rotation and power-law model families.
///
/// # Errors
/// Returns [`ExtensionBuildError::UnknownModelType`] if a model type is not registered.
pub fn simple_transform_converters(
) -> Result<Vec<ModelConverter<SimpleTransformConverter>>, ExtensionBuildError> {
    SIMPLE_TRANSFORMS
        .iter()
        .map(|(tag, type_key)| {
            SimpleTransformConverter::new(tag, type_key).map(ModelConverter::new)
        })
        .collect()
}

/// The first `constant` tag with a `dimensions` field.
const CONSTANT_DIMENSIONS: Version = Version::new(1, 4, 0);

/// A converter for `Const1D` and `Const2D`.
///
/// Two-dimensional constants require `constant-1.4.0` or newer.
#[derive(Debug, Default)]
pub struct ConstantConverter;

impl TransformConverter for ConstantConverter {
    fn name(&self) -> &'static str {
        "ConstantConverter"
    }

    fn tags(&self) -> &[&'static str] {
        &[transform::CONSTANT]
    }

    fn types(&self) -> &[&'static str] {
        &[
            "astropy.modeling.functional_models.Const1D",
            "astropy.modeling.functional_models.Const2D",
        ]
    }

    fn to_node_transform(
        &self,
        model: &Model,
        tag: &Tag,
        _ctx: &mut SerializationContext,
    ) -> Result<NodeMap, ConvertError> {
        let two_dimensional = std::ptr::eq(model.model_type(), &model_types::CONST2D);
        let mut node = NodeMap::new();
        let value = model
            .parameter("amplitude")
            .map_or(Node::Null, Parameter::to_node);
        node.insert("value".to_string(), value);
        if tag.version() >= CONSTANT_DIMENSIONS {
            node.insert(
                "dimensions".to_string(),
                Node::from(if two_dimensional { 2_usize } else { 1 }),
            );
        } else if two_dimensional {
            return Err(ConvertError::unsupported_shape(
                tag.as_str(),
                "does not support models with > 1 dimension",
            ));
        }
        Ok(node)
    }

    fn from_node_transform(
        &self,
        node: &mut NodeMap,
        _tag: &Tag,
        _ctx: &mut SerializationContext,
    ) -> Result<Model, ConvertError> {
        let value = Parameter::from_node(&node.required("value")?)?;
        let dimensions = node
            .optional("dimensions")
            .map(|dimensions| dimensions.to_i64())
            .transpose()?
            .unwrap_or(1);
        let mut model = match dimensions {
            1 => Model::new(&model_types::CONST1D),
            2 => Model::new(&model_types::CONST2D),
            dimensions => {
                return Err(ConvertError::InvalidNode(format!(
                    "a constant has 1 or 2 dimensions, got {dimensions}"
                )))
            }
        };
        if let Some(amplitude) = model.parameter_mut("amplitude") {
            amplitude.value = value.value;
            amplitude.unit = value.unit;
        }
        Ok(model)
    }
}
