use asdf_astro_plugin::{ConvertError, Node, NodeMap, NodeMapExt, SerializationContext, Tag};
use asdf_astro_registry::tags::transform;

use super::TransformConverter;
use crate::values::{
    transform::model_types::{self, ModelType},
    Model, ModelKind, Numeric, Parameter,
};

const NATIVE2CELESTIAL: &str = "native2celestial";
const CELESTIAL2NATIVE: &str = "celestial2native";

fn axes_order(model: &Model) -> Result<&str, ConvertError> {
    match model.kind() {
        ModelKind::Rotation { axes_order } => Ok(axes_order.as_str()),
        _ => Err(ConvertError::Other(format!(
            "{} has no axes order",
            model.model_type().type_key
        ))),
    }
}

fn parameter_node(model: &Model, name: &str) -> Result<Node, ConvertError> {
    model.parameter(name).map(Parameter::to_node).ok_or_else(|| {
        ConvertError::Other(format!(
            "{} has no parameter {name}",
            model.model_type().type_key
        ))
    })
}

/// Reads and writes three-dimensional rotations as `{phi, theta, psi, direction}`.
///
/// The direction is `native2celestial` or `celestial2native` for sky rotations, whose `lon`,
/// `lat` and `lon_pole` parameters are written as `phi`, `theta` and `psi`. Any other direction is
/// the axes order of an Euler angle rotation.
#[derive(Debug, Default)]
pub struct Rotate3DConverter;

impl TransformConverter for Rotate3DConverter {
    fn name(&self) -> &'static str {
        "Rotate3DConverter"
    }

    fn tags(&self) -> &[&'static str] {
        &[transform::ROTATE3D]
    }

    fn types(&self) -> &[&'static str] {
        &[
            "astropy.modeling.rotations.RotateNative2Celestial",
            "astropy.modeling.rotations.RotateCelestial2Native",
            "astropy.modeling.rotations.EulerAngleRotation",
        ]
    }

    fn to_node_transform(
        &self,
        model: &Model,
        _tag: &Tag,
        _ctx: &mut SerializationContext,
    ) -> Result<NodeMap, ConvertError> {
        let model_type = model.model_type();
        let (names, direction) = if std::ptr::eq(model_type, &model_types::ROTATE_NATIVE2CELESTIAL)
        {
            (["lon", "lat", "lon_pole"], NATIVE2CELESTIAL)
        } else if std::ptr::eq(model_type, &model_types::ROTATE_CELESTIAL2NATIVE) {
            (["lon", "lat", "lon_pole"], CELESTIAL2NATIVE)
        } else {
            (["phi", "theta", "psi"], axes_order(model)?)
        };
        let mut node = NodeMap::new();
        for (key, name) in ["phi", "theta", "psi"].into_iter().zip(names) {
            node.insert(key.to_string(), parameter_node(model, name)?);
        }
        node.insert("direction".to_string(), Node::from(direction));
        Ok(node)
    }

    fn from_node_transform(
        &self,
        node: &mut NodeMap,
        _tag: &Tag,
        _ctx: &mut SerializationContext,
    ) -> Result<Model, ConvertError> {
        let angles = ["phi", "theta", "psi"]
            .into_iter()
            .map(|key| Parameter::from_node(&node.required(key)?))
            .collect::<Result<Vec<_>, _>>()?;
        let direction = node.required_string("direction")?;
        let (mut model, names) = match direction.as_str() {
            NATIVE2CELESTIAL => (
                Model::new(&model_types::ROTATE_NATIVE2CELESTIAL),
                ["lon", "lat", "lon_pole"],
            ),
            CELESTIAL2NATIVE => (
                Model::new(&model_types::ROTATE_CELESTIAL2NATIVE),
                ["lon", "lat", "lon_pole"],
            ),
            axes_order => (
                Model::euler_angle_rotation(0.0, 0.0, 0.0, axes_order)
                    .map_err(|err| ConvertError::InvalidNode(err.to_string()))?,
                ["phi", "theta", "psi"],
            ),
        };
        for (name, angle) in names.into_iter().zip(angles) {
            if let Some(parameter) = model.parameter_mut(name) {
                parameter.value = angle.value;
                parameter.unit = angle.unit;
            }
        }
        Ok(model)
    }
}

/// Reads and writes rotation sequences as `{angles, axes_order, rotation_type}`.
///
/// The rotation type is `cartesian` for rotations of `x`, `y` and `z`, or `spherical` for
/// rotations of `lon` and `lat`.
#[derive(Debug, Default)]
pub struct RotationSequenceConverter;

fn rotation_types() -> [(&'static str, &'static ModelType); 2] {
    [
        ("cartesian", &model_types::ROTATION_SEQUENCE3D),
        ("spherical", &model_types::SPHERICAL_ROTATION_SEQUENCE),
    ]
}

impl TransformConverter for RotationSequenceConverter {
    fn name(&self) -> &'static str {
        "RotationSequenceConverter"
    }

    fn tags(&self) -> &[&'static str] {
        &[transform::ROTATE_SEQUENCE_3D]
    }

    fn types(&self) -> &[&'static str] {
        &[
            "astropy.modeling.rotations.RotationSequence3D",
            "astropy.modeling.rotations.SphericalRotationSequence",
        ]
    }

    fn to_node_transform(
        &self,
        model: &Model,
        _tag: &Tag,
        _ctx: &mut SerializationContext,
    ) -> Result<NodeMap, ConvertError> {
        let rotation_type = rotation_types()
            .into_iter()
            .find(|(_, model_type)| std::ptr::eq(*model_type, model.model_type()))
            .map(|(rotation_type, _)| rotation_type)
            .ok_or_else(|| {
                ConvertError::Other(format!(
                    "{} cannot convert {}",
                    self.name(),
                    model.model_type().type_key
                ))
            })?;
        let angles = match model.parameter("angles").map(|angles| &angles.value) {
            Some(Numeric::Array(angles)) => Node::from_f64s(angles.data()),
            Some(Numeric::Scalar(angle)) => Node::from_f64s(&[*angle]),
            None => Node::Sequence(vec![]),
        };
        Ok(asdf_astro_plugin::node_map! {
            "angles" => angles,
            "axes_order" => axes_order(model)?,
            "rotation_type" => rotation_type,
        })
    }

    fn from_node_transform(
        &self,
        node: &mut NodeMap,
        _tag: &Tag,
        _ctx: &mut SerializationContext,
    ) -> Result<Model, ConvertError> {
        let angles = node.required("angles")?.to_f64_vec()?;
        let axes_order = node.required_string("axes_order")?;
        let rotation_type = node.required_string("rotation_type")?;
        let model_type = rotation_types()
            .into_iter()
            .find(|(name, _)| *name == rotation_type)
            .map(|(_, model_type)| model_type)
            .ok_or_else(|| {
                ConvertError::InvalidNode(format!("unrecognized rotation_type {rotation_type}"))
            })?;
        Model::rotation_sequence(model_type, angles, &axes_order)
            .map_err(|err| ConvertError::InvalidNode(err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use asdf_astro_plugin::Version;

    use super::*;
    use crate::values::NdArray;

    fn ctx() -> SerializationContext {
        SerializationContext::new(Version::new(1, 5, 0))
    }

    #[test]
    fn sky_rotation_direction() {
        let mut ctx = ctx();
        let tag = Tag::parse("tag:stsci.edu:asdf/transform/rotate3d-1.3.0").unwrap();
        let model =
            Model::sky_rotation(&model_types::ROTATE_CELESTIAL2NATIVE, 5.0, -72.0, 180.0);
        let mut node = Rotate3DConverter
            .to_node_transform(&model, &tag, &mut ctx)
            .unwrap();
        assert_eq!(node.get("direction").and_then(Node::as_str), Some(CELESTIAL2NATIVE));
        assert_eq!(node.get("psi").and_then(Node::as_f64), Some(180.0));

        let read = Rotate3DConverter
            .from_node_transform(&mut node, &tag, &mut ctx)
            .unwrap();
        assert_eq!(read, model);
    }

    #[test]
    fn euler_rotation_axes_order() {
        let mut ctx = ctx();
        let tag = Tag::parse("tag:stsci.edu:asdf/transform/rotate3d-1.3.0").unwrap();
        let mut node = asdf_astro_plugin::node_map! {
            "phi" => 1.0,
            "theta" => 2.0,
            "psi" => 3.0,
            "direction" => "xyz",
        };
        let model = Rotate3DConverter
            .from_node_transform(&mut node, &tag, &mut ctx)
            .unwrap();
        assert!(std::ptr::eq(model.model_type(), &model_types::EULER_ANGLE_ROTATION));
        assert_eq!(model.parameter("theta").unwrap().value, Numeric::Scalar(2.0));
        assert_eq!(
            model.kind(),
            &ModelKind::Rotation {
                axes_order: "xyz".to_string()
            }
        );

        let mut node = asdf_astro_plugin::node_map! {
            "phi" => 1.0,
            "theta" => 2.0,
            "psi" => 3.0,
            "direction" => "sideways",
        };
        let error = Rotate3DConverter
            .from_node_transform(&mut node, &tag, &mut ctx)
            .unwrap_err();
        assert!(matches!(error, ConvertError::InvalidNode(_)));
    }

    #[test]
    fn rotation_sequence_type() {
        let mut ctx = ctx();
        let tag = Tag::parse("tag:stsci.edu:asdf/transform/rotate_sequence_3d-1.0.0").unwrap();
        let model = Model::rotation_sequence(
            &model_types::SPHERICAL_ROTATION_SEQUENCE,
            vec![10.0, -20.0, 30.0],
            "zyx",
        )
        .unwrap();
        let mut node = RotationSequenceConverter
            .to_node_transform(&model, &tag, &mut ctx)
            .unwrap();
        assert_eq!(node.get("rotation_type").and_then(Node::as_str), Some("spherical"));
        let read = RotationSequenceConverter
            .from_node_transform(&mut node, &tag, &mut ctx)
            .unwrap();
        assert_eq!(
            read.parameter("angles").unwrap().value,
            Numeric::Array(NdArray::from_vec(vec![10.0, -20.0, 30.0]))
        );
        assert_eq!(read, model);

        let mut node = asdf_astro_plugin::node_map! {
            "angles" => Node::from_f64s(&[1.0]),
            "axes_order" => "z",
            "rotation_type" => "polar",
        };
        assert!(RotationSequenceConverter
            .from_node_transform(&mut node, &tag, &mut ctx)
            .is_err());
    }
}
