use asdf_astro_plugin::{ConvertError, NodeMap, NodeMapExt, SerializationContext, Tag};
use asdf_astro_registry::tags::transform;

use super::TransformConverter;
use crate::values::{Model, ModelKind, NdArray};

/// Reads and writes one-dimensional B-splines as `{knots, coefficients, degree}`.
#[derive(Debug, Default)]
pub struct SplineConverter;

impl TransformConverter for SplineConverter {
    fn name(&self) -> &'static str {
        "SplineConverter"
    }

    fn tags(&self) -> &[&'static str] {
        &[transform::SPLINE1D]
    }

    fn types(&self) -> &[&'static str] {
        &["astropy.modeling.spline.Spline1D"]
    }

    fn to_node_transform(
        &self,
        model: &Model,
        _tag: &Tag,
        _ctx: &mut SerializationContext,
    ) -> Result<NodeMap, ConvertError> {
        let ModelKind::Spline {
            knots,
            coefficients,
            degree,
        } = model.kind()
        else {
            return Err(ConvertError::Other(format!(
                "{} cannot convert {}",
                self.name(),
                model.model_type().type_key
            )));
        };
        Ok(asdf_astro_plugin::node_map! {
            "knots" => knots.to_node(),
            "coefficients" => coefficients.to_node(),
            "degree" => *degree,
        })
    }

    fn from_node_transform(
        &self,
        node: &mut NodeMap,
        _tag: &Tag,
        _ctx: &mut SerializationContext,
    ) -> Result<Model, ConvertError> {
        let knots = NdArray::from_node(&node.required("knots")?)?;
        let coefficients = NdArray::from_node(&node.required("coefficients")?)?;
        let degree = node.required("degree")?.to_i64()?;
        let degree = usize::try_from(degree)
            .map_err(|_| ConvertError::InvalidNode(format!("invalid spline degree {degree}")))?;
        if knots.ndim() != 1 || coefficients.ndim() != 1 {
            return Err(ConvertError::InvalidNode(
                "spline knots and coefficients must be one-dimensional".to_string(),
            ));
        }
        Ok(Model::spline1d(
            knots.data().to_vec(),
            coefficients.data().to_vec(),
            degree,
        ))
    }
}

#[cfg(test)]
mod tests {
    use asdf_astro_plugin::{Node, Version};

    use super::*;

    #[test]
    fn spline_fields() {
        let mut ctx = SerializationContext::new(Version::new(1, 5, 0));
        let tag = Tag::parse("tag:stsci.edu:asdf/transform/spline1d-1.0.0").unwrap();
        let model = Model::spline1d(
            vec![0.0, 0.0, 0.0, 0.0, 1.0, 1.0, 1.0, 1.0],
            vec![1.0, 2.0, 3.0, 4.0, 0.0, 0.0, 0.0, 0.0],
            3,
        );
        let mut node = SplineConverter
            .to_node_transform(&model, &tag, &mut ctx)
            .unwrap();
        assert_eq!(node["degree"], Node::from(3_usize));
        let read = SplineConverter
            .from_node_transform(&mut node, &tag, &mut ctx)
            .unwrap();
        assert_eq!(read, model);

        let mut node = asdf_astro_plugin::node_map! {
            "knots" => Node::from_f64s(&[0.0, 1.0]),
            "coefficients" => Node::from_f64s(&[1.0]),
            "degree" => -1_i64,
        };
        assert!(SplineConverter
            .from_node_transform(&mut node, &tag, &mut ctx)
            .is_err());
    }
}
