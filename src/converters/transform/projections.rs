use asdf_astro_plugin::{ConvertError, Node, NodeMap, NodeMapExt, SerializationContext, Tag};
use asdf_astro_registry::tags::transform;

use super::{
    simple::{parameters_from_node, parameters_to_node},
    ModelConverter, TransformConverter,
};
use crate::values::{
    transform::model_types::{self, ModelType},
    Model,
};

/// A converter for a sky projection in both directions.
///
/// Both directions share a tag, distinguished by `direction: pix2sky` or `direction: sky2pix`.
#[derive(Debug)]
pub struct ProjectionConverter {
    tags: [&'static str; 1],
    types: [&'static str; 2],
    pix2sky: &'static ModelType,
    sky2pix: &'static ModelType,
}

impl ProjectionConverter {
    /// Create a converter of the projection pair `pix2sky` and `sky2pix` with the tag pattern `tag`.
    #[must_use]
    pub const fn new(
        tag: &'static str,
        pix2sky: &'static ModelType,
        sky2pix: &'static ModelType,
    ) -> Self {
        Self {
            tags: [tag],
            types: [pix2sky.type_key, sky2pix.type_key],
            pix2sky,
            sky2pix,
        }
    }
}

impl TransformConverter for ProjectionConverter {
    fn name(&self) -> &'static str {
        "ProjectionConverter"
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
        let direction = if std::ptr::eq(model.model_type(), self.pix2sky) {
            "pix2sky"
        } else {
            "sky2pix"
        };
        let mut node = NodeMap::new();
        node.insert("direction".to_string(), Node::from(direction));
        parameters_to_node(model, &mut node);
        Ok(node)
    }

    fn from_node_transform(
        &self,
        node: &mut NodeMap,
        tag: &Tag,
        _ctx: &mut SerializationContext,
    ) -> Result<Model, ConvertError> {
        let model_type = match node.optional_string("direction")?.as_deref() {
            None | Some("pix2sky") => self.pix2sky,
            Some("sky2pix") => self.sky2pix,
            Some(direction) => {
                return Err(ConvertError::InvalidNode(format!(
                    "{tag} has an invalid direction {direction}"
                )))
            }
        };
        let mut model = Model::new(model_type);
        parameters_from_node(&mut model, node)?;
        Ok(model)
    }
}

/// Create the converters of the built-in projections.
#[must_use]
pub fn projection_converters() -> Vec<ModelConverter<ProjectionConverter>> {
    [
        ProjectionConverter::new(
            transform::GNOMONIC,
            &model_types::PIX2SKY_GNOMONIC,
            &model_types::SKY2PIX_GNOMONIC,
        ),
        ProjectionConverter::new(
            transform::ZENITHAL_PERSPECTIVE,
            &model_types::PIX2SKY_ZENITHAL_PERSPECTIVE,
            &model_types::SKY2PIX_ZENITHAL_PERSPECTIVE,
        ),
        ProjectionConverter::new(
            transform::AIRY,
            &model_types::PIX2SKY_AIRY,
            &model_types::SKY2PIX_AIRY,
        ),
        ProjectionConverter::new(
            transform::MERCATOR,
            &model_types::PIX2SKY_MERCATOR,
            &model_types::SKY2PIX_MERCATOR,
        ),
        ProjectionConverter::new(
            transform::HAMMER_AITOFF,
            &model_types::PIX2SKY_HAMMER_AITOFF,
            &model_types::SKY2PIX_HAMMER_AITOFF,
        ),
        ProjectionConverter::new(
            transform::PLATE_CARREE,
            &model_types::PIX2SKY_PLATE_CARREE,
            &model_types::SKY2PIX_PLATE_CARREE,
        ),
        ProjectionConverter::new(
            transform::CONIC_EQUAL_AREA,
            &model_types::PIX2SKY_CONIC_EQUAL_AREA,
            &model_types::SKY2PIX_CONIC_EQUAL_AREA,
        ),
    ]
    .into_iter()
    .map(ModelConverter::new)
    .collect()
}

#[cfg(test)]
mod tests {
    use asdf_astro_plugin::Version;

    use super::*;

    #[test]
    fn projection_direction() {
        let converter = ProjectionConverter::new(
            transform::AIRY,
            &model_types::PIX2SKY_AIRY,
            &model_types::SKY2PIX_AIRY,
        );
        let tag = Tag::parse("tag:stsci.edu:asdf/transform/airy-1.2.0").unwrap();
        let mut ctx = SerializationContext::new(Version::new(1, 5, 0));
        let model = Model::new(&model_types::SKY2PIX_AIRY)
            .with_parameter("theta_b", 45.0)
            .unwrap();
        let mut node = converter.to_node_transform(&model, &tag, &mut ctx).unwrap();
        assert_eq!(node["direction"], Node::from("sky2pix"));
        assert_eq!(converter.from_node_transform(&mut node, &tag, &mut ctx).unwrap(), model);

        let mut node = NodeMap::new();
        let model = converter.from_node_transform(&mut node, &tag, &mut ctx).unwrap();
        assert_eq!(model.inputs(), ["x", "y"]);
        assert_eq!(model.parameter("theta_b").unwrap().value.as_scalar(), Some(90.0));

        let mut node = NodeMap::new();
        node.insert("direction".to_string(), Node::from("sideways"));
        assert!(converter.from_node_transform(&mut node, &tag, &mut ctx).is_err());
    }
}
