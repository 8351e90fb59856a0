use asdf_astro_plugin::{ConvertError, Node, NodeMap, NodeMapExt, SerializationContext, Tag};
use asdf_astro_registry::tags::transform;

use super::TransformConverter;
use crate::values::{Model, ModelKind, NdArray};

/// Reads and writes lookup table models.
///
/// A node has `lookup_table`, `points`, `method`, `bounds_error` and optionally `fill_value`.
/// The dimension of the lookup table selects `Tabular1D` or `Tabular2D`.
#[derive(Debug, Default)]
pub struct TabularConverter;

impl TransformConverter for TabularConverter {
    fn name(&self) -> &'static str {
        "TabularConverter"
    }

    fn tags(&self) -> &[&'static str] {
        &[transform::TABULAR]
    }

    fn types(&self) -> &[&'static str] {
        &[
            "astropy.modeling.tabular.Tabular1D",
            "astropy.modeling.tabular.Tabular2D",
        ]
    }

    fn to_node_transform(
        &self,
        model: &Model,
        _tag: &Tag,
        _ctx: &mut SerializationContext,
    ) -> Result<NodeMap, ConvertError> {
        let ModelKind::Tabular {
            points,
            lookup_table,
            method,
            bounds_error,
            fill_value,
        } = model.kind()
        else {
            return Err(ConvertError::Other(format!(
                "{} cannot convert {}",
                self.name(),
                model.model_type().type_key
            )));
        };
        let mut node = NodeMap::new();
        node.insert_some("fill_value", *fill_value);
        node.insert("lookup_table".to_string(), lookup_table.to_node());
        node.insert(
            "points".to_string(),
            Node::Sequence(points.iter().map(NdArray::to_node).collect()),
        );
        node.insert("method".to_string(), Node::from(method.as_str()));
        node.insert("bounds_error".to_string(), Node::Bool(*bounds_error));
        Ok(node)
    }

    fn from_node_transform(
        &self,
        node: &mut NodeMap,
        tag: &Tag,
        _ctx: &mut SerializationContext,
    ) -> Result<Model, ConvertError> {
        let lookup_table = NdArray::from_node(&node.required("lookup_table")?)?;
        let points = node
            .required("points")?
            .into_sequence()?
            .iter()
            .map(NdArray::from_node)
            .collect::<Result<Vec<_>, _>>()?;
        let method = node.optional_string("method")?;
        let bounds_error = node
            .optional("bounds_error")
            .map(|bounds_error| {
                bounds_error.as_bool().ok_or_else(|| {
                    ConvertError::InvalidNode("bounds_error must be a boolean".to_string())
                })
            })
            .transpose()?;
        let fill_value = node
            .optional("fill_value")
            .map(|fill_value| fill_value.to_f64())
            .transpose()?;

        let mut model = Model::tabular(points, lookup_table).map_err(|err| match err {
            ConvertError::UnsupportedShape { .. } => ConvertError::unsupported_shape(
                tag.to_string(),
                "tabular models with more than two dimensions are not supported",
            ),
            err => ConvertError::InvalidNode(err.to_string()),
        })?;
        if let ModelKind::Tabular {
            method: model_method,
            bounds_error: model_bounds_error,
            fill_value: model_fill_value,
            ..
        } = model.kind_mut()
        {
            if let Some(method) = method {
                *model_method = method;
            }
            if let Some(bounds_error) = bounds_error {
                *model_bounds_error = bounds_error;
            }
            *model_fill_value = fill_value;
        }
        Ok(model)
    }
}
