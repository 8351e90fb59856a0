use asdf_astro_plugin::{
    AstroObject, Construct, ConvertError, Converter, Node, NodeMap, NodeMapExt, ObjectRef,
    SerializationContext, Tag,
};
use asdf_astro_registry::tags::{astropy, transform};

use super::TransformConverter;
use crate::{
    converters::{complete, downcast, object_value, quantity::unit_from_node},
    values::{Equivalency, Model, ModelKind, UnitsMappingInput, UnitsMappingOutput},
};

fn kind_error(converter: &str, model: &Model) -> ConvertError {
    ConvertError::Other(format!(
        "{converter} cannot convert {}",
        model.model_type().type_key
    ))
}

/// A converter for `Identity`, writing `n_dims` when it is not 1.
#[derive(Debug, Default)]
pub struct IdentityConverter;

impl TransformConverter for IdentityConverter {
    fn name(&self) -> &'static str {
        "IdentityConverter"
    }

    fn tags(&self) -> &[&'static str] {
        &[transform::IDENTITY]
    }

    fn types(&self) -> &[&'static str] {
        &["astropy.modeling.mappings.Identity"]
    }

    fn to_node_transform(
        &self,
        model: &Model,
        _tag: &Tag,
        _ctx: &mut SerializationContext,
    ) -> Result<NodeMap, ConvertError> {
        let ModelKind::Identity { n_dims } = model.kind() else {
            return Err(kind_error(self.name(), model));
        };
        let mut node = NodeMap::new();
        if *n_dims != 1 {
            node.insert("n_dims".to_string(), Node::from(*n_dims));
        }
        Ok(node)
    }

    fn from_node_transform(
        &self,
        node: &mut NodeMap,
        _tag: &Tag,
        _ctx: &mut SerializationContext,
    ) -> Result<Model, ConvertError> {
        let n_dims = node
            .optional("n_dims")
            .map(|n_dims| n_dims.to_i64())
            .transpose()?
            .unwrap_or(1);
        let n_dims = usize::try_from(n_dims)
            .map_err(|_| ConvertError::InvalidNode(format!("invalid n_dims {n_dims}")))?;
        Ok(Model::identity(n_dims))
    }
}

/// A converter for `Mapping`, writing `n_inputs` only when the mapping does not imply it.
#[derive(Debug, Default)]
pub struct RemapAxesConverter;

impl TransformConverter for RemapAxesConverter {
    fn name(&self) -> &'static str {
        "RemapAxesConverter"
    }

    fn tags(&self) -> &[&'static str] {
        &[transform::REMAP_AXES]
    }

    fn types(&self) -> &[&'static str] {
        &["astropy.modeling.mappings.Mapping"]
    }

    fn to_node_transform(
        &self,
        model: &Model,
        _tag: &Tag,
        _ctx: &mut SerializationContext,
    ) -> Result<NodeMap, ConvertError> {
        let ModelKind::Mapping { mapping, n_inputs } = model.kind() else {
            return Err(kind_error(self.name(), model));
        };
        let mut node = NodeMap::new();
        node.insert(
            "mapping".to_string(),
            Node::Sequence(mapping.iter().copied().map(Node::from).collect()),
        );
        let implied = mapping.iter().max().map_or(0, |max| max + 1);
        if *n_inputs > implied {
            node.insert("n_inputs".to_string(), Node::from(*n_inputs));
        }
        Ok(node)
    }

    fn from_node_transform(
        &self,
        node: &mut NodeMap,
        _tag: &Tag,
        _ctx: &mut SerializationContext,
    ) -> Result<Model, ConvertError> {
        let to_index = |node: &Node| -> Result<usize, ConvertError> {
            let index = node.to_i64()?;
            usize::try_from(index)
                .map_err(|_| ConvertError::InvalidNode(format!("invalid mapping index {index}")))
        };
        let mapping = node
            .required("mapping")?
            .into_sequence()?
            .iter()
            .map(to_index)
            .collect::<Result<Vec<_>, _>>()?;
        let n_inputs = node
            .optional("n_inputs")
            .as_ref()
            .map(to_index)
            .transpose()?;
        Ok(Model::mapping(mapping, n_inputs))
    }
}

/// Reads and writes `UnitsMapping` models with the astropy `units_mapping` tag.
#[derive(Debug, Default)]
pub struct UnitsMappingConverter;

fn units_mapping_input_from_node(node: Node) -> Result<UnitsMappingInput, ConvertError> {
    let mut node = node.into_mapping()?;
    Ok(UnitsMappingInput {
        name: node.required_string("name")?,
        unit: node.optional("unit").map(unit_from_node).transpose()?,
        allow_dimensionless: node
            .optional("allow_dimensionless")
            .and_then(|allow| allow.as_bool())
            .unwrap_or(false),
        equivalencies: node
            .optional("equivalencies")
            .map(|equivalencies| object_value::<Equivalency>(equivalencies, "an equivalency"))
            .transpose()?,
    })
}

fn units_mapping_output_from_node(node: Node) -> Result<UnitsMappingOutput, ConvertError> {
    let mut node = node.into_mapping()?;
    Ok(UnitsMappingOutput {
        name: node.required_string("name")?,
        unit: node.optional("unit").map(unit_from_node).transpose()?,
    })
}

impl Converter for UnitsMappingConverter {
    fn name(&self) -> &'static str {
        "UnitsMappingConverter"
    }

    fn tags(&self) -> &[&'static str] {
        &[astropy::UNITS_MAPPING]
    }

    fn types(&self) -> &[&'static str] {
        &["astropy.modeling.mappings.UnitsMapping"]
    }

    fn to_node(
        &self,
        object: &dyn AstroObject,
        _tag: &Tag,
        _ctx: &mut SerializationContext,
    ) -> Result<Node, ConvertError> {
        let model = downcast::<Model>(object, self.name())?;
        let ModelKind::UnitsMapping { inputs, outputs } = model.kind() else {
            return Err(kind_error(self.name(), model));
        };
        let mut node = NodeMap::new();
        node.insert_some("name", model.name());
        let unit_inputs = inputs
            .iter()
            .map(|input| {
                let mut input_node = NodeMap::new();
                input_node.insert("name".to_string(), Node::from(input.name.as_str()));
                input_node.insert(
                    "allow_dimensionless".to_string(),
                    Node::Bool(input.allow_dimensionless),
                );
                input_node.insert_some("unit", input.unit.clone());
                input_node.insert_some(
                    "equivalencies",
                    input.equivalencies.clone().map(ObjectRef::new),
                );
                Node::Mapping(input_node)
            })
            .collect();
        let unit_outputs = outputs
            .iter()
            .map(|output| {
                let mut output_node = NodeMap::new();
                output_node.insert("name".to_string(), Node::from(output.name.as_str()));
                output_node.insert_some("unit", output.unit.clone());
                Node::Mapping(output_node)
            })
            .collect();
        node.insert("unit_inputs".to_string(), Node::Sequence(unit_inputs));
        node.insert("unit_outputs".to_string(), Node::Sequence(unit_outputs));
        Ok(Node::Mapping(node))
    }

    fn from_node(
        &self,
        node: Node,
        _tag: &Tag,
        _ctx: &mut SerializationContext,
    ) -> Result<Construct, ConvertError> {
        let mut node = node.into_mapping()?;
        let name = node.optional_string("name")?;
        let inputs = node
            .required("unit_inputs")?
            .into_sequence()?
            .into_iter()
            .map(units_mapping_input_from_node)
            .collect::<Result<Vec<_>, _>>()?;
        let outputs = node
            .required("unit_outputs")?
            .into_sequence()?
            .into_iter()
            .map(units_mapping_output_from_node)
            .collect::<Result<Vec<_>, _>>()?;
        let mut model = Model::units_mapping(inputs, outputs)?;
        model.set_name(name);
        Ok(complete(model))
    }
}

#[cfg(test)]
mod tests {
    use asdf_astro_plugin::Version;

    use super::*;
    use crate::values::Unit;

    fn ctx() -> SerializationContext {
        SerializationContext::new(Version::new(1, 5, 0))
    }

    #[test]
    fn identity_n_dims() {
        let tag = Tag::parse("tag:stsci.edu:asdf/transform/identity-1.2.0").unwrap();
        let node = IdentityConverter
            .to_node_transform(&Model::identity(1), &tag, &mut ctx())
            .unwrap();
        assert!(node.is_empty());
        let mut node = IdentityConverter
            .to_node_transform(&Model::identity(3), &tag, &mut ctx())
            .unwrap();
        assert_eq!(node["n_dims"], Node::Int(3));
        let model = IdentityConverter
            .from_node_transform(&mut node, &tag, &mut ctx())
            .unwrap();
        assert_eq!(model.n_inputs(), 3);
    }

    #[test]
    fn remap_axes_n_inputs() {
        let tag = Tag::parse("tag:stsci.edu:asdf/transform/remap_axes-1.2.0").unwrap();
        let node = RemapAxesConverter
            .to_node_transform(&Model::mapping(vec![0, 1, 0], None), &tag, &mut ctx())
            .unwrap();
        assert!(!node.contains_key("n_inputs"));

        let model = Model::mapping(vec![1, 0], Some(4));
        let mut node = RemapAxesConverter
            .to_node_transform(&model, &tag, &mut ctx())
            .unwrap();
        assert_eq!(node["n_inputs"], Node::Int(4));
        let read = RemapAxesConverter
            .from_node_transform(&mut node, &tag, &mut ctx())
            .unwrap();
        assert_eq!(read, model);
        assert_eq!(read.n_outputs(), 2);
    }

    #[test]
    fn units_mapping_node() {
        let tag = Tag::parse("tag:astropy.org:astropy/transform/units_mapping-1.0.0").unwrap();
        let model = Model::units_mapping(
            vec![UnitsMappingInput {
                name: "x".to_string(),
                unit: Some(Unit::parse("m").unwrap()),
                allow_dimensionless: true,
                equivalencies: None,
            }],
            vec![UnitsMappingOutput {
                name: "x".to_string(),
                unit: None,
            }],
        )
        .unwrap();
        let node = UnitsMappingConverter
            .to_node(&model, &tag, &mut ctx())
            .unwrap();
        let Node::Mapping(map) = &node else {
            panic!("expected a mapping");
        };
        assert!(!map.contains_key("name"));
        let Construct::Complete(read) = UnitsMappingConverter
            .from_node(node, &tag, &mut ctx())
            .unwrap()
        else {
            panic!("expected a complete model");
        };
        assert_eq!(*read.downcast_ref::<Model>().unwrap(), model);
    }
}
