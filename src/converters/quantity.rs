use asdf_astro_plugin::{
    node_map, AstroObject, Construct, ConvertError, Converter, Node, NodeMap, NodeMapExt,
    SerializationContext, Tag,
};
use asdf_astro_registry::tags::unit;

use super::{complete, downcast, object_value};
use crate::values::{Numeric, Quantity, Unit};

/// Convert a unit object, or a unit string, to a [`Unit`].
pub(super) fn unit_from_node(node: Node) -> Result<Unit, ConvertError> {
    match node {
        Node::String(text) => {
            Unit::parse(&text).map_err(|err| ConvertError::InvalidNode(err.to_string()))
        }
        node => object_value(node, "a unit"),
    }
}

/// Convert a quantity to a `{value, unit, datatype?}` node.
pub(super) fn quantity_to_node(quantity: &Quantity) -> NodeMap {
    let mut node = node_map! {
        "value" => quantity.value.to_node(),
        "unit" => quantity.unit.clone(),
    };
    if quantity.value.is_scalar() {
        node.insert("datatype".to_string(), Node::from("float64"));
    }
    node
}

/// Convert a `{value, unit, datatype?}` node to a plain quantity.
pub(super) fn quantity_from_node(node: &mut NodeMap) -> Result<Quantity, ConvertError> {
    let value = Numeric::from_node(&node.required("value")?)?;
    let unit = unit_from_node(node.required("unit")?)?;
    if let Some(datatype) = node.optional_string("datatype")? {
        if !datatype.starts_with("float") && !datatype.starts_with("int") {
            return Err(ConvertError::InvalidNode(format!(
                "unsupported quantity datatype {datatype}"
            )));
        }
    }
    Ok(Quantity::new(value, unit))
}

/// Reads and writes [`Quantity`] values without a tag of their own, including distances.
#[derive(Debug, Default)]
pub struct QuantityConverter;

impl Converter for QuantityConverter {
    fn name(&self) -> &'static str {
        "QuantityConverter"
    }

    fn tags(&self) -> &[&'static str] {
        &[unit::QUANTITY]
    }

    fn types(&self) -> &[&'static str] {
        &[
            "astropy.units.quantity.Quantity",
            "astropy.coordinates.distances.Distance",
        ]
    }

    fn to_node(
        &self,
        object: &dyn AstroObject,
        _tag: &Tag,
        _ctx: &mut SerializationContext,
    ) -> Result<Node, ConvertError> {
        let quantity = downcast::<Quantity>(object, self.name())?;
        Ok(Node::Mapping(quantity_to_node(quantity)))
    }

    fn from_node(
        &self,
        node: Node,
        _tag: &Tag,
        _ctx: &mut SerializationContext,
    ) -> Result<Construct, ConvertError> {
        Ok(complete(quantity_from_node(&mut node.into_mapping()?)?))
    }
}

#[cfg(test)]
mod tests {
    use asdf_astro_registry::Version;

    use super::*;

    #[test]
    fn quantity_node() {
        let quantity = Quantity::new(2.5, Unit::parse("km / s").unwrap());
        let mut node = quantity_to_node(&quantity);
        assert_eq!(node["datatype"], Node::from("float64"));
        assert_eq!(quantity_from_node(&mut node).unwrap(), quantity);

        let array = Quantity::new(vec![1.0, 2.0], Unit::parse("m").unwrap());
        let node = quantity_to_node(&array);
        assert!(!node.contains_key("datatype"));
    }

    #[test]
    fn quantity_unit_string() {
        let mut node = node_map! { "value" => 1.0, "unit" => "m" };
        let converter = QuantityConverter;
        let tag = Tag::parse("tag:stsci.edu:asdf/unit/quantity-1.1.0").unwrap();
        let mut ctx = SerializationContext::new(Version::new(1, 5, 0));
        let construct = converter
            .from_node(Node::Mapping(node.clone()), &tag, &mut ctx)
            .unwrap();
        assert!(construct.object().is::<Quantity>());
        node.insert("unit".to_string(), Node::Int(1));
        assert!(quantity_from_node(&mut node).is_err());
    }
}
