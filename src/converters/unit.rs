use asdf_astro_plugin::{
    node_map, AstroObject, Construct, ConvertError, Converter, Node, NodeMap, NodeMapExt,
    SerializationContext, Tag, TagPattern,
};
use asdf_astro_registry::tags::unit;
use indexmap::IndexMap;
use itertools::Itertools;

use super::{complete, downcast, object_value};
use crate::values::{Equivalency, EquivalencyComponent, MagUnit, Unit, UnitFormatError};

/// Reads and writes [`Unit`] as a unit string.
///
/// Units representable in the VOUnit format are written with the `unit` tag of the ASDF standard,
/// others with the astropy `unit` tag in the generic format.
#[derive(Debug, Default)]
pub struct UnitConverter;

impl UnitConverter {
    const TAGS: &'static [&'static str] = &[unit::UNIT, unit::ASTROPY_UNIT];
    const TYPES: &'static [&'static str] =
        &["astropy.units.core.Unit", "astropy.units.core.UnitBase"];
}

fn is_vounit_tag(tag: &Tag) -> bool {
    TagPattern::new(unit::UNIT).matches(tag.as_str())
}

impl Converter for UnitConverter {
    fn name(&self) -> &'static str {
        "UnitConverter"
    }

    fn tags(&self) -> &[&'static str] {
        Self::TAGS
    }

    fn types(&self) -> &[&'static str] {
        Self::TYPES
    }

    fn select_tag(
        &self,
        object: &dyn AstroObject,
        tags: &[Tag],
        _ctx: &SerializationContext,
    ) -> Result<Tag, ConvertError> {
        let unit = downcast::<Unit>(object, self.name())?;
        let vounit = match unit.to_vounit() {
            Ok(_) => true,
            Err(UnitFormatError::NotVoUnit { .. } | UnitFormatError::Parse(_)) => false,
        };
        tags.iter()
            .find(|tag| is_vounit_tag(tag) == vounit)
            .cloned()
            .ok_or_else(|| {
                ConvertError::Other(format!("no unit tag is available to write {unit}"))
            })
    }

    fn to_node(
        &self,
        object: &dyn AstroObject,
        tag: &Tag,
        _ctx: &mut SerializationContext,
    ) -> Result<Node, ConvertError> {
        let unit = downcast::<Unit>(object, self.name())?;
        if is_vounit_tag(tag) {
            unit.to_vounit()
                .map(Node::String)
                .map_err(|err| ConvertError::unsupported_shape(tag.as_str(), err.to_string()))
        } else {
            Ok(Node::String(unit.to_string()))
        }
    }

    fn from_node(
        &self,
        node: Node,
        _tag: &Tag,
        _ctx: &mut SerializationContext,
    ) -> Result<Construct, ConvertError> {
        let unit = Unit::parse(&node.into_string()?)
            .map_err(|err| ConvertError::InvalidNode(err.to_string()))?;
        Ok(complete(unit))
    }
}

/// Reads and writes [`Equivalency`] as a list of `{name, kwargs_names, kwargs_values}`.
#[derive(Debug, Default)]
pub struct EquivalencyConverter;

impl Converter for EquivalencyConverter {
    fn name(&self) -> &'static str {
        "EquivalencyConverter"
    }

    fn tags(&self) -> &[&'static str] {
        &[unit::EQUIVALENCY]
    }

    fn types(&self) -> &[&'static str] {
        &["astropy.units.equivalencies.Equivalency"]
    }

    fn to_node(
        &self,
        object: &dyn AstroObject,
        _tag: &Tag,
        _ctx: &mut SerializationContext,
    ) -> Result<Node, ConvertError> {
        let equivalency = downcast::<Equivalency>(object, self.name())?;
        Ok(Node::Sequence(
            equivalency
                .components
                .iter()
                .map(|component| {
                    Node::Mapping(node_map! {
                        "name" => component.name.as_str(),
                        "kwargs_names" => Node::from_strs(component.kwargs.keys()),
                        "kwargs_values" => component.kwargs.values().cloned().collect_vec(),
                    })
                })
                .collect(),
        ))
    }

    fn from_node(
        &self,
        node: Node,
        _tag: &Tag,
        _ctx: &mut SerializationContext,
    ) -> Result<Construct, ConvertError> {
        let components = node
            .into_sequence()?
            .into_iter()
            .map(|component| {
                let mut component = component.into_mapping()?;
                let name = component.required_string("name")?;
                let names = component.required("kwargs_names")?.to_string_vec()?;
                let values = component.required("kwargs_values")?.into_sequence()?;
                if names.len() != values.len() {
                    return Err(ConvertError::InvalidNode(format!(
                        "equivalency {name} has {} argument names and {} values",
                        names.len(),
                        values.len()
                    )));
                }
                Ok(EquivalencyComponent {
                    name,
                    kwargs: names.into_iter().zip(values).collect::<IndexMap<_, _>>(),
                })
            })
            .collect::<Result<Vec<_>, ConvertError>>()?;
        Ok(complete(Equivalency { components }))
    }
}

/// Reads and writes [`MagUnit`] as `{physical_unit, function_unit}`.
#[derive(Debug, Default)]
pub struct MagUnitConverter;

impl Converter for MagUnitConverter {
    fn name(&self) -> &'static str {
        "MagUnitConverter"
    }

    fn tags(&self) -> &[&'static str] {
        &[unit::MAGUNIT]
    }

    fn types(&self) -> &[&'static str] {
        &["astropy.units.function.logarithmic.MagUnit"]
    }

    fn to_node(
        &self,
        object: &dyn AstroObject,
        _tag: &Tag,
        _ctx: &mut SerializationContext,
    ) -> Result<Node, ConvertError> {
        let magunit = downcast::<MagUnit>(object, self.name())?;
        Ok(Node::Mapping(node_map! {
            "physical_unit" => magunit.physical_unit.clone(),
            "function_unit" => magunit.function_unit.clone(),
        }))
    }

    fn from_node(
        &self,
        node: Node,
        _tag: &Tag,
        _ctx: &mut SerializationContext,
    ) -> Result<Construct, ConvertError> {
        let mut node: NodeMap = node.into_mapping()?;
        Ok(complete(MagUnit {
            physical_unit: object_value(node.required("physical_unit")?, "a unit")?,
            function_unit: object_value(node.required("function_unit")?, "a unit")?,
        }))
    }
}
