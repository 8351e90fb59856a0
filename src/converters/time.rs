use asdf_astro_plugin::{
    node_map, AstroObject, Construct, ConvertError, Converter, Node, NodeMap, NodeMapExt,
    SerializationContext, Tag,
};
use asdf_astro_registry::{tags::time, Version};

use super::{complete, downcast, object_value, quantity::unit_from_node};
use crate::values::{
    asdf_format, is_guessable_format, EarthLocation, Numeric, Quantity, Time, TimeDelta, TimeValue,
    Unit,
};

const SHARED_UNIT_LOCATION: Version = Version::new(1, 0, 0);

/// Reads and writes [`Time`].
///
/// Scalar UTC times in a guessable format are written as the bare value.
/// The `time-1.0.0` tag stores the location as plain coordinates with one `unit`, later versions as quantities.
#[derive(Debug, Default)]
pub struct TimeConverter;

fn location_to_node(location: &EarthLocation, tag: &Tag) -> Result<Node, ConvertError> {
    if tag.version() == SHARED_UNIT_LOCATION {
        let unit = location.unit().ok_or_else(|| {
            ConvertError::unsupported_shape(
                tag.as_str(),
                "requires location coordinates in a single unit",
            )
        })?;
        let coordinate = |quantity: &Quantity| {
            quantity.scalar().map(Node::Float).ok_or_else(|| {
                ConvertError::unsupported_shape(tag.as_str(), "requires a scalar location")
            })
        };
        Ok(Node::Mapping(node_map! {
            "x" => coordinate(&location.x)?,
            "y" => coordinate(&location.y)?,
            "z" => coordinate(&location.z)?,
            "unit" => unit.clone(),
        }))
    } else {
        Ok(Node::Mapping(node_map! {
            "x" => location.x.clone(),
            "y" => location.y.clone(),
            "z" => location.z.clone(),
        }))
    }
}

fn location_from_node(node: Node, tag: &Tag) -> Result<EarthLocation, ConvertError> {
    let mut node = node.into_mapping()?;
    if tag.version() == SHARED_UNIT_LOCATION {
        let unit = match node.optional("unit") {
            Some(unit) => unit_from_node(unit)?,
            None => Unit::parse("m").map_err(|err| ConvertError::Other(err.to_string()))?,
        };
        Ok(EarthLocation::from_geocentric(
            node.required_f64("x")?,
            node.required_f64("y")?,
            node.required_f64("z")?,
            &unit,
        ))
    } else {
        Ok(EarthLocation {
            x: object_value(node.required("x")?, "a quantity")?,
            y: object_value(node.required("y")?, "a quantity")?,
            z: object_value(node.required("z")?, "a quantity")?,
            ellipsoid: "WGS84".to_string(),
        })
    }
}

impl Converter for TimeConverter {
    fn name(&self) -> &'static str {
        "TimeConverter"
    }

    fn tags(&self) -> &[&'static str] {
        &[time::TIME]
    }

    fn types(&self) -> &[&'static str] {
        &["astropy.time.core.Time"]
    }

    fn to_node(
        &self,
        object: &dyn AstroObject,
        tag: &Tag,
        _ctx: &mut SerializationContext,
    ) -> Result<Node, ConvertError> {
        let time = downcast::<Time>(object, self.name())?.normalized();
        let guessable = is_guessable_format(&time.format);
        if time.scale == "utc" && guessable && time.value.is_scalar() && time.location.is_none() {
            return Ok(time.value.to_node());
        }

        let mut node = node_map! { "value" => time.value.to_node() };
        if !guessable {
            node.insert("format".to_string(), Node::from(asdf_format(&time.format)));
        }
        if time.scale != "utc" {
            node.insert("scale".to_string(), Node::from(time.scale.as_str()));
        }
        if let Some(location) = &time.location {
            node.insert("location".to_string(), location_to_node(location, tag)?);
        }
        Ok(Node::Mapping(node))
    }

    fn from_node(
        &self,
        node: Node,
        tag: &Tag,
        _ctx: &mut SerializationContext,
    ) -> Result<Construct, ConvertError> {
        let mut node = match node {
            Node::Mapping(node) => node,
            node => {
                let value = TimeValue::from_node(&node)?;
                let format = value.guess_format().ok_or_else(|| {
                    ConvertError::InvalidNode(format!(
                        "time {node} is not one of the recognized implicit formats"
                    ))
                })?;
                return Ok(complete(Time::new(value, format)));
            }
        };

        let value = TimeValue::from_node(&node.required("value")?)?;
        let format = match node.optional_string("format")? {
            Some(format) => format,
            None => value
                .guess_format()
                .ok_or_else(|| {
                    ConvertError::InvalidNode(
                        "time has no format and none can be inferred".to_string(),
                    )
                })?
                .to_string(),
        };
        let scale = node
            .optional_string("scale")?
            .unwrap_or_else(|| "utc".to_string());
        let location = node
            .optional("location")
            .map(|location| location_from_node(location, tag))
            .transpose()?;
        Ok(complete(Time {
            value,
            format,
            scale,
            location,
        }))
    }
}

/// Reads and writes [`TimeDelta`] as `{jd1, jd2, format, scale}`.
#[derive(Debug, Default)]
pub struct TimeDeltaConverter;

impl Converter for TimeDeltaConverter {
    fn name(&self) -> &'static str {
        "TimeDeltaConverter"
    }

    fn tags(&self) -> &[&'static str] {
        &[time::TIMEDELTA]
    }

    fn types(&self) -> &[&'static str] {
        &["astropy.time.core.TimeDelta"]
    }

    fn to_node(
        &self,
        object: &dyn AstroObject,
        _tag: &Tag,
        _ctx: &mut SerializationContext,
    ) -> Result<Node, ConvertError> {
        let delta = downcast::<TimeDelta>(object, self.name())?;
        Ok(Node::Mapping(node_map! {
            "jd1" => delta.jd1.to_node(),
            "jd2" => delta.jd2.to_node(),
            "format" => delta.format.as_str(),
            "scale" => delta.scale.as_str(),
        }))
    }

    fn from_node(
        &self,
        node: Node,
        _tag: &Tag,
        _ctx: &mut SerializationContext,
    ) -> Result<Construct, ConvertError> {
        let mut node: NodeMap = node.into_mapping()?;
        Ok(complete(TimeDelta {
            jd1: Numeric::from_node(&node.required("jd1")?)?,
            jd2: Numeric::from_node(&node.required("jd2")?)?,
            format: node.required_string("format")?,
            scale: node.required_string("scale")?,
        }))
    }
}
