use asdf_astro_plugin::{
    AstroObject, Construct, ConvertError, Converter, Node, NodeMap, NodeMapExt, ObjectRef,
    SerializationContext, Tag,
};
use asdf_astro_registry::tags::coordinates;

use super::{
    complete, downcast, object_value,
    quantity::{quantity_from_node, quantity_to_node, unit_from_node},
};
use crate::values::{
    EarthLocation, Frame, FrameData, FrameKind, Numeric, Quantity, QuantityClass, Representation,
    RepresentationKind, SkyCoord, SpectralCoord,
};

macro_rules! angle_converter {
    ($name:ident, $label:literal, $tag:expr, $type_key:literal, $class:expr) => {
        #[doc = concat!("Reads and writes ", $label, " quantities.")]
        #[derive(Debug, Default)]
        pub struct $name;

        impl Converter for $name {
            fn name(&self) -> &'static str {
                stringify!($name)
            }

            fn tags(&self) -> &[&'static str] {
                &[$tag]
            }

            fn types(&self) -> &[&'static str] {
                &[$type_key]
            }

            fn to_node(
                &self,
                object: &dyn AstroObject,
                _tag: &Tag,
                _ctx: &mut SerializationContext,
            ) -> Result<Node, ConvertError> {
                let angle = downcast::<Quantity>(object, self.name())?;
                Ok(Node::Mapping(quantity_to_node(angle)))
            }

            fn from_node(
                &self,
                node: Node,
                _tag: &Tag,
                _ctx: &mut SerializationContext,
            ) -> Result<Construct, ConvertError> {
                let quantity = quantity_from_node(&mut node.into_mapping()?)?;
                Ok(complete(quantity.with_class($class)))
            }
        }
    };
}

angle_converter!(
    AngleConverter,
    "angle",
    coordinates::ANGLE,
    "astropy.coordinates.angles.Angle",
    QuantityClass::Angle
);
angle_converter!(
    LatitudeConverter,
    "latitude",
    coordinates::LATITUDE,
    "astropy.coordinates.angles.Latitude",
    QuantityClass::Latitude
);

/// Reads and writes longitude quantities, which carry a `wrap_angle`.
#[derive(Debug, Default)]
pub struct LongitudeConverter;

impl Converter for LongitudeConverter {
    fn name(&self) -> &'static str {
        "LongitudeConverter"
    }

    fn tags(&self) -> &[&'static str] {
        &[coordinates::LONGITUDE]
    }

    fn types(&self) -> &[&'static str] {
        &["astropy.coordinates.angles.Longitude"]
    }

    fn to_node(
        &self,
        object: &dyn AstroObject,
        _tag: &Tag,
        _ctx: &mut SerializationContext,
    ) -> Result<Node, ConvertError> {
        let longitude = downcast::<Quantity>(object, self.name())?;
        let QuantityClass::Longitude { wrap_angle } = &longitude.class else {
            return Err(ConvertError::Other(format!(
                "{} cannot convert {}",
                self.name(),
                longitude.type_key()
            )));
        };
        let mut node = quantity_to_node(longitude);
        node.insert("wrap_angle".to_string(), Node::from(wrap_angle.as_ref().clone()));
        Ok(Node::Mapping(node))
    }

    fn from_node(
        &self,
        node: Node,
        _tag: &Tag,
        _ctx: &mut SerializationContext,
    ) -> Result<Construct, ConvertError> {
        let mut node = node.into_mapping()?;
        let wrap_angle: Quantity = object_value(node.required("wrap_angle")?, "an angle")?;
        let quantity = quantity_from_node(&mut node)?;
        Ok(complete(quantity.with_class(QuantityClass::Longitude {
            wrap_angle: Box::new(wrap_angle.with_class(QuantityClass::Angle)),
        })))
    }
}

/// Reads and writes [`EarthLocation`] as `{x, y, z, ellipsoid}`.
#[derive(Debug, Default)]
pub struct EarthLocationConverter;

impl Converter for EarthLocationConverter {
    fn name(&self) -> &'static str {
        "EarthLocationConverter"
    }

    fn tags(&self) -> &[&'static str] {
        &[coordinates::EARTH_LOCATION]
    }

    fn types(&self) -> &[&'static str] {
        &["astropy.coordinates.earth.EarthLocation"]
    }

    fn to_node(
        &self,
        object: &dyn AstroObject,
        _tag: &Tag,
        _ctx: &mut SerializationContext,
    ) -> Result<Node, ConvertError> {
        let location = downcast::<EarthLocation>(object, self.name())?;
        Ok(Node::Mapping(asdf_astro_plugin::node_map! {
            "x" => location.x.clone(),
            "y" => location.y.clone(),
            "z" => location.z.clone(),
            "ellipsoid" => location.ellipsoid.as_str(),
        }))
    }

    fn from_node(
        &self,
        node: Node,
        _tag: &Tag,
        _ctx: &mut SerializationContext,
    ) -> Result<Construct, ConvertError> {
        let mut node = node.into_mapping()?;
        Ok(complete(EarthLocation {
            x: object_value(node.required("x")?, "a quantity")?,
            y: object_value(node.required("y")?, "a quantity")?,
            z: object_value(node.required("z")?, "a quantity")?,
            ellipsoid: node
                .optional_string("ellipsoid")?
                .unwrap_or_else(|| "WGS84".to_string()),
        }))
    }
}

/// Reads and writes [`Frame`] values of one kind as `{data?, frame_attributes}`.
///
/// Frame data is written as a mapping of `lon`, `lat` and optionally `distance` quantities.
#[derive(Debug)]
pub struct FrameConverter {
    kind: FrameKind,
    tags: [&'static str; 1],
    types: [&'static str; 1],
}

impl FrameConverter {
    /// Create a converter for frames of `kind` with tag pattern `tag`.
    #[must_use]
    pub const fn new(kind: FrameKind, tag: &'static str) -> Self {
        Self {
            kind,
            tags: [tag],
            types: [kind.type_key()],
        }
    }

    /// The ICRS frame converter.
    #[must_use]
    pub const fn icrs() -> Self {
        Self::new(FrameKind::Icrs, coordinates::ICRS)
    }

    /// The FK5 frame converter.
    #[must_use]
    pub const fn fk5() -> Self {
        Self::new(FrameKind::Fk5, coordinates::FK5)
    }

    /// The galactic frame converter.
    #[must_use]
    pub const fn galactic() -> Self {
        Self::new(FrameKind::Galactic, coordinates::GALACTIC)
    }

    /// The base frame converter.
    #[must_use]
    pub const fn base() -> Self {
        Self::new(FrameKind::Base, coordinates::BASEFRAME)
    }

    /// The converters of every other frame kind.
    #[must_use]
    pub const fn builtin_frames() -> [Self; 7] {
        [
            Self::new(FrameKind::Cirs, coordinates::CIRS),
            Self::new(FrameKind::Fk4, coordinates::FK4),
            Self::new(FrameKind::Fk4NoETerms, coordinates::FK4_NO_E_TERMS),
            Self::new(FrameKind::Galactocentric, coordinates::GALACTOCENTRIC),
            Self::new(FrameKind::Gcrs, coordinates::GCRS),
            Self::new(FrameKind::Itrs, coordinates::ITRS),
            Self::new(FrameKind::PrecessedGeocentric, coordinates::PRECESSED_GEOCENTRIC),
        ]
    }
}

fn frame_data_to_node(data: &FrameData) -> Node {
    let mut node = asdf_astro_plugin::node_map! {
        "lon" => data.lon.clone(),
        "lat" => data.lat.clone(),
    };
    node.insert_some("distance", data.distance.clone());
    Node::Mapping(node)
}

fn frame_data_from_node(node: Node) -> Result<FrameData, ConvertError> {
    let mut node = node.into_mapping()?;
    Ok(FrameData {
        lon: object_value(node.required("lon")?, "a longitude")?,
        lat: object_value(node.required("lat")?, "a latitude")?,
        distance: node
            .optional("distance")
            .map(|distance| object_value(distance, "a distance"))
            .transpose()?,
    })
}

impl Converter for FrameConverter {
    fn name(&self) -> &'static str {
        "FrameConverter"
    }

    fn tags(&self) -> &[&'static str] {
        &self.tags
    }

    fn types(&self) -> &[&'static str] {
        &self.types
    }

    fn to_node(
        &self,
        object: &dyn AstroObject,
        _tag: &Tag,
        _ctx: &mut SerializationContext,
    ) -> Result<Node, ConvertError> {
        let frame = downcast::<Frame>(object, self.name())?;
        let mut node = NodeMap::new();
        node.insert_some("data", frame.data.as_ref().map(frame_data_to_node));
        node.insert(
            "frame_attributes".to_string(),
            Node::Mapping(
                frame
                    .frame_attributes
                    .iter()
                    .filter(|(_, value)| !value.is_null())
                    .map(|(key, value)| (key.clone(), value.clone()))
                    .collect(),
            ),
        );
        Ok(Node::Mapping(node))
    }

    fn from_node(
        &self,
        node: Node,
        _tag: &Tag,
        _ctx: &mut SerializationContext,
    ) -> Result<Construct, ConvertError> {
        let mut node = node.into_mapping()?;
        let data = node.optional("data").map(frame_data_from_node).transpose()?;
        let frame_attributes = node
            .optional("frame_attributes")
            .map(Node::into_mapping)
            .transpose()?
            .unwrap_or_default();
        Ok(complete(Frame {
            kind: self.kind,
            data,
            frame_attributes,
        }))
    }
}

/// Reads the `icrs-1.0.0` tag, which stores right ascension and declination inline.
///
/// The converter has no types, so ICRS frames are always written with the newer tag.
#[derive(Debug, Default)]
pub struct LegacyIcrsConverter;

impl Converter for LegacyIcrsConverter {
    fn name(&self) -> &'static str {
        "LegacyIcrsConverter"
    }

    fn tags(&self) -> &[&'static str] {
        &[coordinates::ICRS_LEGACY]
    }

    fn types(&self) -> &[&'static str] {
        &[]
    }

    fn to_node(
        &self,
        object: &dyn AstroObject,
        tag: &Tag,
        _ctx: &mut SerializationContext,
    ) -> Result<Node, ConvertError> {
        Err(ConvertError::Other(format!(
            "{} cannot be written with {tag}",
            object.type_key()
        )))
    }

    fn from_node(
        &self,
        node: Node,
        _tag: &Tag,
        _ctx: &mut SerializationContext,
    ) -> Result<Construct, ConvertError> {
        let mut node = node.into_mapping()?;
        let mut ra = node.required("ra")?.into_mapping()?;
        let mut dec = node.required("dec")?.into_mapping()?;
        let wrap_angle: Quantity = object_value(ra.required("wrap_angle")?, "an angle")?;
        let lon = Quantity {
            value: Numeric::from_node(&ra.required("value")?)?,
            unit: unit_from_node(ra.required("unit")?)?,
            class: QuantityClass::Longitude {
                wrap_angle: Box::new(wrap_angle.with_class(QuantityClass::Angle)),
            },
        };
        let lat = Quantity {
            value: Numeric::from_node(&dec.required("value")?)?,
            unit: unit_from_node(dec.required("unit")?)?,
            class: QuantityClass::Latitude,
        };
        Ok(complete(Frame::new(FrameKind::Icrs).with_data(FrameData {
            lon,
            lat,
            distance: None,
        })))
    }
}

/// Reads and writes [`Representation`] as `{type, components}`.
#[derive(Debug)]
pub struct RepresentationConverter {
    types: Vec<&'static str>,
}

impl Default for RepresentationConverter {
    fn default() -> Self {
        Self {
            types: RepresentationKind::ALL
                .into_iter()
                .map(RepresentationKind::type_key)
                .collect(),
        }
    }
}

impl Converter for RepresentationConverter {
    fn name(&self) -> &'static str {
        "RepresentationConverter"
    }

    fn tags(&self) -> &[&'static str] {
        &[coordinates::REPRESENTATION]
    }

    fn types(&self) -> &[&'static str] {
        &self.types
    }

    fn to_node(
        &self,
        object: &dyn AstroObject,
        _tag: &Tag,
        _ctx: &mut SerializationContext,
    ) -> Result<Node, ConvertError> {
        let representation = downcast::<Representation>(object, self.name())?;
        let components: NodeMap = representation
            .components()
            .map(|(name, value)| (name.to_string(), Node::from(value.clone())))
            .collect();
        Ok(Node::Mapping(asdf_astro_plugin::node_map! {
            "type" => representation.kind().class_name(),
            "components" => components,
        }))
    }

    fn from_node(
        &self,
        node: Node,
        _tag: &Tag,
        _ctx: &mut SerializationContext,
    ) -> Result<Construct, ConvertError> {
        let mut node = node.into_mapping()?;
        let class_name = node.required_string("type")?;
        let kind = RepresentationKind::from_class_name(&class_name).ok_or_else(|| {
            ConvertError::InvalidNode(format!("unknown representation type {class_name}"))
        })?;
        let mut components = node.required("components")?.into_mapping()?;
        let values = kind
            .components()
            .iter()
            .map(|name| object_value::<Quantity>(components.required(name)?, "a quantity"))
            .collect::<Result<Vec<_>, _>>()?;
        if let Some(unexpected) = components.keys().next() {
            return Err(ConvertError::InvalidNode(format!(
                "{class_name} has no component {unexpected}"
            )));
        }
        Ok(complete(Representation::new(kind, values)?))
    }
}

/// Reads and writes [`SkyCoord`] as a flat mapping of components and frame attributes.
///
/// On read, keys naming an attribute of any frame are frame attributes and the rest are
/// coordinate components.
#[derive(Debug, Default)]
pub struct SkyCoordConverter;

impl Converter for SkyCoordConverter {
    fn name(&self) -> &'static str {
        "SkyCoordConverter"
    }

    fn tags(&self) -> &[&'static str] {
        &[coordinates::SKYCOORD]
    }

    fn types(&self) -> &[&'static str] {
        &["astropy.coordinates.sky_coordinate.SkyCoord"]
    }

    fn to_node(
        &self,
        object: &dyn AstroObject,
        _tag: &Tag,
        _ctx: &mut SerializationContext,
    ) -> Result<Node, ConvertError> {
        let coord = downcast::<SkyCoord>(object, self.name())?;
        let mut node = asdf_astro_plugin::node_map! {
            "frame" => coord.frame.name(),
            "representation_type" => coord.representation_type.as_str(),
        };
        node.insert_some("differential_type", coord.differential_type.clone());
        for (name, value) in &coord.components {
            node.insert(name.clone(), Node::from(value.clone()));
        }
        for (name, value) in &coord.frame_attributes {
            if !value.is_null() {
                node.insert(name.clone(), value.clone());
            }
        }
        Ok(Node::Mapping(node))
    }

    fn from_node(
        &self,
        node: Node,
        _tag: &Tag,
        _ctx: &mut SerializationContext,
    ) -> Result<Construct, ConvertError> {
        let mut node = node.into_mapping()?;
        let frame_name = node.required_string("frame")?;
        let frame = FrameKind::from_name(&frame_name)
            .ok_or_else(|| ConvertError::InvalidNode(format!("unknown frame {frame_name}")))?;
        let mut coord = SkyCoord {
            frame,
            representation_type: node.required_string("representation_type")?,
            differential_type: node.optional_string("differential_type")?,
            components: indexmap::IndexMap::new(),
            frame_attributes: NodeMap::new(),
        };
        for (name, value) in node {
            if FrameKind::is_attribute_name(&name) {
                coord.frame_attributes.insert(name, value);
            } else {
                let value = object_value(value, "a quantity")?;
                coord.components.insert(name, value);
            }
        }
        Ok(complete(coord))
    }
}

/// Reads and writes [`SpectralCoord`] as `{value, unit, observer?, target?}`.
#[derive(Debug, Default)]
pub struct SpectralCoordConverter;

impl Converter for SpectralCoordConverter {
    fn name(&self) -> &'static str {
        "SpectralCoordConverter"
    }

    fn tags(&self) -> &[&'static str] {
        &[coordinates::SPECTRALCOORD]
    }

    fn types(&self) -> &[&'static str] {
        &["astropy.coordinates.spectral_coordinate.SpectralCoord"]
    }

    fn to_node(
        &self,
        object: &dyn AstroObject,
        _tag: &Tag,
        _ctx: &mut SerializationContext,
    ) -> Result<Node, ConvertError> {
        let coord = downcast::<SpectralCoord>(object, self.name())?;
        let mut node = asdf_astro_plugin::node_map! {
            "value" => coord.value.to_node(),
            "unit" => coord.unit.clone(),
        };
        for (key, frame) in [("observer", &coord.observer), ("target", &coord.target)] {
            node.insert_some(key, frame.clone().map(ObjectRef::new));
        }
        Ok(Node::Mapping(node))
    }

    fn from_node(
        &self,
        node: Node,
        _tag: &Tag,
        _ctx: &mut SerializationContext,
    ) -> Result<Construct, ConvertError> {
        let mut node = node.into_mapping()?;
        let mut frame = |key: &str| {
            node.optional(key)
                .map(|frame| object_value::<Frame>(frame, "a frame"))
                .transpose()
        };
        let observer = frame("observer")?;
        let target = frame("target")?;
        Ok(complete(SpectralCoord {
            value: Numeric::from_node(&node.required("value")?)?,
            unit: unit_from_node(node.required("unit")?)?,
            observer,
            target,
        }))
    }
}
