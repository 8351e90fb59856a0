use std::any::Any;

use asdf_astro_plugin::{astro_object, AstroObject, ConvertError, NodeMap};
use indexmap::IndexMap;

use super::{Numeric, Quantity, Unit};

/// A geocentric location on the Earth.
#[derive(Clone, Debug, PartialEq)]
pub struct EarthLocation {
    /// The geocentric x coordinate.
    pub x: Quantity,
    /// The geocentric y coordinate.
    pub y: Quantity,
    /// The geocentric z coordinate.
    pub z: Quantity,
    /// The reference ellipsoid.
    pub ellipsoid: String,
}

astro_object!(EarthLocation, "astropy.coordinates.earth.EarthLocation");

impl EarthLocation {
    /// Create a location from geocentric coordinates in `unit` on the WGS84 ellipsoid.
    #[must_use]
    pub fn from_geocentric(x: f64, y: f64, z: f64, unit: &Unit) -> Self {
        Self {
            x: Quantity::new(x, unit.clone()),
            y: Quantity::new(y, unit.clone()),
            z: Quantity::new(z, unit.clone()),
            ellipsoid: "WGS84".to_string(),
        }
    }

    /// Returns the unit shared by all coordinates, if any.
    #[must_use]
    pub fn unit(&self) -> Option<&Unit> {
        (self.x.unit == self.y.unit && self.x.unit == self.z.unit).then_some(&self.x.unit)
    }
}

/// A celestial reference frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameKind {
    /// The generic base frame.
    Base,
    /// The Celestial Intermediate Reference System.
    Cirs,
    /// The FK4 system.
    Fk4,
    /// The FK4 system without e-terms of aberration.
    Fk4NoETerms,
    /// The FK5 system.
    Fk5,
    /// Galactic coordinates.
    Galactic,
    /// Coordinates centred on the Galactic centre.
    Galactocentric,
    /// The Geocentric Celestial Reference System.
    Gcrs,
    /// The International Celestial Reference System.
    Icrs,
    /// The International Terrestrial Reference System.
    Itrs,
    /// Geocentric coordinates precessed to an equinox.
    PrecessedGeocentric,
}

impl FrameKind {
    /// Every frame kind.
    pub const ALL: [Self; 11] = [
        Self::Base,
        Self::Cirs,
        Self::Fk4,
        Self::Fk4NoETerms,
        Self::Fk5,
        Self::Galactic,
        Self::Galactocentric,
        Self::Gcrs,
        Self::Icrs,
        Self::Itrs,
        Self::PrecessedGeocentric,
    ];

    /// Returns the type key of frames of this kind.
    #[must_use]
    pub const fn type_key(self) -> &'static str {
        match self {
            Self::Base => "astropy.coordinates.baseframe.BaseCoordinateFrame",
            Self::Cirs => "astropy.coordinates.builtin_frames.cirs.CIRS",
            Self::Fk4 => "astropy.coordinates.builtin_frames.fk4.FK4",
            Self::Fk4NoETerms => "astropy.coordinates.builtin_frames.fk4.FK4NoETerms",
            Self::Fk5 => "astropy.coordinates.builtin_frames.fk5.FK5",
            Self::Galactic => "astropy.coordinates.builtin_frames.galactic.Galactic",
            Self::Galactocentric => {
                "astropy.coordinates.builtin_frames.galactocentric.Galactocentric"
            }
            Self::Gcrs => "astropy.coordinates.builtin_frames.gcrs.GCRS",
            Self::Icrs => "astropy.coordinates.builtin_frames.icrs.ICRS",
            Self::Itrs => "astropy.coordinates.builtin_frames.itrs.ITRS",
            Self::PrecessedGeocentric => {
                "astropy.coordinates.builtin_frames.gcrs.PrecessedGeocentric"
            }
        }
    }

    /// Returns the frame name used by sky coordinates, e.g. `icrs`.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Base => "baseframe",
            Self::Cirs => "cirs",
            Self::Fk4 => "fk4",
            Self::Fk4NoETerms => "fk4noeterms",
            Self::Fk5 => "fk5",
            Self::Galactic => "galactic",
            Self::Galactocentric => "galactocentric",
            Self::Gcrs => "gcrs",
            Self::Icrs => "icrs",
            Self::Itrs => "itrs",
            Self::PrecessedGeocentric => "precessedgeocentric",
        }
    }

    /// Returns the frame kind named `name`.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }

    /// Returns the names of the frame attributes, e.g. `equinox`.
    #[must_use]
    pub const fn attribute_names(self) -> &'static [&'static str] {
        match self {
            Self::Base | Self::Galactic | Self::Icrs => &[],
            Self::Cirs | Self::Itrs => &["obstime", "location"],
            Self::Fk4 | Self::Fk4NoETerms => &["equinox", "obstime"],
            Self::Fk5 => &["equinox"],
            Self::Galactocentric => &[
                "galcen_coord",
                "galcen_distance",
                "galcen_v_sun",
                "z_sun",
                "roll",
            ],
            Self::Gcrs => &["obstime", "obsgeoloc", "obsgeovel"],
            Self::PrecessedGeocentric => &["equinox", "obstime", "obsgeoloc", "obsgeovel"],
        }
    }

    /// Returns true if `name` is an attribute of any frame.
    #[must_use]
    pub fn is_attribute_name(name: &str) -> bool {
        Self::ALL
            .into_iter()
            .any(|kind| kind.attribute_names().contains(&name))
    }
}

/// Spherical coordinates attached to a [`Frame`].
#[derive(Clone, Debug, PartialEq)]
pub struct FrameData {
    /// The longitude, e.g. right ascension.
    pub lon: Quantity,
    /// The latitude, e.g. declination.
    pub lat: Quantity,
    /// The distance.
    pub distance: Option<Quantity>,
}

/// A coordinate frame, optionally with coordinate data.
#[derive(Clone, Debug, PartialEq)]
pub struct Frame {
    /// The kind of frame.
    pub kind: FrameKind,
    /// The coordinate data.
    pub data: Option<FrameData>,
    /// Frame attributes such as `equinox`, omitting unset attributes.
    pub frame_attributes: NodeMap,
}

impl Frame {
    /// Create a frame without data or attributes.
    #[must_use]
    pub fn new(kind: FrameKind) -> Self {
        Self {
            kind,
            data: None,
            frame_attributes: NodeMap::new(),
        }
    }

    /// Return the frame with `data`.
    #[must_use]
    pub fn with_data(mut self, data: FrameData) -> Self {
        self.data = Some(data);
        self
    }
}

impl AstroObject for Frame {
    fn type_key(&self) -> &'static str {
        self.kind.type_key()
    }

    fn type_ancestors(&self) -> &'static [&'static str] {
        match self.kind {
            FrameKind::Base => &[],
            _ => &["astropy.coordinates.baseframe.BaseCoordinateFrame"],
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn eq_object(&self, other: &dyn AstroObject) -> bool {
        other
            .as_any()
            .downcast_ref::<Self>()
            .is_some_and(|other| self == other)
    }
}

/// The class of a [`Representation`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RepresentationKind {
    /// `x`, `y` and `z`.
    Cartesian,
    /// The derivatives of `x`, `y` and `z`.
    CartesianDifferential,
    /// `rho`, `phi` and `z`.
    Cylindrical,
    /// The derivatives of `rho`, `phi` and `z`.
    CylindricalDifferential,
    /// `phi`, `theta` and `r`, in the physics convention.
    PhysicsSpherical,
    /// The derivatives of `phi`, `theta` and `r`.
    PhysicsSphericalDifferential,
    /// A `distance` only.
    Radial,
    /// The derivative of `distance`.
    RadialDifferential,
    /// `lon`, `lat` and `distance`.
    Spherical,
    /// The derivatives of `lon`, `lat` and `distance`.
    SphericalDifferential,
    /// As [`Self::SphericalDifferential`], with the longitude derivative scaled by `cos(lat)`.
    SphericalCosLatDifferential,
    /// `lon` and `lat` on the unit sphere.
    UnitSpherical,
    /// The derivatives of `lon` and `lat`.
    UnitSphericalDifferential,
    /// As [`Self::UnitSphericalDifferential`], with the longitude derivative scaled by `cos(lat)`.
    UnitSphericalCosLatDifferential,
}

impl RepresentationKind {
    /// Every representation kind.
    pub const ALL: [Self; 14] = [
        Self::Cartesian,
        Self::CartesianDifferential,
        Self::Cylindrical,
        Self::CylindricalDifferential,
        Self::PhysicsSpherical,
        Self::PhysicsSphericalDifferential,
        Self::Radial,
        Self::RadialDifferential,
        Self::Spherical,
        Self::SphericalDifferential,
        Self::SphericalCosLatDifferential,
        Self::UnitSpherical,
        Self::UnitSphericalDifferential,
        Self::UnitSphericalCosLatDifferential,
    ];

    /// Returns the class name, e.g. `CartesianRepresentation`.
    #[must_use]
    pub const fn class_name(self) -> &'static str {
        match self {
            Self::Cartesian => "CartesianRepresentation",
            Self::CartesianDifferential => "CartesianDifferential",
            Self::Cylindrical => "CylindricalRepresentation",
            Self::CylindricalDifferential => "CylindricalDifferential",
            Self::PhysicsSpherical => "PhysicsSphericalRepresentation",
            Self::PhysicsSphericalDifferential => "PhysicsSphericalDifferential",
            Self::Radial => "RadialRepresentation",
            Self::RadialDifferential => "RadialDifferential",
            Self::Spherical => "SphericalRepresentation",
            Self::SphericalDifferential => "SphericalDifferential",
            Self::SphericalCosLatDifferential => "SphericalCosLatDifferential",
            Self::UnitSpherical => "UnitSphericalRepresentation",
            Self::UnitSphericalDifferential => "UnitSphericalDifferential",
            Self::UnitSphericalCosLatDifferential => "UnitSphericalCosLatDifferential",
        }
    }

    /// Returns the kind with the class name `name`.
    #[must_use]
    pub fn from_class_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.class_name() == name)
    }

    /// Returns the type key of representations of this kind.
    #[must_use]
    pub const fn type_key(self) -> &'static str {
        match self {
            Self::Cartesian => {
                "astropy.coordinates.representation.cartesian.CartesianRepresentation"
            }
            Self::CartesianDifferential => {
                "astropy.coordinates.representation.cartesian.CartesianDifferential"
            }
            Self::Cylindrical => {
                "astropy.coordinates.representation.cylindrical.CylindricalRepresentation"
            }
            Self::CylindricalDifferential => {
                "astropy.coordinates.representation.cylindrical.CylindricalDifferential"
            }
            Self::PhysicsSpherical => {
                "astropy.coordinates.representation.spherical.PhysicsSphericalRepresentation"
            }
            Self::PhysicsSphericalDifferential => {
                "astropy.coordinates.representation.spherical.PhysicsSphericalDifferential"
            }
            Self::Radial => "astropy.coordinates.representation.spherical.RadialRepresentation",
            Self::RadialDifferential => {
                "astropy.coordinates.representation.spherical.RadialDifferential"
            }
            Self::Spherical => {
                "astropy.coordinates.representation.spherical.SphericalRepresentation"
            }
            Self::SphericalDifferential => {
                "astropy.coordinates.representation.spherical.SphericalDifferential"
            }
            Self::SphericalCosLatDifferential => {
                "astropy.coordinates.representation.spherical.SphericalCosLatDifferential"
            }
            Self::UnitSpherical => {
                "astropy.coordinates.representation.spherical.UnitSphericalRepresentation"
            }
            Self::UnitSphericalDifferential => {
                "astropy.coordinates.representation.spherical.UnitSphericalDifferential"
            }
            Self::UnitSphericalCosLatDifferential => {
                "astropy.coordinates.representation.spherical.UnitSphericalCosLatDifferential"
            }
        }
    }

    /// Returns the component names, in order.
    #[must_use]
    pub const fn components(self) -> &'static [&'static str] {
        match self {
            Self::Cartesian => &["x", "y", "z"],
            Self::CartesianDifferential => &["d_x", "d_y", "d_z"],
            Self::Cylindrical => &["rho", "phi", "z"],
            Self::CylindricalDifferential => &["d_rho", "d_phi", "d_z"],
            Self::PhysicsSpherical => &["phi", "theta", "r"],
            Self::PhysicsSphericalDifferential => &["d_phi", "d_theta", "d_r"],
            Self::Radial => &["distance"],
            Self::RadialDifferential => &["d_distance"],
            Self::Spherical => &["lon", "lat", "distance"],
            Self::SphericalDifferential => &["d_lon", "d_lat", "d_distance"],
            Self::SphericalCosLatDifferential => &["d_lon_coslat", "d_lat", "d_distance"],
            Self::UnitSpherical => &["lon", "lat"],
            Self::UnitSphericalDifferential => &["d_lon", "d_lat"],
            Self::UnitSphericalCosLatDifferential => &["d_lon_coslat", "d_lat"],
        }
    }
}

/// A set of coordinates in one representation, e.g. cartesian `x`, `y` and `z`.
#[derive(Clone, Debug, PartialEq)]
pub struct Representation {
    kind: RepresentationKind,
    components: Vec<Quantity>,
}

impl Representation {
    /// Create a representation of `kind` from its components in order.
    ///
    /// # Errors
    /// Returns [`ConvertError::InvalidNode`] if the number of components does not match `kind`.
    pub fn new(kind: RepresentationKind, components: Vec<Quantity>) -> Result<Self, ConvertError> {
        if components.len() != kind.components().len() {
            return Err(ConvertError::InvalidNode(format!(
                "{} has components {}, got {} values",
                kind.class_name(),
                kind.components().join(", "),
                components.len()
            )));
        }
        Ok(Self { kind, components })
    }

    /// Returns the representation kind.
    #[must_use]
    pub const fn kind(&self) -> RepresentationKind {
        self.kind
    }

    /// Returns the named components in order.
    pub fn components(&self) -> impl Iterator<Item = (&'static str, &Quantity)> {
        self.kind.components().iter().copied().zip(&self.components)
    }

    /// Returns the component `name`.
    #[must_use]
    pub fn component(&self, name: &str) -> Option<&Quantity> {
        self.components()
            .find(|(component, _)| *component == name)
            .map(|(_, value)| value)
    }
}

impl AstroObject for Representation {
    fn type_key(&self) -> &'static str {
        self.kind.type_key()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn eq_object(&self, other: &dyn AstroObject) -> bool {
        other
            .as_any()
            .downcast_ref::<Self>()
            .is_some_and(|other| self == other)
    }
}

/// Celestial coordinates in a frame, with the frame attributes they were created with.
#[derive(Clone, Debug, PartialEq)]
pub struct SkyCoord {
    /// The frame.
    pub frame: FrameKind,
    /// The representation of the coordinate data, e.g. `spherical`.
    pub representation_type: String,
    /// The differential of the velocity data, e.g. `sphericalcoslat`.
    pub differential_type: Option<String>,
    /// The coordinate components by name, e.g. `ra` and `dec`.
    pub components: IndexMap<String, Quantity>,
    /// Frame attributes, including attributes of frames the coordinates were transformed from.
    pub frame_attributes: NodeMap,
}

astro_object!(SkyCoord, "astropy.coordinates.sky_coordinate.SkyCoord");

impl SkyCoord {
    /// Create coordinates in `frame` from spherical components, e.g. `ra` and `dec`.
    #[must_use]
    pub fn new(frame: FrameKind, components: impl IntoIterator<Item = (String, Quantity)>) -> Self {
        Self {
            frame,
            representation_type: "spherical".to_string(),
            differential_type: None,
            components: components.into_iter().collect(),
            frame_attributes: NodeMap::new(),
        }
    }
}

/// A spectral coordinate, optionally with the observer and target frames.
#[derive(Clone, Debug, PartialEq)]
pub struct SpectralCoord {
    /// The value.
    pub value: Numeric,
    /// The spectral unit, e.g. `GHz`.
    pub unit: Unit,
    /// The frame of the observer.
    pub observer: Option<Frame>,
    /// The frame of the target.
    pub target: Option<Frame>,
}

astro_object!(SpectralCoord, "astropy.coordinates.spectral_coordinate.SpectralCoord");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_names() {
        for kind in FrameKind::ALL {
            assert_eq!(FrameKind::from_name(kind.name()), Some(kind));
        }
        assert_eq!(FrameKind::from_name("altaz"), None);
        assert!(FrameKind::is_attribute_name("equinox"));
        assert!(FrameKind::is_attribute_name("galcen_distance"));
        assert!(!FrameKind::is_attribute_name("ra"));
    }

    #[test]
    fn representation_components() {
        let kpc = Unit::parse("kpc").unwrap();
        let cartesian = Representation::new(
            RepresentationKind::Cartesian,
            vec![
                Quantity::new(1.0, kpc.clone()),
                Quantity::new(2.0, kpc.clone()),
                Quantity::new(3.0, kpc.clone()),
            ],
        )
        .unwrap();
        assert_eq!(cartesian.component("y").and_then(Quantity::scalar), Some(2.0));
        assert_eq!(
            cartesian.type_key(),
            "astropy.coordinates.representation.cartesian.CartesianRepresentation"
        );
        assert!(Representation::new(RepresentationKind::Radial, vec![]).is_err());
        assert_eq!(
            RepresentationKind::from_class_name("SphericalCosLatDifferential"),
            Some(RepresentationKind::SphericalCosLatDifferential)
        );
    }
}
