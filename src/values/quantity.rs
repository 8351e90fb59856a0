use std::any::Any;

use asdf_astro_plugin::{AstroObject, Node, ObjectRef};

use super::{Numeric, Unit};

/// The runtime class of a [`Quantity`].
#[derive(Clone, Debug, PartialEq)]
pub enum QuantityClass {
    /// A plain quantity.
    Quantity,
    /// A distance.
    Distance,
    /// An angle.
    Angle,
    /// A latitude, restricted to [-90, 90] degrees.
    Latitude,
    /// A longitude, wrapped at `wrap_angle`.
    Longitude {
        /// The angle at which the longitude wraps.
        wrap_angle: Box<Quantity>,
    },
}

/// A number or array with a unit.
#[derive(Clone, Debug, PartialEq)]
pub struct Quantity {
    /// The value.
    pub value: Numeric,
    /// The unit.
    pub unit: Unit,
    /// The runtime class.
    pub class: QuantityClass,
}

impl Quantity {
    /// Create a plain quantity.
    #[must_use]
    pub fn new(value: impl Into<Numeric>, unit: Unit) -> Self {
        Self {
            value: value.into(),
            unit,
            class: QuantityClass::Quantity,
        }
    }

    /// Create an angle.
    #[must_use]
    pub fn angle(value: impl Into<Numeric>, unit: Unit) -> Self {
        Self::new(value, unit).with_class(QuantityClass::Angle)
    }

    /// Create a latitude.
    #[must_use]
    pub fn latitude(value: impl Into<Numeric>, unit: Unit) -> Self {
        Self::new(value, unit).with_class(QuantityClass::Latitude)
    }

    /// Create a longitude wrapped at `wrap_angle`.
    #[must_use]
    pub fn longitude(value: impl Into<Numeric>, unit: Unit, wrap_angle: Quantity) -> Self {
        Self::new(value, unit).with_class(QuantityClass::Longitude {
            wrap_angle: Box::new(wrap_angle),
        })
    }

    /// Create a distance.
    #[must_use]
    pub fn distance(value: impl Into<Numeric>, unit: Unit) -> Self {
        Self::new(value, unit).with_class(QuantityClass::Distance)
    }

    /// Return the quantity with `class`.
    #[must_use]
    pub fn with_class(mut self, class: QuantityClass) -> Self {
        self.class = class;
        self
    }

    /// Returns the scalar value.
    #[must_use]
    pub const fn scalar(&self) -> Option<f64> {
        self.value.as_scalar()
    }
}

impl AstroObject for Quantity {
    fn type_key(&self) -> &'static str {
        match self.class {
            QuantityClass::Quantity => "astropy.units.quantity.Quantity",
            QuantityClass::Distance => "astropy.coordinates.distances.Distance",
            QuantityClass::Angle => "astropy.coordinates.angles.Angle",
            QuantityClass::Latitude => "astropy.coordinates.angles.Latitude",
            QuantityClass::Longitude { .. } => "astropy.coordinates.angles.Longitude",
        }
    }

    fn type_ancestors(&self) -> &'static [&'static str] {
        match self.class {
            QuantityClass::Quantity => &[],
            QuantityClass::Distance | QuantityClass::Angle => &["astropy.units.quantity.Quantity"],
            QuantityClass::Latitude | QuantityClass::Longitude { .. } => &[
                "astropy.coordinates.angles.Angle",
                "astropy.units.quantity.Quantity",
            ],
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

impl From<Quantity> for Node {
    fn from(quantity: Quantity) -> Self {
        Node::Object(ObjectRef::new(quantity))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quantity_type_keys() {
        let deg = Unit::parse("deg").unwrap();
        let quantity = Quantity::new(1.0, deg.clone());
        assert_eq!(quantity.type_key(), "astropy.units.quantity.Quantity");
        assert!(quantity.type_ancestors().is_empty());

        let longitude = Quantity::longitude(10.0, deg.clone(), Quantity::angle(180.0, deg));
        assert_eq!(longitude.type_key(), "astropy.coordinates.angles.Longitude");
        assert_eq!(longitude.type_ancestors()[0], "astropy.coordinates.angles.Angle");
        assert_eq!(longitude.scalar(), Some(10.0));
    }
}
