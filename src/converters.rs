//! The converters of the built-in extensions.

mod coordinates;
mod fits;
mod quantity;
mod table;
mod time;
pub mod transform;
mod unit;

use asdf_astro_plugin::{AstroObject, Construct, ConvertError, Node, ObjectRef};

pub use coordinates::{
    AngleConverter, EarthLocationConverter, FrameConverter, LatitudeConverter, LegacyIcrsConverter,
    LongitudeConverter, RepresentationConverter, SkyCoordConverter, SpectralCoordConverter,
};
pub use fits::{AsdfFitsConverter, AstropyFitsConverter};
pub use quantity::QuantityConverter;
pub use table::{AsdfTableConverter, AstropyTableConverter, ColumnConverter};
pub use time::{TimeConverter, TimeDeltaConverter};
pub use unit::{EquivalencyConverter, MagUnitConverter, UnitConverter};

/// Downcast `object` to the value type of `converter`.
fn downcast<'a, T: AstroObject>(
    object: &'a dyn AstroObject,
    converter: &str,
) -> Result<&'a T, ConvertError> {
    object.as_any().downcast_ref::<T>().ok_or_else(|| {
        ConvertError::Other(format!("{converter} cannot convert {}", object.type_key()))
    })
}

/// Wrap a completely constructed value.
fn complete<T: AstroObject>(value: T) -> Construct {
    Construct::Complete(ObjectRef::new(value))
}

/// Clone the value of type `T` held by an object node.
fn object_value<T: AstroObject + Clone>(node: Node, expected: &str) -> Result<T, ConvertError> {
    let object = node.into_object()?;
    let value = object.downcast_ref::<T>().map(|value| T::clone(&value));
    value.ok_or_else(|| {
        ConvertError::InvalidNode(format!("expected {expected}, got {}", object.type_key()))
    })
}

