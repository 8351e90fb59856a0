//! Runtime value types.
//!
//! Each value type implements [`AstroObject`](asdf_astro_plugin::AstroObject) with the type key of the astropy class it models,
//! so that converters can be registered against it.

mod coordinates;
mod fits;
mod ndarray;
mod quantity;
mod table;
mod time;
pub mod transform;
mod unit;

pub use coordinates::{
    EarthLocation, Frame, FrameData, FrameKind, Representation, RepresentationKind, SkyCoord,
    SpectralCoord,
};
pub use fits::{Card, Hdu, HduData, HduKind, HduList};
pub use ndarray::{NdArray, Numeric};
pub use quantity::{Quantity, QuantityClass};
pub use table::{Column, Table};
pub use time::{asdf_format, is_guessable_format, Time, TimeDelta, TimeValue, GUESSABLE_FORMATS};
pub use transform::{
    BoundingBox, BoundingBoxBuilder, CompoundBoundingBox, InputKey, Interval, Model,
    ModelBoundingBox, ModelKind, Operand, Operator, Order, Parameter, SelectorArgument,
    UnitsMappingInput, UnitsMappingOutput,
};
pub use unit::{Equivalency, EquivalencyComponent, MagUnit, Unit, UnitFormatError};
