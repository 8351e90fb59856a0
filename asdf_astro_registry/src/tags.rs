//! Tag patterns claimed by the built-in converters, grouped by domain.
//!
//! Each constant is a [`TagPattern`](crate::TagPattern) string.
//! Patterns match every version of a tag with a `*` in place of the version.

pub mod astropy;
pub mod coordinates;
pub mod fits;
pub mod table;
pub mod time;
pub mod transform;
pub mod unit;

/// The prefix of tags defined by the ASDF standard and the transform schemas.
pub const STSCI_PREFIX: &str = "tag:stsci.edu:asdf/";

/// The prefix of tags defined by astropy.
pub const ASTROPY_PREFIX: &str = "tag:astropy.org:astropy/";

/// The prefix of the transform property tags.
pub const TRANSFORM_PROPERTY_PREFIX: &str = "asdf://asdf-format.org/transform/tags/property/";
