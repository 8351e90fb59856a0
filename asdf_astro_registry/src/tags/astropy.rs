//! Tag patterns unique to the astropy manifest.

/// The units mapping tag.
pub const UNITS_MAPPING: &str = "tag:astropy.org:astropy/transform/units_mapping-*";
