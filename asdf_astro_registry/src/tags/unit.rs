//! Unit and quantity tag patterns.

/// The VOUnit-constrained unit tag.
pub const UNIT: &str = "tag:stsci.edu:asdf/unit/unit-*";

/// The unconstrained astropy unit tag.
pub const ASTROPY_UNIT: &str = "tag:astropy.org:astropy/units/unit-*";

/// The quantity tag.
pub const QUANTITY: &str = "tag:stsci.edu:asdf/unit/quantity-*";

/// The unit equivalency tag.
pub const EQUIVALENCY: &str = "tag:astropy.org:astropy/units/equivalency-*";

/// The magnitude unit tag.
pub const MAGUNIT: &str = "tag:astropy.org:astropy/units/magunit-*";
