//! Table tag patterns.

/// The core column tag.
pub const COLUMN: &str = "tag:stsci.edu:asdf/core/column-*";

/// The core table tag.
pub const TABLE: &str = "tag:stsci.edu:asdf/core/table-*";

/// The astropy table tag.
pub const ASTROPY_TABLE: &str = "tag:astropy.org:astropy/table/table-*";
