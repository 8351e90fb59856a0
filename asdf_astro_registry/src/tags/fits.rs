//! FITS tag patterns.

/// The core FITS tag.
pub const FITS: &str = "tag:stsci.edu:asdf/fits/fits-*";

/// The astropy FITS tag.
pub const ASTROPY_FITS: &str = "tag:astropy.org:astropy/fits/fits-*";
