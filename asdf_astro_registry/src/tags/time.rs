//! Time tag patterns.

/// The time tag.
pub const TIME: &str = "tag:stsci.edu:asdf/time/time-*";

/// The time delta tag.
pub const TIMEDELTA: &str = "tag:astropy.org:astropy/time/timedelta-*";
