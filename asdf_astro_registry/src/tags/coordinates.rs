//! Coordinate tag patterns.

/// The angle tag.
pub const ANGLE: &str = "tag:astropy.org:astropy/coordinates/angle-*";

/// The latitude tag.
pub const LATITUDE: &str = "tag:astropy.org:astropy/coordinates/latitude-*";

/// The longitude tag.
pub const LONGITUDE: &str = "tag:astropy.org:astropy/coordinates/longitude-*";

/// The earth location tag.
pub const EARTH_LOCATION: &str = "tag:astropy.org:astropy/coordinates/earthlocation-*";

/// The base frame tag.
pub const BASEFRAME: &str = "tag:astropy.org:astropy/coordinates/frames/baseframe-*";

/// The legacy ICRS tag, where right ascension and declination are stored directly.
pub const ICRS_LEGACY: &str = "tag:astropy.org:astropy/coordinates/frames/icrs-1.0.0";

/// The ICRS tag.
pub const ICRS: &str = "tag:astropy.org:astropy/coordinates/frames/icrs-1.1.0";

/// The FK5 tag.
pub const FK5: &str = "tag:astropy.org:astropy/coordinates/frames/fk5-*";

/// The Galactic tag.
pub const GALACTIC: &str = "tag:astropy.org:astropy/coordinates/frames/galactic-*";

/// The CIRS tag.
pub const CIRS: &str = "tag:astropy.org:astropy/coordinates/frames/cirs-*";

/// The FK4 tag.
pub const FK4: &str = "tag:astropy.org:astropy/coordinates/frames/fk4-*";

/// The FK4 tag without e-terms.
pub const FK4_NO_E_TERMS: &str = "tag:astropy.org:astropy/coordinates/frames/fk4noeterms-*";

/// The Galactocentric tag.
pub const GALACTOCENTRIC: &str = "tag:astropy.org:astropy/coordinates/frames/galactocentric-*";

/// The GCRS tag.
pub const GCRS: &str = "tag:astropy.org:astropy/coordinates/frames/gcrs-*";

/// The ITRS tag.
pub const ITRS: &str = "tag:astropy.org:astropy/coordinates/frames/itrs-*";

/// The precessed geocentric tag.
pub const PRECESSED_GEOCENTRIC: &str =
    "tag:astropy.org:astropy/coordinates/frames/precessedgeocentric-*";

/// The representation tag.
pub const REPRESENTATION: &str = "tag:astropy.org:astropy/coordinates/representation-*";

/// The sky coordinate tag.
pub const SKYCOORD: &str = "tag:astropy.org:astropy/coordinates/skycoord-*";

/// The spectral coordinate tag.
pub const SPECTRALCOORD: &str = "tag:astropy.org:astropy/coordinates/spectralcoord-*";
