//! ASDF Standard versions.

use crate::Version;

/// The ASDF Standard versions that documents can be written for, oldest first.
pub const SUPPORTED_VERSIONS: &[Version] = &[
    Version::new(1, 0, 0),
    Version::new(1, 1, 0),
    Version::new(1, 2, 0),
    Version::new(1, 3, 0),
    Version::new(1, 4, 0),
    Version::new(1, 5, 0),
    Version::new(1, 6, 0),
];

/// The ASDF Standard version documents are written for by default.
pub const DEFAULT_VERSION: Version = Version::new(1, 5, 0);

/// Returns true if `version` is a supported ASDF Standard version.
#[must_use]
pub fn is_supported(version: Version) -> bool {
    SUPPORTED_VERSIONS.contains(&version)
}
