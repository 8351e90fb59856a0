//! Manifests embedded in the crate.

/// A `(uri, content)` pair for every embedded manifest.
const MANIFESTS: &[(&str, &str)] = &[
    (
        "asdf://asdf-format.org/transform/manifests/transform-1.0.0",
        include_str!("../resources/manifests/transform-1.0.0.yaml"),
    ),
    (
        "asdf://asdf-format.org/transform/manifests/transform-1.1.0",
        include_str!("../resources/manifests/transform-1.1.0.yaml"),
    ),
    (
        "asdf://asdf-format.org/transform/manifests/transform-1.2.0",
        include_str!("../resources/manifests/transform-1.2.0.yaml"),
    ),
    (
        "asdf://asdf-format.org/transform/manifests/transform-1.3.0",
        include_str!("../resources/manifests/transform-1.3.0.yaml"),
    ),
    (
        "asdf://asdf-format.org/transform/manifests/transform-1.4.0",
        include_str!("../resources/manifests/transform-1.4.0.yaml"),
    ),
    (
        "asdf://asdf-format.org/transform/manifests/transform-1.5.0",
        include_str!("../resources/manifests/transform-1.5.0.yaml"),
    ),
    (
        "asdf://asdf-format.org/core/manifests/core-1.0.0",
        include_str!("../resources/manifests/core-1.0.0.yaml"),
    ),
    (
        "asdf://asdf-format.org/core/manifests/core-1.1.0",
        include_str!("../resources/manifests/core-1.1.0.yaml"),
    ),
    (
        "asdf://asdf-format.org/core/manifests/core-1.2.0",
        include_str!("../resources/manifests/core-1.2.0.yaml"),
    ),
    (
        "asdf://asdf-format.org/core/manifests/core-1.3.0",
        include_str!("../resources/manifests/core-1.3.0.yaml"),
    ),
    (
        "asdf://asdf-format.org/core/manifests/core-1.4.0",
        include_str!("../resources/manifests/core-1.4.0.yaml"),
    ),
    (
        "asdf://asdf-format.org/core/manifests/core-1.5.0",
        include_str!("../resources/manifests/core-1.5.0.yaml"),
    ),
    (
        "asdf://asdf-format.org/core/manifests/core-1.6.0",
        include_str!("../resources/manifests/core-1.6.0.yaml"),
    ),
    (
        "asdf://astropy.org/astropy/manifests/units-1.0.0",
        include_str!("../resources/manifests/units-1.0.0.yaml"),
    ),
    (
        "asdf://astropy.org/astropy/manifests/astropy-1.0.0",
        include_str!("../resources/manifests/astropy-1.0.0.yaml"),
    ),
    (
        "asdf://asdf-format.org/astronomy/coordinates/manifests/coordinates-1.0.0",
        include_str!("../resources/manifests/coordinates-1.0.0.yaml"),
    ),
];

/// The transform manifests, newest first.
pub const TRANSFORM_MANIFESTS: &[&str] = &[
    "asdf://asdf-format.org/transform/manifests/transform-1.5.0",
    "asdf://asdf-format.org/transform/manifests/transform-1.4.0",
    "asdf://asdf-format.org/transform/manifests/transform-1.3.0",
    "asdf://asdf-format.org/transform/manifests/transform-1.2.0",
    "asdf://asdf-format.org/transform/manifests/transform-1.1.0",
    "asdf://asdf-format.org/transform/manifests/transform-1.0.0",
];

/// The core manifests, newest first.
pub const CORE_MANIFESTS: &[&str] = &[
    "asdf://asdf-format.org/core/manifests/core-1.6.0",
    "asdf://asdf-format.org/core/manifests/core-1.5.0",
    "asdf://asdf-format.org/core/manifests/core-1.4.0",
    "asdf://asdf-format.org/core/manifests/core-1.3.0",
    "asdf://asdf-format.org/core/manifests/core-1.2.0",
    "asdf://asdf-format.org/core/manifests/core-1.1.0",
    "asdf://asdf-format.org/core/manifests/core-1.0.0",
];

/// The astropy units manifest.
pub const UNITS_MANIFEST: &str = "asdf://astropy.org/astropy/manifests/units-1.0.0";

/// The astropy manifest.
pub const ASTROPY_MANIFEST: &str = "asdf://astropy.org/astropy/manifests/astropy-1.0.0";

/// The coordinates manifest.
pub const COORDINATES_MANIFEST: &str =
    "asdf://asdf-format.org/astronomy/coordinates/manifests/coordinates-1.0.0";

/// Returns every embedded manifest as a `(uri, content)` pair.
#[must_use]
pub fn builtin_resources() -> &'static [(&'static str, &'static str)] {
    MANIFESTS
}

/// Returns the content of the embedded manifest with `uri`.
#[must_use]
pub fn builtin_resource(uri: &str) -> Option<&'static str> {
    MANIFESTS
        .iter()
        .find_map(|(id, content)| (*id == uri).then_some(*content))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Manifest, Tag};

    #[test]
    fn builtin_manifests_validate() {
        for (uri, content) in builtin_resources() {
            let manifest = Manifest::from_yaml(content).unwrap();
            assert_eq!(&manifest.id, uri);
        }
    }

    #[test]
    fn builtin_manifest_lists() {
        for uri in TRANSFORM_MANIFESTS
            .iter()
            .chain(CORE_MANIFESTS)
            .chain([&UNITS_MANIFEST, &ASTROPY_MANIFEST, &COORDINATES_MANIFEST])
        {
            assert!(builtin_resource(uri).is_some(), "{uri}");
        }
        assert_eq!(
            builtin_resources().len(),
            TRANSFORM_MANIFESTS.len() + CORE_MANIFESTS.len() + 3
        );
    }

    #[test]
    fn transform_tag_versions_never_decrease() {
        let manifests = TRANSFORM_MANIFESTS
            .iter()
            .rev()
            .map(|uri| Manifest::from_yaml(builtin_resource(uri).unwrap()).unwrap())
            .collect::<Vec<_>>();
        for pair in manifests.windows(2) {
            for older in &pair[0].tags {
                let older = Tag::parse(&older.tag_uri).unwrap();
                let newer = pair[1]
                    .tags
                    .iter()
                    .map(|definition| Tag::parse(&definition.tag_uri).unwrap())
                    .find(|tag| tag.base() == older.base())
                    .unwrap();
                assert!(newer.version() >= older.version(), "{older}");
            }
        }
    }
}
