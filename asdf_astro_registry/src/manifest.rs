//! Extension manifests.
//!
//! A manifest is a static YAML resource listing the tags that one extension is responsible for.
//! For example:
//! ```yaml
//! id: asdf://astropy.org/astropy/manifests/units-1.0.0
//! extension_uri: asdf://astropy.org/astropy/extensions/units-1.0.0
//! asdf_standard_requirement:
//!   gte: 1.0.0
//! tags:
//! - tag_uri: tag:astropy.org:astropy/units/unit-1.0.0
//!   schema_uri: http://astropy.org/schemas/astropy/units/unit-1.0.0
//!   title: Represents a unit that is not VOUnit compliant
//! ```

use std::collections::HashSet;

use serde::Deserialize;
use thiserror::Error;

use crate::{Tag, TagParseError, VersionRequirement};

/// A tag definition in a manifest.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TagDefinition {
    /// The tag.
    pub tag_uri: String,
    /// The schema describing the tagged node.
    pub schema_uri: String,
    /// A short title.
    #[serde(default)]
    pub title: Option<String>,
    /// A longer description.
    #[serde(default)]
    pub description: Option<String>,
}

/// A validated extension manifest.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    /// The manifest URI.
    pub id: String,
    /// The URI of the extension built from this manifest.
    pub extension_uri: String,
    /// A short title.
    #[serde(default)]
    pub title: Option<String>,
    /// A longer description.
    #[serde(default)]
    pub description: Option<String>,
    /// The ASDF Standard versions the extension supports.
    pub asdf_standard_requirement: VersionRequirement,
    /// The tags, in priority order.
    pub tags: Vec<TagDefinition>,
}

/// A manifest error.
#[derive(Debug, Error)]
pub enum ManifestError {
    /// The manifest is not valid YAML or does not have the manifest structure.
    #[error("invalid manifest: {_0}")]
    Parse(#[from] serde_yaml::Error),
    /// A URI field is not an `asdf://` or `http(s)://` URI.
    #[error("manifest field `{field}` is not a URI: {value:?}")]
    InvalidUri {
        /// The field name.
        field: &'static str,
        /// The field value.
        value: String,
    },
    /// A tag is not a concrete, versioned tag.
    #[error("manifest {manifest:?} lists an invalid tag: {source}")]
    InvalidTag {
        /// The manifest id.
        manifest: String,
        /// The tag error.
        source: TagParseError,
    },
    /// A tag is listed more than once.
    #[error("manifest {manifest:?} lists tag {tag:?} more than once")]
    DuplicateTag {
        /// The manifest id.
        manifest: String,
        /// The duplicated tag.
        tag: String,
    },
}

fn is_uri(value: &str) -> bool {
    ["asdf://", "http://", "https://"]
        .iter()
        .any(|scheme| value.len() > scheme.len() && value.starts_with(scheme))
}

impl Manifest {
    /// Parse and validate a manifest from YAML.
    ///
    /// # Errors
    /// Returns a [`ManifestError`] if the manifest is malformed or fails validation.
    pub fn from_yaml(yaml: &str) -> Result<Self, ManifestError> {
        let manifest: Self = serde_yaml::from_str(yaml)?;
        manifest.validate()?;
        Ok(manifest)
    }

    /// Validate the manifest.
    ///
    /// # Errors
    /// Returns a [`ManifestError`] if a URI is malformed, a tag is not concrete, or a tag is duplicated.
    pub fn validate(&self) -> Result<(), ManifestError> {
        for (field, value) in [("id", &self.id), ("extension_uri", &self.extension_uri)] {
            if !is_uri(value) {
                return Err(ManifestError::InvalidUri {
                    field,
                    value: value.clone(),
                });
            }
        }

        let mut seen = HashSet::with_capacity(self.tags.len());
        for definition in &self.tags {
            Tag::parse(&definition.tag_uri).map_err(|source| ManifestError::InvalidTag {
                manifest: self.id.clone(),
                source,
            })?;
            if !is_uri(&definition.schema_uri) {
                return Err(ManifestError::InvalidUri {
                    field: "schema_uri",
                    value: definition.schema_uri.clone(),
                });
            }
            if !seen.insert(definition.tag_uri.as_str()) {
                return Err(ManifestError::DuplicateTag {
                    manifest: self.id.clone(),
                    tag: definition.tag_uri.clone(),
                });
            }
        }
        Ok(())
    }

    /// Returns the tag definition for `tag_uri`, if the manifest lists it.
    #[must_use]
    pub fn tag(&self, tag_uri: &str) -> Option<&TagDefinition> {
        self.tags.iter().find(|definition| definition.tag_uri == tag_uri)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Version;

    const MANIFEST: &str = r#"
id: asdf://example.org/test/manifests/test-1.0.0
extension_uri: asdf://example.org/test/extensions/test-1.0.0
asdf_standard_requirement:
  gte: 1.1.0
  lt: 1.6.0
tags:
- tag_uri: asdf://example.org/test/tags/foo-1.0.0
  schema_uri: asdf://example.org/test/schemas/foo-1.0.0
  title: Foo
- tag_uri: asdf://example.org/test/tags/bar-1.2.0
  schema_uri: asdf://example.org/test/schemas/bar-1.2.0
"#;

    #[test]
    fn manifest_parse() {
        let manifest = Manifest::from_yaml(MANIFEST).unwrap();
        assert_eq!(manifest.extension_uri, "asdf://example.org/test/extensions/test-1.0.0");
        assert_eq!(manifest.tags.len(), 2);
        assert_eq!(manifest.tags[0].title.as_deref(), Some("Foo"));
        assert!(manifest.tags[1].title.is_none());
        assert!(manifest.asdf_standard_requirement.matches(Version::new(1, 5, 0)));
        assert!(!manifest.asdf_standard_requirement.matches(Version::new(1, 6, 0)));
        assert!(manifest.tag("asdf://example.org/test/tags/bar-1.2.0").is_some());
    }

    #[test]
    fn manifest_missing_requirement() {
        let yaml = MANIFEST.replace("asdf_standard_requirement:\n  gte: 1.1.0\n  lt: 1.6.0\n", "");
        assert!(matches!(
            Manifest::from_yaml(&yaml),
            Err(ManifestError::Parse(_))
        ));
    }

    #[test]
    fn manifest_unknown_field() {
        let yaml = format!("{MANIFEST}unexpected: true\n");
        assert!(matches!(
            Manifest::from_yaml(&yaml),
            Err(ManifestError::Parse(_))
        ));
    }

    #[test]
    fn manifest_invalid_uri() {
        let yaml = MANIFEST.replace("id: asdf://", "id: ");
        assert!(matches!(
            Manifest::from_yaml(&yaml),
            Err(ManifestError::InvalidUri { field: "id", .. })
        ));
    }

    #[test]
    fn manifest_wildcard_tag() {
        let yaml = MANIFEST.replace("tags/foo-1.0.0", "tags/foo-*");
        assert!(matches!(
            Manifest::from_yaml(&yaml),
            Err(ManifestError::InvalidTag { .. })
        ));
    }

    #[test]
    fn manifest_duplicate_tag() {
        let yaml = MANIFEST.replace("tags/bar-1.2.0", "tags/foo-1.0.0");
        assert!(matches!(
            Manifest::from_yaml(&yaml),
            Err(ManifestError::DuplicateTag { .. })
        ));
    }
}
