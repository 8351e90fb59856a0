//! Tags and tag patterns.
//!
//! A tag names one revision of one schema, e.g. `tag:stsci.edu:asdf/transform/shift-1.2.0` or `asdf://astropy.org/astropy/tags/units/unit-1.0.0`.
//! The portion after the final `-` is the version, and the portion between the final `/` and the final `-` is the tag *name*.
//!
//! A tag pattern replaces any portion of a tag with `*` (typically the version, e.g. `shift-*`) and is used by converters to declare the tags they handle.

use std::{
    collections::HashMap,
    fmt,
    str::FromStr,
    sync::{Arc, OnceLock, RwLock},
};

use regex::Regex;
use thiserror::Error;

use crate::{Version, VersionParseError};

/// An invalid tag error.
#[derive(Clone, Debug, Error)]
pub enum TagParseError {
    /// The tag has no `-MAJOR.MINOR.PATCH` suffix.
    #[error("tag {_0:?} has no version suffix")]
    MissingVersion(String),
    /// The tag version is invalid.
    #[error("tag {tag:?} has an invalid version: {source}")]
    InvalidVersion {
        /// The tag.
        tag: String,
        /// The version error.
        source: VersionParseError,
    },
    /// The tag is a pattern.
    #[error("tag {_0:?} contains a wildcard")]
    Wildcard(String),
}

/// A concrete, versioned tag.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Tag {
    uri: String,
    name_start: usize,
    version_start: usize,
    version: Version,
}

impl Tag {
    /// Parse a tag.
    ///
    /// # Errors
    /// Returns a [`TagParseError`] if `uri` is a pattern or does not end with a valid version.
    pub fn parse(uri: &str) -> Result<Self, TagParseError> {
        if uri.contains('*') {
            return Err(TagParseError::Wildcard(uri.to_string()));
        }
        let dash = uri
            .rfind('-')
            .ok_or_else(|| TagParseError::MissingVersion(uri.to_string()))?;
        let version = uri[dash + 1..]
            .parse::<Version>()
            .map_err(|source| TagParseError::InvalidVersion {
                tag: uri.to_string(),
                source,
            })?;
        let name_start = uri[..dash].rfind(['/', ':']).map_or(0, |i| i + 1);
        Ok(Self {
            uri: uri.to_string(),
            name_start,
            version_start: dash + 1,
            version,
        })
    }

    /// Returns the full tag string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.uri
    }

    /// Returns the tag without its version suffix, e.g. `tag:stsci.edu:asdf/transform/shift`.
    ///
    /// Tags sharing a base form one version lineage.
    #[must_use]
    pub fn base(&self) -> &str {
        &self.uri[..self.version_start - 1]
    }

    /// Returns the tag name, e.g. `shift`.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.uri[self.name_start..self.version_start - 1]
    }

    /// Returns the tag version.
    #[must_use]
    pub const fn version(&self) -> Version {
        self.version
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.uri)
    }
}

impl FromStr for Tag {
    type Err = TagParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for Tag {
    fn as_ref(&self) -> &str {
        &self.uri
    }
}

/// A tag pattern, where `*` matches any run of characters.
#[derive(Clone, Debug)]
pub struct TagPattern {
    pattern: String,
    regex: Arc<Regex>,
}

static PATTERNS: OnceLock<RwLock<HashMap<String, Arc<Regex>>>> = OnceLock::new();

/// Returns the compiled expression for `pattern`, compiling it on first use.
fn compiled_pattern(pattern: &str) -> Arc<Regex> {
    let patterns = PATTERNS.get_or_init(|| RwLock::new(HashMap::new()));
    if let Some(regex) = patterns.read().unwrap().get(pattern) {
        return regex.clone();
    }
    let body = pattern
        .split('*')
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(".*");
    // Every character outside the wildcards is escaped, so the expression is always valid.
    let regex = Arc::new(Regex::new(&format!("^{body}$")).expect("escaped tag pattern"));
    patterns
        .write()
        .unwrap()
        .entry(pattern.to_string())
        .or_insert(regex)
        .clone()
}

impl TagPattern {
    /// Create a new tag pattern.
    ///
    /// A pattern without a wildcard matches only the identical tag.
    /// Patterns are compiled once per process and shared between instances.
    ///
    /// # Panics
    /// Panics if the pattern cache lock has been poisoned.
    #[must_use]
    pub fn new(pattern: &str) -> Self {
        Self {
            pattern: pattern.to_string(),
            regex: compiled_pattern(pattern),
        }
    }

    /// Returns the pattern string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.pattern
    }

    /// Returns true if `tag` matches the pattern.
    #[must_use]
    pub fn matches(&self, tag: &str) -> bool {
        self.regex.is_match(tag)
    }

    /// Returns true if the pattern contains a wildcard.
    #[must_use]
    pub fn is_wildcard(&self) -> bool {
        self.pattern.contains('*')
    }
}

impl PartialEq for TagPattern {
    fn eq(&self, other: &Self) -> bool {
        self.pattern == other.pattern
    }
}

impl Eq for TagPattern {}

impl fmt::Display for TagPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.pattern)
    }
}

impl From<&str> for TagPattern {
    fn from(pattern: &str) -> Self {
        Self::new(pattern)
    }
}

/// Returns the name portion of a tag string, e.g. `shift` for `tag:stsci.edu:asdf/transform/shift-1.2.0`.
///
/// Returns [`None`] if `tag` has no version suffix.
#[must_use]
pub fn tag_name(tag: &str) -> Option<&str> {
    let dash = tag.rfind('-')?;
    let start = tag[..dash].rfind(['/', ':']).map_or(0, |i| i + 1);
    Some(&tag[start..dash])
}

/// Returns the parsed version of a tag string.
///
/// # Errors
/// Returns a [`TagParseError`] if the tag has no valid version suffix.
pub fn tag_version(tag: &str) -> Result<Version, TagParseError> {
    Tag::parse(tag).map(|tag| tag.version())
}
