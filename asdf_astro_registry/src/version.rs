//! Schema and ASDF Standard versions.

use std::{fmt, str::FromStr};

use derive_more::Display;
use serde::{Deserialize, Deserializer};
use thiserror::Error;

/// A `MAJOR.MINOR.PATCH` version.
///
/// Used both for tag versions (e.g. the `1.2.0` in `shift-1.2.0`) and for ASDF Standard versions.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Display)]
#[display("{major}.{minor}.{patch}")]
pub struct Version {
    /// The major version.
    pub major: u32,
    /// The minor version.
    pub minor: u32,
    /// The patch version.
    pub patch: u32,
}

/// An invalid version error.
#[derive(Clone, Debug, Error)]
#[error("invalid version {_0:?}, expected MAJOR.MINOR.PATCH")]
pub struct VersionParseError(String);

impl Version {
    /// Create a new version.
    #[must_use]
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }
}

impl FromStr for Version {
    type Err = VersionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || VersionParseError(s.to_string());
        let mut parts = s.trim().split('.');
        let mut next = || -> Result<u32, VersionParseError> {
            parts
                .next()
                .and_then(|part| part.parse::<u32>().ok())
                .ok_or_else(err)
        };
        let version = Self::new(next()?, next()?, next()?);
        if parts.next().is_some() {
            return Err(err());
        }
        Ok(version)
    }
}

impl TryFrom<&str> for Version {
    type Error = VersionParseError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl<'de> Deserialize<'de> for Version {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let s = String::deserialize(d)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// A version comparison operator.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Display)]
pub enum Comparator {
    /// `>=`
    #[display(">=")]
    GreaterEqual,
    /// `>`
    #[display(">")]
    Greater,
    /// `<=`
    #[display("<=")]
    LessEqual,
    /// `<`
    #[display("<")]
    Less,
    /// `==`
    #[display("==")]
    Equal,
}

impl Comparator {
    fn matches(self, lhs: Version, rhs: Version) -> bool {
        match self {
            Self::GreaterEqual => lhs >= rhs,
            Self::Greater => lhs > rhs,
            Self::LessEqual => lhs <= rhs,
            Self::Less => lhs < rhs,
            Self::Equal => lhs == rhs,
        }
    }
}

/// An invalid version requirement error.
#[derive(Clone, Debug, Error)]
#[error("invalid version requirement {_0:?}")]
pub struct VersionRequirementParseError(String);

/// A conjunction of version comparisons, such as `>= 1.1.0, < 1.6.0`.
///
/// An empty requirement matches every version.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct VersionRequirement {
    comparisons: Vec<(Comparator, Version)>,
}

impl VersionRequirement {
    /// Create a requirement from a list of comparisons.
    #[must_use]
    pub fn new(comparisons: Vec<(Comparator, Version)>) -> Self {
        Self { comparisons }
    }

    /// Create a requirement matching exactly `version`.
    #[must_use]
    pub fn exact(version: Version) -> Self {
        Self::new(vec![(Comparator::Equal, version)])
    }

    /// Create a requirement matching `version` and every later version.
    #[must_use]
    pub fn at_least(version: Version) -> Self {
        Self::new(vec![(Comparator::GreaterEqual, version)])
    }

    /// Returns true if `version` satisfies every comparison.
    #[must_use]
    pub fn matches(&self, version: Version) -> bool {
        self.comparisons
            .iter()
            .all(|(comparator, rhs)| comparator.matches(version, *rhs))
    }

    /// Returns the comparisons of the requirement.
    #[must_use]
    pub fn comparisons(&self) -> &[(Comparator, Version)] {
        &self.comparisons
    }
}

impl fmt::Display for VersionRequirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (comparator, version) in &self.comparisons {
            if !first {
                write!(f, ", ")?;
            }
            write!(f, "{comparator}{version}")?;
            first = false;
        }
        Ok(())
    }
}

impl FromStr for VersionRequirement {
    type Err = VersionRequirementParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        const OPERATORS: [(&str, Comparator); 5] = [
            (">=", Comparator::GreaterEqual),
            ("<=", Comparator::LessEqual),
            ("==", Comparator::Equal),
            (">", Comparator::Greater),
            ("<", Comparator::Less),
        ];
        let err = || VersionRequirementParseError(s.to_string());

        let mut comparisons = Vec::new();
        for clause in s.split(',').map(str::trim) {
            if clause.is_empty() {
                return Err(err());
            }
            let (comparator, version) = OPERATORS
                .iter()
                .find_map(|(prefix, comparator)| {
                    clause
                        .strip_prefix(prefix)
                        .map(|version| (*comparator, version))
                })
                .unwrap_or((Comparator::Equal, clause));
            let version: Version = version.parse().map_err(|_| err())?;
            comparisons.push((comparator, version));
        }
        Ok(Self { comparisons })
    }
}

impl<'de> Deserialize<'de> for VersionRequirement {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(deny_unknown_fields)]
        struct RequirementBounds {
            gte: Option<Version>,
            gt: Option<Version>,
            lte: Option<Version>,
            lt: Option<Version>,
        }

        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RequirementIntermediate {
            String(String),
            Bounds(RequirementBounds),
        }

        match RequirementIntermediate::deserialize(d)? {
            RequirementIntermediate::String(s) => s.parse().map_err(serde::de::Error::custom),
            RequirementIntermediate::Bounds(bounds) => {
                let comparisons = [
                    (Comparator::GreaterEqual, bounds.gte),
                    (Comparator::Greater, bounds.gt),
                    (Comparator::LessEqual, bounds.lte),
                    (Comparator::Less, bounds.lt),
                ]
                .into_iter()
                .filter_map(|(comparator, version)| version.map(|v| (comparator, v)))
                .collect::<Vec<_>>();
                if comparisons.is_empty() {
                    return Err(serde::de::Error::custom(
                        "a version requirement mapping needs at least one of gte, gt, lte, lt",
                    ));
                }
                Ok(Self { comparisons })
            }
        }
    }
}
