use asdf_astro_registry::{ManifestError, TagParseError, Version};
use thiserror::Error;

/// A conversion error.
///
/// Raised by converters and the [`ExtensionManager`](crate::ExtensionManager) while converting a single value.
#[derive(Debug, Error)]
pub enum ConvertError {
    /// No converter claims the runtime type for the requested ASDF Standard version.
    #[error("{type_key} is not serializable by any installed extension for ASDF Standard {version}")]
    TypeNotSerializable {
        /// The runtime type.
        type_key: String,
        /// The requested ASDF Standard version.
        version: Version,
    },
    /// No converter claims the tag.
    #[error("no installed converter handles tag {_0}")]
    UnknownTag(String),
    /// The value cannot be represented by the tag, e.g. it has more dimensions than the tag supports.
    #[error("{tag} {reason}")]
    UnsupportedShape {
        /// The tag.
        tag: String,
        /// Why the value is not supported.
        reason: String,
    },
    /// An operand of a compound node is not a recognised value.
    #[error("unknown model type in {tag}: {operand}")]
    UnrecognizedOperand {
        /// The compound tag.
        tag: String,
        /// The stored tag (or kind) of the operand.
        operand: String,
    },
    /// A node does not have the expected structure.
    #[error("invalid node: {_0}")]
    InvalidNode(String),
    /// A tag is invalid.
    #[error(transparent)]
    TagParse(#[from] TagParseError),
    /// Other.
    #[error("{_0}")]
    Other(String),
}

impl ConvertError {
    /// Returns true if the error is a type error, raised when a value or operand is incompatible with a tag.
    #[must_use]
    pub const fn is_type_error(&self) -> bool {
        matches!(
            self,
            Self::UnsupportedShape { .. } | Self::UnrecognizedOperand { .. }
        )
    }

    /// Create an [`UnsupportedShape`](ConvertError::UnsupportedShape) error.
    #[must_use]
    pub fn unsupported_shape(tag: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::UnsupportedShape {
            tag: tag.into(),
            reason: reason.into(),
        }
    }
}

impl From<&str> for ConvertError {
    fn from(err_string: &str) -> Self {
        Self::Other(err_string.to_string())
    }
}

impl From<String> for ConvertError {
    fn from(err_string: String) -> Self {
        Self::Other(err_string)
    }
}

/// An extension build error.
///
/// These indicate a packaging bug and are raised when an extension is built, never on first use.
#[derive(Debug, Error)]
pub enum ExtensionBuildError {
    /// The resource manager has no resource with the URI.
    #[error("unknown resource {_0}")]
    UnknownResource(String),
    /// The manifest resource is invalid.
    #[error("invalid manifest {uri}: {source}")]
    InvalidManifest {
        /// The manifest URI.
        uri: String,
        /// The manifest error.
        source: ManifestError,
    },
    /// Converter lookup tables are inconsistent.
    #[error("inconsistent tables in {converter}: {reason}")]
    InconsistentTables {
        /// The converter.
        converter: &'static str,
        /// The inconsistency.
        reason: String,
    },
    /// A model type key is not registered.
    #[error("unknown model type {_0}")]
    UnknownModelType(String),
    /// A compound extension was created without members.
    #[error("a compound extension requires at least one extension")]
    EmptyCompound,
}
