//! An in-memory ASDF document tree.
//!
//! [`write_document`] converts the runtime values of a tree into tagged nodes, and [`read_document`] converts tagged nodes back into runtime values.
//! Values referenced more than once, including values that refer to each other, are written once with an anchor and then as aliases.
//!
//! Reading and writing YAML text is out of scope: a document is a [`Node`] tree.
//!
//! ```
//! # use asdf_astro::{document::{read_document, write_document, ReadOptions, WriteOptions}, values::{Quantity, Unit}};
//! # use asdf_astro_plugin::{node_map, Node, ObjectRef};
//! let length = ObjectRef::new(Quantity::new(3.0, Unit::parse("m")?));
//! let tree = Node::Mapping(node_map! { "length" => length.clone(), "again" => length });
//! let document = write_document(&tree, &WriteOptions::default())?;
//! let read = read_document(&document, &ReadOptions::default())?;
//! let tree = read.tree.as_mapping().unwrap();
//! assert!(tree["length"].as_object().unwrap().ptr_eq(tree["again"].as_object().unwrap()));
//! # Ok::<_, Box<dyn std::error::Error>>(())
//! ```

mod reader;
mod writer;

use std::sync::Arc;

use asdf_astro_plugin::{ConvertError, Node, SerializationContext};
use asdf_astro_registry::Version;
use derive_more::Display;
use thiserror::Error;

use crate::config::{global_config, Config, UnsupportedVersionError};

/// The software recorded in the history of documents written by this crate.
pub const SOFTWARE_NAME: &str = "asdf_astro";

/// An ASDF document: a tree of tagged nodes and its metadata.
#[derive(Clone, Debug, PartialEq)]
pub struct AsdfDocument {
    /// The ASDF Standard version.
    pub version: Version,
    /// The tree.
    pub tree: Node,
    /// The history.
    pub history: History,
}

/// The history of a document.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct History {
    /// The extensions used to write the document.
    pub extensions: Vec<ExtensionMetadata>,
}

/// Metadata of an extension used to write a document.
///
/// Documents written by older software identify extensions by class name rather than URI.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExtensionMetadata {
    /// The extension URI.
    pub extension_uri: Option<String>,
    /// The legacy class name.
    pub extension_class: Option<String>,
    /// The software that provided the extension.
    pub software: Option<Software>,
}

impl ExtensionMetadata {
    /// Returns the extension URI, or the class name if there is no URI.
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.extension_uri
            .as_deref()
            .or(self.extension_class.as_deref())
    }
}

/// A software name and version.
#[derive(Clone, Debug, PartialEq, Eq, Display)]
#[display("{name} {version}")]
pub struct Software {
    /// The name.
    pub name: String,
    /// The version.
    pub version: String,
}

impl Software {
    /// Returns this crate.
    #[must_use]
    pub fn this_crate() -> Self {
        Self {
            name: SOFTWARE_NAME.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Options for [`write_document`].
#[derive(Clone, Debug, Default)]
pub struct WriteOptions {
    /// The ASDF Standard version, the configured default if [`None`].
    pub version: Option<Version>,
    /// The configuration, the [`global_config`] if [`None`].
    pub config: Option<Arc<Config>>,
}

/// Options for [`read_document`].
#[derive(Clone, Debug, Default)]
pub struct ReadOptions {
    /// The configuration, the [`global_config`] if [`None`].
    pub config: Option<Arc<Config>>,
}

/// The result of [`read_document`].
#[derive(Debug)]
pub struct ReadDocument {
    /// The tree with tagged nodes converted to runtime values.
    pub tree: Node,
    /// Problems that did not prevent reading.
    pub warnings: Vec<AsdfWarning>,
}

/// A problem that did not prevent a document from being read.
#[derive(Clone, Debug, PartialEq, Eq, Display)]
pub enum AsdfWarning {
    /// No installed converter handles a tag, so the node was kept as a raw tagged node.
    #[display("{tag} is not recognised, converting to raw tagged node at {path}")]
    UnknownTag {
        /// The tag.
        tag: String,
        /// The node path.
        path: String,
    },
    /// The document was written with an extension that is not installed.
    #[display("file was created with extension {extension}, which is not currently installed")]
    MissingExtension {
        /// The extension URI or legacy class name.
        extension: String,
    },
}

/// A document error.
#[derive(Debug, Error)]
pub enum DocumentError {
    /// A runtime value could not be written.
    #[error("failed to write {type_key} for ASDF Standard {version}: {source}")]
    Write {
        /// The runtime type.
        type_key: String,
        /// The ASDF Standard version.
        version: Version,
        /// The conversion error.
        source: ConvertError,
    },
    /// A tagged node could not be read.
    #[error("failed to read {tag} at {path}: {source}")]
    Read {
        /// The tag.
        tag: String,
        /// The node path.
        path: String,
        /// The conversion error.
        source: ConvertError,
    },
    /// The deferred fields of a tagged node could not be applied.
    #[error("failed to complete {tag} at {path}: {source}")]
    DeferredConstruction {
        /// The tag.
        tag: String,
        /// The node path.
        path: String,
        /// The conversion error.
        source: ConvertError,
    },
    /// An alias refers to an anchor that is not defined before it.
    #[error("unresolved alias *{anchor} at {path}")]
    UnresolvedAlias {
        /// The anchor.
        anchor: String,
        /// The node path.
        path: String,
    },
    /// The ASDF Standard version is not supported.
    #[error(transparent)]
    UnsupportedVersion(#[from] UnsupportedVersionError),
}

/// Join a node path and a mapping key or sequence index.
fn child_path(path: &str, key: impl std::fmt::Display) -> String {
    format!("{path}/{key}")
}

/// Write `tree` as a document.
///
/// Every [`Node::Object`] is converted by the converter registered for its type in the extensions enabled for the requested version.
///
/// # Errors
/// Returns a [`DocumentError`] if the version is not supported, or a value cannot be written.
pub fn write_document(tree: &Node, options: &WriteOptions) -> Result<AsdfDocument, DocumentError> {
    let config = options.config.clone().unwrap_or_else(global_config);
    let version = options.version.unwrap_or(config.default_version());
    let manager = Arc::new(config.extension_manager(version)?);
    let mut ctx = SerializationContext::with_extension_manager(manager.clone());

    let tree = writer::TreeWriter::new(&manager, &mut ctx).write(tree)?;

    let software = Software::this_crate();
    let extensions = ctx
        .extensions_used()
        .map(|extension_uri| {
            let extension = manager.extension(extension_uri);
            ExtensionMetadata {
                extension_uri: Some(extension_uri.to_string()),
                extension_class: extension
                    .and_then(|extension| extension.legacy_class_names().first().cloned()),
                software: Some(software.clone()),
            }
        })
        .collect();

    Ok(AsdfDocument {
        version,
        tree,
        history: History { extensions },
    })
}

/// Read the runtime values of `document`.
///
/// Tags without an installed converter are kept as raw tagged nodes and reported as a warning.
/// Extensions in the document history that are not installed are reported as a warning.
///
/// # Errors
/// Returns a [`DocumentError`] if the version is not supported, or a value cannot be read.
/// No partially read tree is returned.
pub fn read_document(
    document: &AsdfDocument,
    options: &ReadOptions,
) -> Result<ReadDocument, DocumentError> {
    let config = options.config.clone().unwrap_or_else(global_config);
    let manager = Arc::new(config.extension_manager(document.version)?);
    let mut ctx = SerializationContext::with_extension_manager(manager.clone());

    let mut warnings = missing_extensions(document, &config);
    let (tree, tree_warnings) = reader::TreeReader::new(&manager, &mut ctx).read(&document.tree)?;
    warnings.extend(tree_warnings);
    Ok(ReadDocument { tree, warnings })
}

fn missing_extensions(document: &AsdfDocument, config: &Config) -> Vec<AsdfWarning> {
    document
        .history
        .extensions
        .iter()
        .filter_map(ExtensionMetadata::id)
        .filter(|id| {
            !config.extensions().iter().any(|extension| {
                extension.extension_uri() == *id
                    || extension.legacy_class_names().iter().any(|name| name == id)
            })
        })
        .map(|id| {
            let warning = AsdfWarning::MissingExtension {
                extension: id.to_string(),
            };
            log::warn!("{warning}");
            warning
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use asdf_astro_plugin::node_map;

    use super::*;
    use crate::extensions::TRANSFORM_LEGACY_CLASS_NAME;

    fn document(extensions: Vec<ExtensionMetadata>) -> AsdfDocument {
        AsdfDocument {
            version: Version::new(1, 5, 0),
            tree: Node::Mapping(node_map! { "answer" => 42_i64 }),
            history: History { extensions },
        }
    }

    #[test]
    fn document_missing_extension() {
        let document = document(vec![
            ExtensionMetadata {
                extension_class: Some(TRANSFORM_LEGACY_CLASS_NAME.to_string()),
                ..Default::default()
            },
            ExtensionMetadata {
                extension_uri: Some("asdf://example.org/extensions/missing-1.0.0".to_string()),
                ..Default::default()
            },
        ]);
        let read = read_document(&document, &ReadOptions::default()).unwrap();
        assert_eq!(
            read.warnings,
            [AsdfWarning::MissingExtension {
                extension: "asdf://example.org/extensions/missing-1.0.0".to_string()
            }]
        );
        assert_eq!(read.tree, document.tree);
    }

    #[test]
    fn document_unsupported_version() {
        let mut document = document(Vec::new());
        document.version = Version::new(2, 0, 0);
        assert!(matches!(
            read_document(&document, &ReadOptions::default()),
            Err(DocumentError::UnsupportedVersion(_))
        ));
        let options = WriteOptions {
            version: Some(Version::new(0, 1, 0)),
            config: None,
        };
        assert!(write_document(&document.tree, &options).is_err());
    }

    #[test]
    fn document_software() {
        assert_eq!(
            Software::this_crate().to_string(),
            format!("asdf_astro {}", env!("CARGO_PKG_VERSION"))
        );
    }
}
