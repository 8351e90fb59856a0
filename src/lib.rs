//! Converters and extensions for serialising astronomy value types in [ASDF](https://asdf-standard.readthedocs.io) documents.
//!
//! Units, quantities, times, tables, FITS HDU lists, celestial coordinates and transform models are written as versioned tagged nodes and read back as runtime values.
//!
//! ## Getting Started
//! - Build a tree of [`Node`](asdf_astro_plugin::Node)s holding runtime values from [`values`].
//! - Convert it to tagged nodes with [`document::write_document`] and back with [`document::read_document`].
//! - The installed extensions and the default ASDF Standard version are held in the [`config::Config`].
//!
//! ## Example
//! ```rust
//! # use asdf_astro::{document::{read_document, write_document, ReadOptions, WriteOptions}, values::Model};
//! # use asdf_astro_plugin::{node_map, Node, ObjectRef};
//! let shift = ObjectRef::new(Model::shift(2.0));
//! let tree = Node::Mapping(node_map! { "model" => shift });
//! let document = write_document(&tree, &WriteOptions::default())?;
//!
//! let read = read_document(&document, &ReadOptions::default())?;
//! let model = read.tree.as_mapping().unwrap()["model"].as_object().unwrap().clone();
//! assert_eq!(
//!     model.downcast_ref::<Model>().unwrap().parameter("offset").unwrap().value.as_scalar(),
//!     Some(2.0)
//! );
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Supported ASDF Standard Versions
//! `1.0.0` to `1.6.0`. Documents are written with `1.5.0` by default.
//!
//! ## Extensions
//! In priority order:
//!  - `astropy-1.0.0`: units mappings, time deltas, astropy tables and FITS HDU lists.
//!  - `coordinates-1.0.0`: angles, earth locations and celestial frames.
//!  - `transform-1.5.0` to `transform-1.0.0`: transform models and bounding boxes.
//!  - `core-1.6.0` to `core-1.0.0`, each combined with `units-1.0.0`: units, quantities, times, columns, tables and FITS.
//!
//! ## Licence
//! `asdf_astro` is licensed under either of
//!  - the Apache License, Version 2.0 <http://www.apache.org/licenses/LICENSE-2.0> or
//!  - the MIT license <http://opensource.org/licenses/MIT>, at your option.

#![cfg_attr(docsrs, feature(doc_auto_cfg))]

pub mod config;
pub mod converters;
pub mod document;
pub mod extensions;
pub mod integration;
pub mod values;

pub use asdf_astro_plugin as plugin;
pub use asdf_astro_registry as registry;
