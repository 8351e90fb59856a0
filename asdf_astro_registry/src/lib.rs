//! Tags, versions and manifests for the [`asdf_astro`] crate.
//!
//! ASDF documents identify the schema of each tagged node with a *tag*: a URI ending in a semantic version, such as `tag:stsci.edu:asdf/transform/shift-1.2.0`.
//! Every revision of a schema gets a new tag, so one logical concept forms a *lineage* of tags sharing a base and differing by version.
//!
//! An extension is responsible for a set of tags listed in a static *manifest*.
//! The same logical domain usually has several manifests, one per ASDF Standard lineage, each carrying an `asdf_standard_requirement`.
//!
//! This crate defines:
//!  - [`Version`] and [`VersionRequirement`],
//!  - [`Tag`] and [`TagPattern`], and the patterns claimed by the built-in converters in [`tags`],
//!  - [`Manifest`] parsing and validation, and
//!  - the manifests embedded in the crate, see [`builtin_resources`].
//!
//! ## Licence
//! `asdf_astro_registry` is licensed under either of
//!  - the Apache License, Version 2.0 <http://www.apache.org/licenses/LICENSE-2.0> or
//!  - the MIT license <http://opensource.org/licenses/MIT>, at your option.
//!
//! [`asdf_astro`]: https://docs.rs/asdf_astro/latest/asdf_astro/index.html

mod version;
pub use version::{
    Comparator, Version, VersionParseError, VersionRequirement, VersionRequirementParseError,
};

mod tag;
pub use tag::{tag_name, tag_version, Tag, TagParseError, TagPattern};

mod manifest;
pub use manifest::{Manifest, ManifestError, TagDefinition};

mod resources;
pub use resources::{
    builtin_resource, builtin_resources, ASTROPY_MANIFEST, COORDINATES_MANIFEST, CORE_MANIFESTS,
    TRANSFORM_MANIFESTS, UNITS_MANIFEST,
};

pub mod standard;
pub mod tags;
