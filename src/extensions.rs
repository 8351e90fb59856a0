//! The built-in extensions.
//!
//! Extensions are listed highest priority first:
//!  1. the astropy extension,
//!  2. the coordinates extension,
//!  3. the transform extensions, newest manifest first, and
//!  4. the core extensions, newest manifest first, each combined with the units extension.

use std::sync::Arc;

use asdf_astro_plugin::{
    CompoundExtension, Converter, Extension, ExtensionBuildError, ManifestExtension,
    ResourceManager,
};
use asdf_astro_registry::{
    ASTROPY_MANIFEST, COORDINATES_MANIFEST, CORE_MANIFESTS, TRANSFORM_MANIFESTS, UNITS_MANIFEST,
};

use crate::converters::{
    transform::{
        projection_converters, simple_transform_converters, CompoundBoundingBoxConverter,
        CompoundConverter, ConstantConverter, IdentityConverter, MathFunctionsConverter,
        ModelBoundingBoxConverter, ModelConverter, PolynomialConverter, RemapAxesConverter,
        Rotate3DConverter, RotationSequenceConverter, SplineConverter, TabularConverter,
        UnitsMappingConverter,
    },
    AngleConverter, AsdfFitsConverter, AsdfTableConverter, AstropyFitsConverter,
    AstropyTableConverter, ColumnConverter, EarthLocationConverter, EquivalencyConverter,
    FrameConverter, LatitudeConverter, LegacyIcrsConverter, LongitudeConverter,
    MagUnitConverter, QuantityConverter, RepresentationConverter, SkyCoordConverter,
    SpectralCoordConverter, TimeConverter, TimeDeltaConverter, UnitConverter,
};

/// The class name recorded by older software for the transform extensions.
pub const TRANSFORM_LEGACY_CLASS_NAME: &str = "astropy.io.misc.asdf.extension.AstropyAsdfExtension";

/// The class name recorded by older software for the astropy extension.
pub const ASTROPY_LEGACY_CLASS_NAME: &str = "astropy.io.misc.asdf.extension.AstropyExtension";

/// Returns the converters of the transform extensions.
///
/// # Errors
/// Returns an [`ExtensionBuildError`] if a converter lookup table is inconsistent.
pub fn transform_converters() -> Result<Vec<Arc<dyn Converter>>, ExtensionBuildError> {
    let mut converters: Vec<Arc<dyn Converter>> = vec![
        Arc::new(ModelConverter::new(CompoundConverter::new()?)),
        Arc::new(ModelConverter::new(ConstantConverter)),
        Arc::new(ModelConverter::new(IdentityConverter)),
        Arc::new(ModelConverter::new(RemapAxesConverter)),
        Arc::new(ModelConverter::new(PolynomialConverter)),
        Arc::new(ModelConverter::new(Rotate3DConverter)),
        Arc::new(ModelConverter::new(RotationSequenceConverter)),
        Arc::new(ModelConverter::new(TabularConverter)),
        Arc::new(ModelConverter::new(MathFunctionsConverter::default())),
        Arc::new(ModelConverter::new(SplineConverter)),
    ];
    converters.extend(
        simple_transform_converters()?
            .into_iter()
            .map(|converter| Arc::new(converter) as Arc<dyn Converter>),
    );
    converters.extend(
        projection_converters()
            .into_iter()
            .map(|converter| Arc::new(converter) as Arc<dyn Converter>),
    );
    converters.push(Arc::new(ModelBoundingBoxConverter));
    converters.push(Arc::new(CompoundBoundingBoxConverter));
    Ok(converters)
}

/// Returns the converters of the coordinates extension.
#[must_use]
pub fn coordinates_converters() -> Vec<Arc<dyn Converter>> {
    let mut converters: Vec<Arc<dyn Converter>> = vec![
        Arc::new(AngleConverter),
        Arc::new(LatitudeConverter),
        Arc::new(LongitudeConverter),
        Arc::new(EarthLocationConverter),
        Arc::new(FrameConverter::icrs()),
        Arc::new(FrameConverter::fk5()),
        Arc::new(FrameConverter::galactic()),
        Arc::new(FrameConverter::base()),
        Arc::new(LegacyIcrsConverter),
        Arc::new(RepresentationConverter::default()),
        Arc::new(SkyCoordConverter),
        Arc::new(SpectralCoordConverter),
    ];
    for frame in FrameConverter::builtin_frames() {
        converters.push(Arc::new(frame));
    }
    converters
}

/// Returns the converters of the astropy extension.
#[must_use]
pub fn astropy_converters() -> Vec<Arc<dyn Converter>> {
    vec![
        Arc::new(UnitsMappingConverter),
        Arc::new(TimeDeltaConverter),
        Arc::new(AstropyTableConverter),
        Arc::new(AstropyFitsConverter),
    ]
}

/// Returns the converters of the core extensions.
///
/// These replace the default handling of core tags so that they read and write astropy values.
#[must_use]
pub fn core_converters() -> Vec<Arc<dyn Converter>> {
    vec![
        Arc::new(QuantityConverter),
        Arc::new(TimeConverter),
        Arc::new(ColumnConverter),
        Arc::new(AsdfTableConverter),
        Arc::new(AsdfFitsConverter),
    ]
}

/// Returns the converters of the units extension.
#[must_use]
pub fn units_converters() -> Vec<Arc<dyn Converter>> {
    vec![
        Arc::new(UnitConverter),
        Arc::new(EquivalencyConverter),
        Arc::new(MagUnitConverter),
    ]
}

/// Build the transform extensions, newest first.
///
/// Every transform extension shares one set of converters.
///
/// # Errors
/// Returns an [`ExtensionBuildError`] if a manifest is missing or invalid, or a converter fails to build.
pub fn transform_extensions(
    resources: &ResourceManager,
) -> Result<Vec<Arc<dyn Extension>>, ExtensionBuildError> {
    let converters = transform_converters()?;
    TRANSFORM_MANIFESTS
        .iter()
        .map(|uri| {
            let extension = ManifestExtension::from_uri(uri, resources, converters.clone())?
                .with_legacy_class_names([TRANSFORM_LEGACY_CLASS_NAME]);
            Ok(Arc::new(extension) as Arc<dyn Extension>)
        })
        .collect()
}

/// Build the core extensions, newest first.
///
/// Each combines a core manifest extension with the units extension under the identity of the core extension.
///
/// # Errors
/// Returns an [`ExtensionBuildError`] if a manifest is missing or invalid.
pub fn core_extensions(
    resources: &ResourceManager,
) -> Result<Vec<Arc<dyn Extension>>, ExtensionBuildError> {
    let core_converters = core_converters();
    let units: Arc<dyn Extension> = Arc::new(ManifestExtension::from_uri(
        UNITS_MANIFEST,
        resources,
        units_converters(),
    )?);
    CORE_MANIFESTS
        .iter()
        .map(|uri| {
            let core = ManifestExtension::from_uri(uri, resources, core_converters.clone())?;
            let compound = CompoundExtension::new(vec![Arc::new(core), units.clone()])?;
            Ok(Arc::new(compound) as Arc<dyn Extension>)
        })
        .collect()
}

/// Build every built-in extension, highest priority first.
///
/// # Errors
/// Returns an [`ExtensionBuildError`] if a manifest is missing or invalid, or a converter fails to build.
pub fn builtin_extensions(
    resources: &ResourceManager,
) -> Result<Vec<Arc<dyn Extension>>, ExtensionBuildError> {
    let astropy = ManifestExtension::from_uri(ASTROPY_MANIFEST, resources, astropy_converters())?
        .with_legacy_class_names([ASTROPY_LEGACY_CLASS_NAME]);
    let coordinates =
        ManifestExtension::from_uri(COORDINATES_MANIFEST, resources, coordinates_converters())?;

    let mut extensions: Vec<Arc<dyn Extension>> = vec![Arc::new(astropy), Arc::new(coordinates)];
    extensions.extend(transform_extensions(resources)?);
    extensions.extend(core_extensions(resources)?);
    Ok(extensions)
}
