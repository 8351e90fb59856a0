use std::{collections::HashMap, sync::LazyLock};

use crate::values::{NdArray, Numeric};

/// The default value of a model parameter.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ParameterDefault {
    /// A scalar.
    Scalar(f64),
    /// An array with a shape and row-major elements.
    Array(&'static [usize], &'static [f64]),
}

impl ParameterDefault {
    /// Returns the default as a [`Numeric`].
    #[must_use]
    pub fn to_numeric(self) -> Numeric {
        match self {
            Self::Scalar(value) => Numeric::Scalar(value),
            Self::Array(shape, data) => NdArray::new(shape.to_vec(), data.to_vec())
                .map_or(Numeric::Scalar(0.0), Numeric::Array),
        }
    }
}

/// A model class: its type key, parameters and default input and output labels.
#[derive(Debug)]
pub struct ModelType {
    /// The type key, e.g. `astropy.modeling.functional_models.Shift`.
    pub type_key: &'static str,
    /// The parameter names and defaults, in order.
    pub parameters: &'static [(&'static str, ParameterDefault)],
    /// The default input labels.
    pub inputs: &'static [&'static str],
    /// The default output labels.
    pub outputs: &'static [&'static str],
}

impl ModelType {
    /// Returns the default of the parameter `name`.
    #[must_use]
    pub fn parameter_default(&self, name: &str) -> Option<ParameterDefault> {
        self.parameters
            .iter()
            .find(|(parameter, _)| *parameter == name)
            .map(|(_, default)| *default)
    }
}

const X: &[&str] = &["x"];
const Y: &[&str] = &["y"];
const XY: &[&str] = &["x", "y"];
const Z: &[&str] = &["z"];
const PHI_THETA: &[&str] = &["phi", "theta"];
const X0_X1: &[&str] = &["x0", "x1"];
const Y0_Y1: &[&str] = &["y0", "y1"];
const XYZ: &[&str] = &["x", "y", "z"];
const LON_LAT: &[&str] = &["lon", "lat"];
const ALPHA_DELTA: &[&str] = &["alpha", "delta"];
const NATIVE: &[&str] = &["phi_N", "theta_N"];
const CELESTIAL: &[&str] = &["alpha_C", "delta_C"];
const NONE: &[&str] = &[];

use ParameterDefault::Scalar;

macro_rules! model_type {
    (
        $name:ident,
        $key:expr,
        [$($param:expr => $default:expr),* $(,)?],
        $inputs:expr,
        $outputs:expr
    ) => {
        #[allow(missing_docs)]
        pub static $name: ModelType = ModelType {
            type_key: $key,
            parameters: &[$(($param, $default)),*],
            inputs: $inputs,
            outputs: $outputs,
        };
    };
}

model_type!(SHIFT, "astropy.modeling.functional_models.Shift", ["offset" => Scalar(0.0)], X, Y);
model_type!(SCALE, "astropy.modeling.functional_models.Scale", ["factor" => Scalar(1.0)], X, Y);
model_type!(
    MULTIPLY,
    "astropy.modeling.functional_models.Multiply",
    ["factor" => Scalar(1.0)],
    X,
    Y
);
model_type!(ROTATION2D, "astropy.modeling.rotations.Rotation2D", ["angle" => Scalar(0.0)], XY, XY);
model_type!(
    AFFINE_TRANSFORMATION2D,
    "astropy.modeling.projections.AffineTransformation2D",
    [
        "matrix" => ParameterDefault::Array(&[2, 2], &[1.0, 0.0, 0.0, 1.0]),
        "translation" => ParameterDefault::Array(&[2], &[0.0, 0.0]),
    ],
    XY,
    XY
);
model_type!(
    GAUSSIAN1D,
    "astropy.modeling.functional_models.Gaussian1D",
    ["amplitude" => Scalar(1.0), "mean" => Scalar(0.0), "stddev" => Scalar(1.0)],
    X,
    Y
);
model_type!(
    GAUSSIAN2D,
    "astropy.modeling.functional_models.Gaussian2D",
    [
        "amplitude" => Scalar(1.0),
        "x_mean" => Scalar(0.0),
        "y_mean" => Scalar(0.0),
        "x_stddev" => Scalar(1.0),
        "y_stddev" => Scalar(1.0),
        "theta" => Scalar(0.0),
    ],
    XY,
    Z
);
model_type!(
    LINEAR1D,
    "astropy.modeling.functional_models.Linear1D",
    ["slope" => Scalar(1.0), "intercept" => Scalar(0.0)],
    X,
    Y
);
model_type!(
    PLANAR2D,
    "astropy.modeling.functional_models.Planar2D",
    ["slope_x" => Scalar(1.0), "slope_y" => Scalar(1.0), "intercept" => Scalar(0.0)],
    XY,
    Z
);
model_type!(
    SINE1D,
    "astropy.modeling.functional_models.Sine1D",
    ["amplitude" => Scalar(1.0), "frequency" => Scalar(1.0), "phase" => Scalar(0.0)],
    X,
    Y
);
model_type!(
    LORENTZ1D,
    "astropy.modeling.functional_models.Lorentz1D",
    ["amplitude" => Scalar(1.0), "x_0" => Scalar(0.0), "fwhm" => Scalar(1.0)],
    X,
    Y
);
model_type!(
    BOX1D,
    "astropy.modeling.functional_models.Box1D",
    ["amplitude" => Scalar(1.0), "x_0" => Scalar(0.0), "width" => Scalar(1.0)],
    X,
    Y
);
model_type!(
    POWER_LAW1D,
    "astropy.modeling.powerlaws.PowerLaw1D",
    ["amplitude" => Scalar(1.0), "x_0" => Scalar(1.0), "alpha" => Scalar(1.0)],
    X,
    Y
);
model_type!(
    CONST1D,
    "astropy.modeling.functional_models.Const1D",
    ["amplitude" => Scalar(1.0)],
    X,
    Y
);
model_type!(
    CONST2D,
    "astropy.modeling.functional_models.Const2D",
    ["amplitude" => Scalar(1.0)],
    XY,
    Z
);
model_type!(POLYNOMIAL1D, "astropy.modeling.polynomial.Polynomial1D", [], X, Y);
model_type!(POLYNOMIAL2D, "astropy.modeling.polynomial.Polynomial2D", [], XY, Z);
model_type!(PIX2SKY_GNOMONIC, "astropy.modeling.projections.Pix2Sky_Gnomonic", [], XY, PHI_THETA);
model_type!(SKY2PIX_GNOMONIC, "astropy.modeling.projections.Sky2Pix_Gnomonic", [], PHI_THETA, XY);
model_type!(
    PIX2SKY_ZENITHAL_PERSPECTIVE,
    "astropy.modeling.projections.Pix2Sky_ZenithalPerspective",
    ["mu" => Scalar(0.0), "gamma" => Scalar(0.0)],
    XY,
    PHI_THETA
);
model_type!(
    SKY2PIX_ZENITHAL_PERSPECTIVE,
    "astropy.modeling.projections.Sky2Pix_ZenithalPerspective",
    ["mu" => Scalar(0.0), "gamma" => Scalar(0.0)],
    PHI_THETA,
    XY
);
model_type!(
    PIX2SKY_AIRY,
    "astropy.modeling.projections.Pix2Sky_Airy",
    ["theta_b" => Scalar(90.0)],
    XY,
    PHI_THETA
);
model_type!(
    SKY2PIX_AIRY,
    "astropy.modeling.projections.Sky2Pix_Airy",
    ["theta_b" => Scalar(90.0)],
    PHI_THETA,
    XY
);
model_type!(PIX2SKY_MERCATOR, "astropy.modeling.projections.Pix2Sky_Mercator", [], XY, PHI_THETA);
model_type!(SKY2PIX_MERCATOR, "astropy.modeling.projections.Sky2Pix_Mercator", [], PHI_THETA, XY);
model_type!(
    PIX2SKY_HAMMER_AITOFF,
    "astropy.modeling.projections.Pix2Sky_HammerAitoff",
    [],
    XY,
    PHI_THETA
);
model_type!(
    SKY2PIX_HAMMER_AITOFF,
    "astropy.modeling.projections.Sky2Pix_HammerAitoff",
    [],
    PHI_THETA,
    XY
);
model_type!(
    PIX2SKY_PLATE_CARREE,
    "astropy.modeling.projections.Pix2Sky_PlateCarree",
    [],
    XY,
    PHI_THETA
);
model_type!(
    SKY2PIX_PLATE_CARREE,
    "astropy.modeling.projections.Sky2Pix_PlateCarree",
    [],
    PHI_THETA,
    XY
);
model_type!(
    PIX2SKY_CONIC_EQUAL_AREA,
    "astropy.modeling.projections.Pix2Sky_ConicEqualArea",
    ["sigma" => Scalar(90.0), "delta" => Scalar(0.0)],
    XY,
    PHI_THETA
);
model_type!(
    SKY2PIX_CONIC_EQUAL_AREA,
    "astropy.modeling.projections.Sky2Pix_ConicEqualArea",
    ["sigma" => Scalar(90.0), "delta" => Scalar(0.0)],
    PHI_THETA,
    XY
);
model_type!(
    ROTATE_NATIVE2CELESTIAL,
    "astropy.modeling.rotations.RotateNative2Celestial",
    ["lon" => Scalar(0.0), "lat" => Scalar(0.0), "lon_pole" => Scalar(0.0)],
    NATIVE,
    CELESTIAL
);
model_type!(
    ROTATE_CELESTIAL2NATIVE,
    "astropy.modeling.rotations.RotateCelestial2Native",
    ["lon" => Scalar(0.0), "lat" => Scalar(0.0), "lon_pole" => Scalar(0.0)],
    CELESTIAL,
    NATIVE
);
model_type!(
    EULER_ANGLE_ROTATION,
    "astropy.modeling.rotations.EulerAngleRotation",
    ["phi" => Scalar(0.0), "theta" => Scalar(0.0), "psi" => Scalar(0.0)],
    ALPHA_DELTA,
    ALPHA_DELTA
);
model_type!(
    ROTATION_SEQUENCE3D,
    "astropy.modeling.rotations.RotationSequence3D",
    ["angles" => ParameterDefault::Array(&[0], &[])],
    XYZ,
    XYZ
);
model_type!(
    SPHERICAL_ROTATION_SEQUENCE,
    "astropy.modeling.rotations.SphericalRotationSequence",
    ["angles" => ParameterDefault::Array(&[0], &[])],
    LON_LAT,
    LON_LAT
);
model_type!(TABULAR1D, "astropy.modeling.tabular.Tabular1D", [], X, Y);
model_type!(TABULAR2D, "astropy.modeling.tabular.Tabular2D", [], X0_X1, Y);
model_type!(SPLINE1D, "astropy.modeling.spline.Spline1D", [], X, Y);
model_type!(IDENTITY, "astropy.modeling.mappings.Identity", [], NONE, NONE);
model_type!(MAPPING, "astropy.modeling.mappings.Mapping", [], NONE, NONE);
model_type!(UNITS_MAPPING, "astropy.modeling.mappings.UnitsMapping", [], NONE, NONE);
model_type!(COMPOUND_MODEL, "astropy.modeling.core.CompoundModel", [], NONE, NONE);

static MODEL_TYPES: &[&ModelType] = &[
    &SHIFT,
    &SCALE,
    &MULTIPLY,
    &ROTATION2D,
    &AFFINE_TRANSFORMATION2D,
    &GAUSSIAN1D,
    &GAUSSIAN2D,
    &LINEAR1D,
    &PLANAR2D,
    &SINE1D,
    &LORENTZ1D,
    &BOX1D,
    &POWER_LAW1D,
    &CONST1D,
    &CONST2D,
    &POLYNOMIAL1D,
    &POLYNOMIAL2D,
    &PIX2SKY_GNOMONIC,
    &SKY2PIX_GNOMONIC,
    &PIX2SKY_ZENITHAL_PERSPECTIVE,
    &SKY2PIX_ZENITHAL_PERSPECTIVE,
    &PIX2SKY_AIRY,
    &SKY2PIX_AIRY,
    &PIX2SKY_MERCATOR,
    &SKY2PIX_MERCATOR,
    &PIX2SKY_HAMMER_AITOFF,
    &SKY2PIX_HAMMER_AITOFF,
    &PIX2SKY_PLATE_CARREE,
    &SKY2PIX_PLATE_CARREE,
    &PIX2SKY_CONIC_EQUAL_AREA,
    &SKY2PIX_CONIC_EQUAL_AREA,
    &ROTATE_NATIVE2CELESTIAL,
    &ROTATE_CELESTIAL2NATIVE,
    &EULER_ANGLE_ROTATION,
    &ROTATION_SEQUENCE3D,
    &SPHERICAL_ROTATION_SEQUENCE,
    &TABULAR1D,
    &TABULAR2D,
    &SPLINE1D,
    &IDENTITY,
    &MAPPING,
    &UNITS_MAPPING,
    &COMPOUND_MODEL,
];

/// The prefix of the type keys of math function models.
pub const MATH_FUNCTIONS_PREFIX: &str = "astropy.modeling.math_functions.";

macro_rules! math_functions {
    ($($class:literal: $inputs:expr => $outputs:expr),* $(,)?) => {
        static MATH_FUNCTION_TYPES: &[ModelType] = &[$(
            ModelType {
                type_key: concat!("astropy.modeling.math_functions.", $class),
                parameters: &[],
                inputs: $inputs,
                outputs: $outputs,
            }
        ),*];
    };
}

math_functions! {
    "AbsoluteUfunc": X => Y,
    "AddUfunc": X0_X1 => Y,
    "ArccosUfunc": X => Y,
    "ArccoshUfunc": X => Y,
    "ArcsinUfunc": X => Y,
    "ArcsinhUfunc": X => Y,
    "Arctan2Ufunc": X0_X1 => Y,
    "ArctanUfunc": X => Y,
    "ArctanhUfunc": X => Y,
    "CbrtUfunc": X => Y,
    "CosUfunc": X => Y,
    "CoshUfunc": X => Y,
    "Deg2radUfunc": X => Y,
    "DegreesUfunc": X => Y,
    "DivmodUfunc": X0_X1 => Y0_Y1,
    "ExpUfunc": X => Y,
    "Exp2Ufunc": X => Y,
    "Expm1Ufunc": X => Y,
    "FabsUfunc": X => Y,
    "Floor_divideUfunc": X0_X1 => Y,
    "FmodUfunc": X0_X1 => Y,
    "HypotUfunc": X0_X1 => Y,
    "Log10Ufunc": X => Y,
    "Log1pUfunc": X => Y,
    "Log2Ufunc": X => Y,
    "LogUfunc": X => Y,
    "LogaddexpUfunc": X0_X1 => Y,
    "Logaddexp2Ufunc": X0_X1 => Y,
    "ModfUfunc": X => Y0_Y1,
    "MultiplyUfunc": X0_X1 => Y,
    "NegativeUfunc": X => Y,
    "PositiveUfunc": X => Y,
    "PowerUfunc": X0_X1 => Y,
    "Rad2degUfunc": X => Y,
    "RadiansUfunc": X => Y,
    "ReciprocalUfunc": X => Y,
    "RemainderUfunc": X0_X1 => Y,
    "RintUfunc": X => Y,
    "SinUfunc": X => Y,
    "SinhUfunc": X => Y,
    "SqrtUfunc": X => Y,
    "SquareUfunc": X => Y,
    "SubtractUfunc": X0_X1 => Y,
    "TanUfunc": X => Y,
    "TanhUfunc": X => Y,
    "True_divideUfunc": X0_X1 => Y,
}

static MODEL_TYPES_BY_KEY: LazyLock<HashMap<&'static str, &'static ModelType>> =
    LazyLock::new(|| {
        MODEL_TYPES
            .iter()
            .copied()
            .chain(MATH_FUNCTION_TYPES)
            .map(|model_type| (model_type.type_key, model_type))
            .collect()
    });

/// Returns the model type with `type_key`.
#[must_use]
pub fn model_type(type_key: &str) -> Option<&'static ModelType> {
    MODEL_TYPES_BY_KEY.get(type_key).copied()
}

/// Returns all model types other than math functions.
#[must_use]
pub fn model_types() -> &'static [&'static ModelType] {
    MODEL_TYPES
}

/// Returns the math function model types, one per supported ufunc.
#[must_use]
pub fn math_function_types() -> &'static [ModelType] {
    MATH_FUNCTION_TYPES
}
