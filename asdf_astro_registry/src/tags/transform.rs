//! Transform tag patterns.

/// The `+` operator.
pub const ADD: &str = "tag:stsci.edu:asdf/transform/add-*";

/// The `-` operator.
pub const SUBTRACT: &str = "tag:stsci.edu:asdf/transform/subtract-*";

/// The `*` operator.
pub const MULTIPLY: &str = "tag:stsci.edu:asdf/transform/multiply-*";

/// The `/` operator.
pub const DIVIDE: &str = "tag:stsci.edu:asdf/transform/divide-*";

/// The `**` operator.
pub const POWER: &str = "tag:stsci.edu:asdf/transform/power-*";

/// The `|` operator.
pub const COMPOSE: &str = "tag:stsci.edu:asdf/transform/compose-*";

/// The `&` operator.
pub const CONCATENATE: &str = "tag:stsci.edu:asdf/transform/concatenate-*";

/// The `fix_inputs` operator.
pub const FIX_INPUTS: &str = "tag:stsci.edu:asdf/transform/fix_inputs-*";

/// The `identity` tag.
pub const IDENTITY: &str = "tag:stsci.edu:asdf/transform/identity-*";

/// The `remap_axes` tag.
pub const REMAP_AXES: &str = "tag:stsci.edu:asdf/transform/remap_axes-*";

/// The `constant` tag.
pub const CONSTANT: &str = "tag:stsci.edu:asdf/transform/constant-*";

/// The `shift` tag.
pub const SHIFT: &str = "tag:stsci.edu:asdf/transform/shift-*";

/// The `scale` tag.
pub const SCALE: &str = "tag:stsci.edu:asdf/transform/scale-*";

/// The `multiplyscale` tag.
pub const MULTIPLYSCALE: &str = "tag:stsci.edu:asdf/transform/multiplyscale-*";

/// The `rotate2d` tag.
pub const ROTATE2D: &str = "tag:stsci.edu:asdf/transform/rotate2d-*";

/// The three-dimensional rotation tag, covering sky and Euler angle rotations.
pub const ROTATE3D: &str = "tag:stsci.edu:asdf/transform/rotate3d-*";

/// The rotation sequence tag.
pub const ROTATE_SEQUENCE_3D: &str = "tag:stsci.edu:asdf/transform/rotate_sequence_3d-*";

/// The lookup table tag.
pub const TABULAR: &str = "tag:stsci.edu:asdf/transform/tabular-*";

/// The math function tag.
pub const MATH_FUNCTIONS: &str = "tag:stsci.edu:asdf/transform/math_functions-*";

/// The one-dimensional spline tag.
pub const SPLINE1D: &str = "tag:stsci.edu:asdf/transform/spline1d-*";

/// The `affine` tag.
pub const AFFINE: &str = "tag:stsci.edu:asdf/transform/affine-*";

/// The `gaussian1d` tag.
pub const GAUSSIAN1D: &str = "tag:stsci.edu:asdf/transform/gaussian1d-*";

/// The `gaussian2d` tag.
pub const GAUSSIAN2D: &str = "tag:stsci.edu:asdf/transform/gaussian2d-*";

/// The `linear1d` tag.
pub const LINEAR1D: &str = "tag:stsci.edu:asdf/transform/linear1d-*";

/// The `planar2d` tag.
pub const PLANAR2D: &str = "tag:stsci.edu:asdf/transform/planar2d-*";

/// The `sine1d` tag.
pub const SINE1D: &str = "tag:stsci.edu:asdf/transform/sine1d-*";

/// The `lorentz1d` tag.
pub const LORENTZ1D: &str = "tag:stsci.edu:asdf/transform/lorentz1d-*";

/// The `box1d` tag.
pub const BOX1D: &str = "tag:stsci.edu:asdf/transform/box1d-*";

/// The `power_law1d` tag.
pub const POWER_LAW1D: &str = "tag:stsci.edu:asdf/transform/power_law1d-*";

/// The `polynomial` tag.
pub const POLYNOMIAL: &str = "tag:stsci.edu:asdf/transform/polynomial-*";

/// The `gnomonic` tag.
pub const GNOMONIC: &str = "tag:stsci.edu:asdf/transform/gnomonic-*";

/// The `zenithal_perspective` tag.
pub const ZENITHAL_PERSPECTIVE: &str = "tag:stsci.edu:asdf/transform/zenithal_perspective-*";

/// The `airy` tag.
pub const AIRY: &str = "tag:stsci.edu:asdf/transform/airy-*";

/// The `mercator` tag.
pub const MERCATOR: &str = "tag:stsci.edu:asdf/transform/mercator-*";

/// The `hammer_aitoff` tag.
pub const HAMMER_AITOFF: &str = "tag:stsci.edu:asdf/transform/hammer_aitoff-*";

/// The `plate_carree` tag.
pub const PLATE_CARREE: &str = "tag:stsci.edu:asdf/transform/plate_carree-*";

/// The `conic_equal_area` tag.
pub const CONIC_EQUAL_AREA: &str = "tag:stsci.edu:asdf/transform/conic_equal_area-*";

/// The bounding box property tag.
pub const BOUNDING_BOX: &str = "asdf://asdf-format.org/transform/tags/property/bounding_box-*";

/// The compound bounding box property tag.
pub const COMPOUND_BOUNDING_BOX: &str =
    "asdf://asdf-format.org/transform/tags/property/compound_bounding_box-*";
