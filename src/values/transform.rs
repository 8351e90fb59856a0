//! Transform models.

mod bounding_box;
/// Model type descriptors and parameter defaults.
pub mod model_types;

use std::any::Any;

pub use bounding_box::{
    BoundingBox, BoundingBoxBuilder, CompoundBoundingBox, Interval, ModelBoundingBox, Order,
    SelectorArgument,
};
use asdf_astro_plugin::{AstroObject, ConvertError, Node, ObjectRef};
use indexmap::IndexMap;
use itertools::Itertools;
pub use model_types::{model_type, ModelType, ParameterDefault};

use super::{Equivalency, NdArray, Numeric, Quantity, Unit};

/// A binary operator combining two models into a compound model.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, derive_more::Display)]
pub enum Operator {
    /// Add the outputs.
    #[display("+")]
    Add,
    /// Subtract the outputs.
    #[display("-")]
    Subtract,
    /// Multiply the outputs.
    #[display("*")]
    Multiply,
    /// Divide the outputs.
    #[display("/")]
    Divide,
    /// Raise the left outputs to the power of the right outputs.
    #[display("**")]
    Power,
    /// Feed the left outputs into the right inputs.
    #[display("|")]
    Compose,
    /// Evaluate side by side on concatenated inputs.
    #[display("&")]
    Concatenate,
    /// Fix some inputs of the left model to constants.
    #[display("fix_inputs")]
    FixInputs,
}

impl Operator {
    /// All operators.
    pub const ALL: [Self; 8] = [
        Self::Add,
        Self::Subtract,
        Self::Multiply,
        Self::Divide,
        Self::Power,
        Self::Compose,
        Self::Concatenate,
        Self::FixInputs,
    ];

    /// Returns the operator with `symbol`, e.g. `|`.
    #[must_use]
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|operator| operator.to_string() == symbol)
    }

    /// Returns true for the arithmetic operators.
    #[must_use]
    pub const fn is_arithmetic(self) -> bool {
        matches!(
            self,
            Self::Add | Self::Subtract | Self::Multiply | Self::Divide | Self::Power
        )
    }
}

/// An input of a model, by name or position.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InputKey {
    /// The input label.
    Name(String),
    /// The input position.
    Index(usize),
}

impl InputKey {
    fn resolve<'a>(&self, inputs: &'a [String]) -> Option<&'a String> {
        match self {
            Self::Name(name) => inputs.iter().find(|input| *input == name),
            Self::Index(index) => inputs.get(*index),
        }
    }

    /// Convert the key to a string or integer node.
    #[must_use]
    pub fn to_node(&self) -> Node {
        match self {
            Self::Name(name) => Node::String(name.clone()),
            Self::Index(index) => Node::from(*index),
        }
    }

    /// Convert a string or integer node.
    ///
    /// # Errors
    /// Returns [`ConvertError::InvalidNode`] for any other node.
    pub fn from_node(node: Node) -> Result<Self, ConvertError> {
        match node {
            Node::String(name) => Ok(Self::Name(name)),
            Node::Int(index) => usize::try_from(index)
                .map(Self::Index)
                .map_err(|_| ConvertError::InvalidNode(format!("invalid input index {index}"))),
            node => Err(ConvertError::InvalidNode(format!(
                "expected an input name or index, got {}",
                node.kind()
            ))),
        }
    }
}

/// The right operand of a compound model.
#[derive(Clone, Debug, PartialEq)]
pub enum Operand {
    /// A model.
    Model(ObjectRef),
    /// The fixed values of a [`Operator::FixInputs`] model.
    FixedInputs(Vec<(InputKey, f64)>),
}

/// A model parameter.
#[derive(Clone, Debug, PartialEq)]
pub struct Parameter {
    /// The value.
    pub value: Numeric,
    /// The unit of the value.
    pub unit: Option<Unit>,
    /// True if the parameter is held fixed when fitting.
    pub fixed: bool,
    /// The lower and upper fitting bounds.
    pub bounds: (Option<f64>, Option<f64>),
}

impl Parameter {
    /// Create a free, unbounded parameter without a unit.
    #[must_use]
    pub fn new(value: impl Into<Numeric>) -> Self {
        Self {
            value: value.into(),
            unit: None,
            fixed: false,
            bounds: (None, None),
        }
    }

    /// Convert the value to a node, as a quantity if the parameter has a unit.
    #[must_use]
    pub fn to_node(&self) -> Node {
        match &self.unit {
            Some(unit) => Node::from(Quantity::new(self.value.clone(), unit.clone())),
            None => self.value.to_node(),
        }
    }

    /// Convert a number, array or quantity.
    ///
    /// # Errors
    /// Returns [`ConvertError::InvalidNode`] for any other node.
    pub fn from_node(node: &Node) -> Result<Self, ConvertError> {
        if let Node::Object(object) = node {
            let quantity = object.downcast_ref::<Quantity>().ok_or_else(|| {
                ConvertError::InvalidNode(format!(
                    "expected a parameter value, got {}",
                    object.type_key()
                ))
            })?;
            Ok(Self {
                unit: Some(quantity.unit.clone()),
                ..Self::new(quantity.value.clone())
            })
        } else {
            Numeric::from_node(node).map(Self::new)
        }
    }
}

/// An input of a units mapping model.
#[derive(Clone, Debug, PartialEq)]
pub struct UnitsMappingInput {
    /// The input label.
    pub name: String,
    /// The expected unit.
    pub unit: Option<Unit>,
    /// True if dimensionless values are accepted.
    pub allow_dimensionless: bool,
    /// The equivalencies used to convert input values.
    pub equivalencies: Option<Equivalency>,
}

/// An output of a units mapping model.
#[derive(Clone, Debug, PartialEq)]
pub struct UnitsMappingOutput {
    /// The output label.
    pub name: String,
    /// The unit attached to the output.
    pub unit: Option<Unit>,
}

/// The structure of a model beyond its named parameters.
#[derive(Clone, Debug, PartialEq)]
pub enum ModelKind {
    /// A model fully described by its parameters.
    Simple,
    /// A polynomial.
    Polynomial {
        /// The coefficients, a vector for one input or a square matrix for two.
        coefficients: NdArray,
        /// The domain of each input.
        domain: Vec<Option<Interval>>,
        /// The window of each input.
        window: Vec<Option<Interval>>,
    },
    /// The identity on `n_dims` inputs.
    Identity {
        /// The number of inputs.
        n_dims: usize,
    },
    /// A permutation, duplication or removal of inputs.
    Mapping {
        /// The input index of each output.
        mapping: Vec<usize>,
        /// The number of inputs.
        n_inputs: usize,
    },
    /// Attaches, removes or converts units.
    UnitsMapping {
        /// The inputs.
        inputs: Vec<UnitsMappingInput>,
        /// The outputs.
        outputs: Vec<UnitsMappingOutput>,
    },
    /// A rotation about a sequence of coordinate axes.
    Rotation {
        /// The axes, e.g. `zyx`.
        axes_order: String,
    },
    /// Interpolation in a lookup table.
    Tabular {
        /// The grid points of each input.
        points: Vec<NdArray>,
        /// The values at the grid points.
        lookup_table: NdArray,
        /// The interpolation method, e.g. `linear`.
        method: String,
        /// True if evaluating outside the grid is an error.
        bounds_error: bool,
        /// The value outside the grid when it is not an error.
        fill_value: Option<f64>,
    },
    /// A B-spline of one input.
    Spline {
        /// The knots.
        knots: NdArray,
        /// The coefficients.
        coefficients: NdArray,
        /// The degree.
        degree: usize,
    },
    /// Two models combined by an operator.
    Compound {
        /// The operator.
        operator: Operator,
        /// The left model.
        left: ObjectRef,
        /// The right operand.
        right: Operand,
    },
}

fn labels(prefix: &str, n: usize) -> Vec<String> {
    (0..n).map(|index| format!("{prefix}{index}")).collect()
}

fn static_labels(labels: &[&str]) -> Vec<String> {
    labels.iter().map(ToString::to_string).collect()
}

fn combine_labels(left: &[String], right: &[String]) -> Vec<String> {
    if left.iter().any(|label| right.contains(label)) {
        left.iter()
            .map(|label| format!("{label}0"))
            .chain(right.iter().map(|label| format!("{label}1")))
            .collect()
    } else {
        left.iter().chain(right).cloned().collect()
    }
}

fn validate_axes_order(axes_order: &str, n_angles: usize) -> Result<(), ConvertError> {
    if axes_order.len() != n_angles || !axes_order.chars().all(|axis| "xyz".contains(axis)) {
        return Err(ConvertError::Other(format!(
            "axes order {axes_order:?} must name one of x, y and z for each of {n_angles} angles"
        )));
    }
    Ok(())
}

fn downcast_model(
    object: &ObjectRef,
) -> Result<parking_lot::MappedRwLockReadGuard<'_, Model>, ConvertError> {
    object
        .downcast_ref::<Model>()
        .ok_or_else(|| ConvertError::Other(format!("{} is not a model", object.type_key())))
}

/// A transform model.
#[derive(Clone, Debug)]
pub struct Model {
    model_type: &'static ModelType,
    parameters: IndexMap<String, Parameter>,
    kind: ModelKind,
    name: Option<String>,
    inputs: Vec<String>,
    outputs: Vec<String>,
    default_inputs: Vec<String>,
    default_outputs: Vec<String>,
    bounding_box: Option<BoundingBox>,
    inverse: Option<ObjectRef>,
}

impl Model {
    fn with_kind(
        model_type: &'static ModelType,
        kind: ModelKind,
        inputs: Vec<String>,
        outputs: Vec<String>,
    ) -> Self {
        Self {
            model_type,
            parameters: model_type
                .parameters
                .iter()
                .map(|(name, default)| ((*name).to_string(), Parameter::new(default.to_numeric())))
                .collect(),
            kind,
            name: None,
            default_inputs: inputs.clone(),
            default_outputs: outputs.clone(),
            inputs,
            outputs,
            bounding_box: None,
            inverse: None,
        }
    }

    /// Create a model of `model_type` with default parameters.
    #[must_use]
    pub fn new(model_type: &'static ModelType) -> Self {
        Self::with_kind(
            model_type,
            ModelKind::Simple,
            static_labels(model_type.inputs),
            static_labels(model_type.outputs),
        )
    }

    /// Create a model from a type key with default parameters.
    ///
    /// # Errors
    /// Returns [`ConvertError::Other`] if the type key is not a known model type.
    pub fn from_type_key(type_key: &str) -> Result<Self, ConvertError> {
        model_type(type_key)
            .map(Self::new)
            .ok_or_else(|| ConvertError::Other(format!("unknown model type {type_key}")))
    }

    /// Return the model with parameter `name` set to `value`.
    ///
    /// # Errors
    /// Returns [`ConvertError::Other`] if the model has no parameter `name`.
    pub fn with_parameter(
        mut self,
        name: &str,
        value: impl Into<Numeric>,
    ) -> Result<Self, ConvertError> {
        self.set_parameter(name, value)?;
        Ok(self)
    }

    /// A shift by `offset`.
    #[must_use]
    pub fn shift(offset: f64) -> Self {
        Self::new(&model_types::SHIFT).with_value("offset", offset)
    }

    /// A scaling by `factor`.
    #[must_use]
    pub fn scale(factor: f64) -> Self {
        Self::new(&model_types::SCALE).with_value("factor", factor)
    }

    /// A multiplication by `factor`.
    #[must_use]
    pub fn multiply(factor: f64) -> Self {
        Self::new(&model_types::MULTIPLY).with_value("factor", factor)
    }

    /// A rotation by `angle` degrees.
    #[must_use]
    pub fn rotation2d(angle: f64) -> Self {
        Self::new(&model_types::ROTATION2D).with_value("angle", angle)
    }

    /// A one-dimensional Gaussian.
    #[must_use]
    pub fn gaussian1d(amplitude: f64, mean: f64, stddev: f64) -> Self {
        Self::new(&model_types::GAUSSIAN1D)
            .with_value("amplitude", amplitude)
            .with_value("mean", mean)
            .with_value("stddev", stddev)
    }

    /// A constant of one input.
    #[must_use]
    pub fn const1d(amplitude: f64) -> Self {
        Self::new(&model_types::CONST1D).with_value("amplitude", amplitude)
    }

    /// A constant of two inputs.
    #[must_use]
    pub fn const2d(amplitude: f64) -> Self {
        Self::new(&model_types::CONST2D).with_value("amplitude", amplitude)
    }

    fn with_value(mut self, name: &str, value: f64) -> Self {
        if let Some(parameter) = self.parameters.get_mut(name) {
            parameter.value = Numeric::Scalar(value);
        }
        self
    }

    /// The identity on `n_dims` inputs.
    #[must_use]
    pub fn identity(n_dims: usize) -> Self {
        Self::with_kind(
            &model_types::IDENTITY,
            ModelKind::Identity { n_dims },
            labels("x", n_dims),
            labels("x", n_dims),
        )
    }

    /// A mapping of `n_inputs` inputs, defaulting to one more than the largest index in `mapping`.
    #[must_use]
    pub fn mapping(mapping: Vec<usize>, n_inputs: Option<usize>) -> Self {
        let implied = mapping.iter().max().map_or(0, |max| max + 1);
        let n_inputs = n_inputs.unwrap_or(implied).max(implied);
        let n_outputs = mapping.len();
        Self::with_kind(
            &model_types::MAPPING,
            ModelKind::Mapping { mapping, n_inputs },
            labels("x", n_inputs),
            labels("x", n_outputs),
        )
    }

    /// A units mapping.
    ///
    /// # Errors
    /// Returns [`ConvertError::Other`] if the number of inputs and outputs differ.
    pub fn units_mapping(
        inputs: Vec<UnitsMappingInput>,
        outputs: Vec<UnitsMappingOutput>,
    ) -> Result<Self, ConvertError> {
        if inputs.len() != outputs.len() {
            return Err(ConvertError::Other(
                "a units mapping has one output per input".to_string(),
            ));
        }
        let input_labels = inputs.iter().map(|input| input.name.clone()).collect();
        let output_labels = outputs.iter().map(|output| output.name.clone()).collect();
        Ok(Self::with_kind(
            &model_types::UNITS_MAPPING,
            ModelKind::UnitsMapping { inputs, outputs },
            input_labels,
            output_labels,
        ))
    }

    /// A one-dimensional polynomial with `coefficients` in increasing degree.
    #[must_use]
    pub fn polynomial1d(coefficients: Vec<f64>) -> Self {
        Self::with_kind(
            &model_types::POLYNOMIAL1D,
            ModelKind::Polynomial {
                coefficients: NdArray::from_vec(coefficients),
                domain: vec![None],
                window: vec![None],
            },
            static_labels(model_types::POLYNOMIAL1D.inputs),
            static_labels(model_types::POLYNOMIAL1D.outputs),
        )
    }

    /// A two-dimensional polynomial with coefficient `c[i][j]` of `x^i y^j`.
    ///
    /// Coefficients with `i + j` above the degree are zeroed.
    ///
    /// # Errors
    /// Returns [`ConvertError::UnsupportedShape`] if `coefficients` is not a square matrix.
    pub fn polynomial2d(coefficients: &NdArray) -> Result<Self, ConvertError> {
        let &[rows, columns] = coefficients.shape() else {
            return Err(ConvertError::unsupported_shape(
                "Polynomial2D",
                "requires a two-dimensional coefficient matrix",
            ));
        };
        if rows != columns {
            return Err(ConvertError::unsupported_shape(
                "Polynomial2D",
                "coefficients must be an (n+1, n+1) matrix",
            ));
        }
        let data = (0..rows)
            .cartesian_product(0..columns)
            .map(|(i, j)| {
                if i + j < rows {
                    coefficients.get2(i, j).unwrap_or_default()
                } else {
                    0.0
                }
            })
            .collect();
        Ok(Self::with_kind(
            &model_types::POLYNOMIAL2D,
            ModelKind::Polynomial {
                coefficients: NdArray::new(vec![rows, columns], data)?,
                domain: vec![None, None],
                window: vec![None, None],
            },
            static_labels(model_types::POLYNOMIAL2D.inputs),
            static_labels(model_types::POLYNOMIAL2D.outputs),
        ))
    }

    /// A rotation between native and celestial spherical coordinates.
    ///
    /// `model_type` is [`model_types::ROTATE_NATIVE2CELESTIAL`] or
    /// [`model_types::ROTATE_CELESTIAL2NATIVE`].
    #[must_use]
    pub fn sky_rotation(
        model_type: &'static ModelType,
        lon: f64,
        lat: f64,
        lon_pole: f64,
    ) -> Self {
        Self::new(model_type)
            .with_value("lon", lon)
            .with_value("lat", lat)
            .with_value("lon_pole", lon_pole)
    }

    /// A rotation by Euler angles about the axes in `axes_order`.
    ///
    /// # Errors
    /// Returns [`ConvertError::Other`] if `axes_order` is not three of `x`, `y` and `z`.
    pub fn euler_angle_rotation(
        phi: f64,
        theta: f64,
        psi: f64,
        axes_order: &str,
    ) -> Result<Self, ConvertError> {
        validate_axes_order(axes_order, 3)?;
        let model_type = &model_types::EULER_ANGLE_ROTATION;
        Ok(Self::with_kind(
            model_type,
            ModelKind::Rotation {
                axes_order: axes_order.to_string(),
            },
            static_labels(model_type.inputs),
            static_labels(model_type.outputs),
        )
        .with_value("phi", phi)
        .with_value("theta", theta)
        .with_value("psi", psi))
    }

    /// A sequence of rotations by `angles` degrees about the axes in `axes_order`.
    ///
    /// `model_type` is [`model_types::ROTATION_SEQUENCE3D`] or
    /// [`model_types::SPHERICAL_ROTATION_SEQUENCE`].
    ///
    /// # Errors
    /// Returns [`ConvertError::Other`] if `axes_order` does not name one axis per angle.
    pub fn rotation_sequence(
        model_type: &'static ModelType,
        angles: Vec<f64>,
        axes_order: &str,
    ) -> Result<Self, ConvertError> {
        validate_axes_order(axes_order, angles.len())?;
        let mut model = Self::with_kind(
            model_type,
            ModelKind::Rotation {
                axes_order: axes_order.to_string(),
            },
            static_labels(model_type.inputs),
            static_labels(model_type.outputs),
        );
        model.set_parameter("angles", NdArray::from_vec(angles))?;
        Ok(model)
    }

    /// Linear interpolation of `lookup_table` on a grid of `points`, one array per input.
    ///
    /// # Errors
    /// Returns [`ConvertError::UnsupportedShape`] if the table is not one or two-dimensional,
    /// or [`ConvertError::Other`] if the number of point arrays differs from its dimension.
    pub fn tabular(points: Vec<NdArray>, lookup_table: NdArray) -> Result<Self, ConvertError> {
        let model_type = match lookup_table.ndim() {
            1 => &model_types::TABULAR1D,
            2 => &model_types::TABULAR2D,
            _ => {
                return Err(ConvertError::unsupported_shape(
                    "Tabular",
                    "requires a one or two-dimensional lookup table",
                ))
            }
        };
        if points.len() != lookup_table.ndim() {
            return Err(ConvertError::Other(format!(
                "a {}-dimensional lookup table requires {} point arrays, got {}",
                lookup_table.ndim(),
                lookup_table.ndim(),
                points.len()
            )));
        }
        Ok(Self::with_kind(
            model_type,
            ModelKind::Tabular {
                points,
                lookup_table,
                method: "linear".to_string(),
                bounds_error: true,
                fill_value: None,
            },
            static_labels(model_type.inputs),
            static_labels(model_type.outputs),
        ))
    }

    /// A one-dimensional B-spline.
    #[must_use]
    pub fn spline1d(knots: Vec<f64>, coefficients: Vec<f64>, degree: usize) -> Self {
        let model_type = &model_types::SPLINE1D;
        Self::with_kind(
            model_type,
            ModelKind::Spline {
                knots: NdArray::from_vec(knots),
                coefficients: NdArray::from_vec(coefficients),
                degree,
            },
            static_labels(model_type.inputs),
            static_labels(model_type.outputs),
        )
    }

    /// Combine `left` and `right` with a binary `operator`.
    ///
    /// # Errors
    /// Returns [`ConvertError::Other`] if an operand is not a model, the operator is [`Operator::FixInputs`],
    /// or the operand inputs and outputs are incompatible with the operator.
    pub fn compound(
        operator: Operator,
        left: ObjectRef,
        right: ObjectRef,
    ) -> Result<Self, ConvertError> {
        let (inputs, outputs) = {
            let left_model = downcast_model(&left)?;
            let right_model = downcast_model(&right)?;
            match operator {
                Operator::Compose => {
                    if left_model.n_outputs() != right_model.n_inputs() {
                        return Err(ConvertError::Other(format!(
                            "cannot compose a model with {} outputs with a model with {} inputs",
                            left_model.n_outputs(),
                            right_model.n_inputs()
                        )));
                    }
                    (left_model.inputs.clone(), right_model.outputs.clone())
                }
                Operator::Concatenate => (
                    combine_labels(&left_model.inputs, &right_model.inputs),
                    combine_labels(&left_model.outputs, &right_model.outputs),
                ),
                Operator::FixInputs => {
                    return Err(ConvertError::Other(
                        "use Model::fix_inputs to fix inputs".to_string(),
                    ))
                }
                _ => {
                    if left_model.n_inputs() != right_model.n_inputs()
                        || left_model.n_outputs() != right_model.n_outputs()
                    {
                        return Err(ConvertError::Other(format!(
                            "operands of {operator} must have the same number of inputs and outputs"
                        )));
                    }
                    (left_model.inputs.clone(), left_model.outputs.clone())
                }
            }
        };
        Ok(Self::with_kind(
            &model_types::COMPOUND_MODEL,
            ModelKind::Compound {
                operator,
                left,
                right: Operand::Model(right),
            },
            inputs,
            outputs,
        ))
    }

    /// Fix inputs of `left` to constant values.
    ///
    /// # Errors
    /// Returns [`ConvertError::Other`] if `left` is not a model or a key is not one of its inputs.
    pub fn fix_inputs(left: ObjectRef, fixed: Vec<(InputKey, f64)>) -> Result<Self, ConvertError> {
        let (inputs, outputs) = {
            let left_model = downcast_model(&left)?;
            let fixed_names = fixed
                .iter()
                .map(|(key, _)| {
                    key.resolve(&left_model.inputs).ok_or_else(|| {
                        ConvertError::Other(format!("{key:?} is not an input of the model"))
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;
            (
                left_model
                    .inputs
                    .iter()
                    .filter(|input| !fixed_names.contains(input))
                    .cloned()
                    .collect(),
                left_model.outputs.clone(),
            )
        };
        Ok(Self::with_kind(
            &model_types::COMPOUND_MODEL,
            ModelKind::Compound {
                operator: Operator::FixInputs,
                left,
                right: Operand::FixedInputs(fixed),
            },
            inputs,
            outputs,
        ))
    }

    /// Returns the model type.
    #[must_use]
    pub const fn model_type(&self) -> &'static ModelType {
        self.model_type
    }

    /// Returns the structure of the model.
    #[must_use]
    pub const fn kind(&self) -> &ModelKind {
        &self.kind
    }

    /// Returns the structure of the model mutably.
    pub fn kind_mut(&mut self) -> &mut ModelKind {
        &mut self.kind
    }

    /// Returns true for compound models.
    #[must_use]
    pub const fn is_compound(&self) -> bool {
        matches!(self.kind, ModelKind::Compound { .. })
    }

    /// Returns the parameters in order.
    #[must_use]
    pub fn parameters(&self) -> &IndexMap<String, Parameter> {
        &self.parameters
    }

    /// Returns the parameter `name`.
    #[must_use]
    pub fn parameter(&self, name: &str) -> Option<&Parameter> {
        self.parameters.get(name)
    }

    /// Returns the parameter `name` mutably.
    pub fn parameter_mut(&mut self, name: &str) -> Option<&mut Parameter> {
        self.parameters.get_mut(name)
    }

    /// Set the value of parameter `name`.
    ///
    /// # Errors
    /// Returns [`ConvertError::Other`] if the model has no parameter `name`.
    pub fn set_parameter(
        &mut self,
        name: &str,
        value: impl Into<Numeric>,
    ) -> Result<(), ConvertError> {
        let type_key = self.model_type.type_key;
        let parameter = self
            .parameters
            .get_mut(name)
            .ok_or_else(|| ConvertError::Other(format!("{type_key} has no parameter {name}")))?;
        parameter.value = value.into();
        Ok(())
    }

    /// Returns the name.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Set the name.
    pub fn set_name(&mut self, name: Option<String>) {
        self.name = name;
    }

    /// Return the model with `name`.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Returns the input labels.
    #[must_use]
    pub fn inputs(&self) -> &[String] {
        &self.inputs
    }

    /// Returns the output labels.
    #[must_use]
    pub fn outputs(&self) -> &[String] {
        &self.outputs
    }

    /// Returns the number of inputs.
    #[must_use]
    pub fn n_inputs(&self) -> usize {
        self.inputs.len()
    }

    /// Returns the number of outputs.
    #[must_use]
    pub fn n_outputs(&self) -> usize {
        self.outputs.len()
    }

    /// Returns true if the input labels differ from the defaults of the model type.
    #[must_use]
    pub fn has_custom_inputs(&self) -> bool {
        self.inputs != self.default_inputs
    }

    /// Returns true if the output labels differ from the defaults of the model type.
    #[must_use]
    pub fn has_custom_outputs(&self) -> bool {
        self.outputs != self.default_outputs
    }

    /// Relabel the inputs.
    ///
    /// # Errors
    /// Returns [`ConvertError::Other`] if the number of labels differs from the number of inputs.
    pub fn set_inputs(&mut self, inputs: Vec<String>) -> Result<(), ConvertError> {
        if inputs.len() != self.inputs.len() {
            return Err(ConvertError::Other(format!(
                "expected {} input labels, got {}",
                self.inputs.len(),
                inputs.len()
            )));
        }
        self.inputs = inputs;
        Ok(())
    }

    /// Relabel the outputs.
    ///
    /// # Errors
    /// Returns [`ConvertError::Other`] if the number of labels differs from the number of outputs.
    pub fn set_outputs(&mut self, outputs: Vec<String>) -> Result<(), ConvertError> {
        if outputs.len() != self.outputs.len() {
            return Err(ConvertError::Other(format!(
                "expected {} output labels, got {}",
                self.outputs.len(),
                outputs.len()
            )));
        }
        self.outputs = outputs;
        Ok(())
    }

    /// Returns the bounding box.
    #[must_use]
    pub fn bounding_box(&self) -> Option<&BoundingBox> {
        self.bounding_box.as_ref()
    }

    /// Set the bounding box.
    ///
    /// # Errors
    /// Returns [`ConvertError::InvalidNode`] if the bounding box refers to an input the model does not have.
    pub fn set_bounding_box(
        &mut self,
        bounding_box: Option<BoundingBox>,
    ) -> Result<(), ConvertError> {
        if let Some(bounding_box) = &bounding_box {
            bounding_box.validate(&self.inputs)?;
        }
        self.bounding_box = bounding_box;
        Ok(())
    }

    /// Returns the user-supplied inverse.
    #[must_use]
    pub fn inverse(&self) -> Option<&ObjectRef> {
        self.inverse.as_ref()
    }

    /// Set the user-supplied inverse.
    ///
    /// The inverse may refer back to this model.
    ///
    /// # Errors
    /// Returns [`ConvertError::Other`] if the inverse is not a model.
    pub fn set_inverse(&mut self, inverse: Option<ObjectRef>) -> Result<(), ConvertError> {
        // An inverse locked for writing is the model being modified.
        if let Some(type_key) = inverse.as_ref().and_then(ObjectRef::try_type_key) {
            if model_type(type_key).is_none() {
                return Err(ConvertError::Other(format!(
                    "the inverse of a model must be a model, got {type_key}"
                )));
            }
        }
        self.inverse = inverse;
        Ok(())
    }
}

impl PartialEq for Model {
    fn eq(&self, other: &Self) -> bool {
        let inverse_type = |model: &Self| model.inverse.as_ref().map(ObjectRef::try_type_key);
        std::ptr::eq(self.model_type, other.model_type)
            && self.parameters == other.parameters
            && self.kind == other.kind
            && self.name == other.name
            && self.inputs == other.inputs
            && self.outputs == other.outputs
            && self.bounding_box == other.bounding_box
            && inverse_type(self) == inverse_type(other)
    }
}

impl AstroObject for Model {
    fn type_key(&self) -> &'static str {
        self.model_type.type_key
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn eq_object(&self, other: &dyn AstroObject) -> bool {
        other
            .as_any()
            .downcast_ref::<Self>()
            .is_some_and(|other| self == other)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operator_symbols() {
        for operator in Operator::ALL {
            assert_eq!(Operator::from_symbol(&operator.to_string()), Some(operator));
        }
        assert_eq!(Operator::from_symbol("%"), None);
        assert!(Operator::Power.is_arithmetic());
        assert!(!Operator::Compose.is_arithmetic());
    }

    #[test]
    fn compound_labels() {
        let shift = || ObjectRef::new(Model::shift(1.0));
        let concatenated = Model::compound(Operator::Concatenate, shift(), shift()).unwrap();
        assert_eq!(concatenated.inputs(), &["x0", "x1"]);
        assert_eq!(concatenated.outputs(), &["y0", "y1"]);
        assert!(!concatenated.has_custom_inputs());

        let composed = Model::compound(
            Operator::Compose,
            ObjectRef::new(concatenated),
            ObjectRef::new(Model::rotation2d(45.0)),
        )
        .unwrap();
        assert_eq!(composed.inputs(), &["x0", "x1"]);
        assert_eq!(composed.outputs(), &["x", "y"]);

        let rotation = || ObjectRef::new(Model::rotation2d(1.0));
        assert!(Model::compound(Operator::Compose, shift(), rotation()).is_err());
        assert!(Model::compound(Operator::Add, shift(), rotation()).is_err());
    }

    #[test]
    fn fix_inputs_labels() {
        let rotation = ObjectRef::new(Model::rotation2d(10.0));
        let fixed =
            Model::fix_inputs(rotation.clone(), vec![(InputKey::Name("x".to_string()), 1.0)])
                .unwrap();
        assert_eq!(fixed.inputs(), &["y"]);
        let fixed = Model::fix_inputs(rotation.clone(), vec![(InputKey::Index(1), 1.0)]).unwrap();
        assert_eq!(fixed.inputs(), &["x"]);
        assert!(Model::fix_inputs(rotation, vec![(InputKey::Index(2), 1.0)]).is_err());
    }

    #[test]
    fn model_parameters() {
        let mut model = Model::gaussian1d(2.0, 1.0, 0.5);
        assert_eq!(model.parameter("mean").unwrap().value, Numeric::Scalar(1.0));
        model.set_parameter("stddev", 3.0).unwrap();
        assert!(model.set_parameter("offset", 3.0).is_err());
        let default =
            Model::from_type_key("astropy.modeling.functional_models.Gaussian1D").unwrap();
        assert_eq!(default.parameter("stddev").unwrap().value, Numeric::Scalar(1.0));
        assert_ne!(model, default);
    }

    #[test]
    fn model_inverse() {
        let model = ObjectRef::new(Model::shift(1.0));
        let mut other = Model::shift(-1.0);
        other.set_inverse(Some(model.clone())).unwrap();
        assert!(other.set_inverse(Some(ObjectRef::new(Unit::dimensionless()))).is_err());

        // an inverse referring to the model itself
        let mut guard = model.downcast_mut::<Model>().unwrap();
        guard.set_inverse(Some(model.clone())).unwrap();
    }

    #[test]
    fn rotation_axes_order() {
        let rotation = Model::euler_angle_rotation(10.0, 20.0, 30.0, "zxz").unwrap();
        assert_eq!(rotation.inputs(), &["alpha", "delta"]);
        assert!(Model::euler_angle_rotation(10.0, 20.0, 30.0, "zx").is_err());
        assert!(Model::euler_angle_rotation(10.0, 20.0, 30.0, "abc").is_err());

        let sequence =
            Model::rotation_sequence(&model_types::ROTATION_SEQUENCE3D, vec![1.0, 2.0], "zy")
                .unwrap();
        assert_eq!(sequence.n_inputs(), 3);
        assert_eq!(
            sequence.parameter("angles").unwrap().value,
            Numeric::Array(NdArray::from_vec(vec![1.0, 2.0]))
        );
        assert!(
            Model::rotation_sequence(&model_types::ROTATION_SEQUENCE3D, vec![1.0], "zy").is_err()
        );
    }

    #[test]
    fn tabular_dimensions() {
        let table = NdArray::from_rows(vec![vec![1.0, 2.0], vec![3.0, 4.0]]).unwrap();
        let points = || vec![NdArray::from_vec(vec![0.0, 1.0]), NdArray::from_vec(vec![0.0, 1.0])];
        let tabular = Model::tabular(points(), table.clone()).unwrap();
        assert_eq!(tabular.type_key(), "astropy.modeling.tabular.Tabular2D");
        assert_eq!(tabular.inputs(), &["x0", "x1"]);
        assert!(Model::tabular(points()[..1].to_vec(), table).is_err());
        let cube = NdArray::new(vec![1, 1, 1], vec![0.0]).unwrap();
        assert!(Model::tabular(points(), cube).unwrap_err().is_type_error());
    }

    #[test]
    fn polynomial2d_coefficients() {
        let square = NdArray::from_rows(vec![vec![1.0, 2.0], vec![3.0, 4.0]]).unwrap();
        let model = Model::polynomial2d(&square).unwrap();
        let ModelKind::Polynomial { coefficients, .. } = model.kind() else {
            panic!("expected a polynomial");
        };
        assert_eq!(coefficients.data(), &[1.0, 2.0, 3.0, 0.0]);
        let error = Model::polynomial2d(&NdArray::from_rows(vec![vec![1.0, 2.0]]).unwrap())
            .unwrap_err();
        assert!(error.is_type_error());
    }
}
