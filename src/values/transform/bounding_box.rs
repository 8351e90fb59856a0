use asdf_astro_plugin::{astro_object, ConvertError, Node, ObjectRef};
use indexmap::IndexMap;
use itertools::Itertools;

/// A closed interval `(lower, upper)`.
pub type Interval = (f64, f64);

/// The order of intervals in the legacy list form of a bounding box.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, derive_more::Display)]
pub enum Order {
    /// Reverse input order (`(y, x)`).
    #[default]
    #[display("C")]
    C,
    /// Input order (`(x, y)`).
    #[display("F")]
    F,
}

impl Order {
    /// Parse `C` or `F`.
    ///
    /// # Errors
    /// Returns [`ConvertError::InvalidNode`] for any other string.
    pub fn parse(order: &str) -> Result<Self, ConvertError> {
        match order {
            "C" => Ok(Self::C),
            "F" => Ok(Self::F),
            order => Err(ConvertError::InvalidNode(format!(
                "invalid bounding box order {order:?}"
            ))),
        }
    }
}

fn check_input(inputs: &[String], name: &str) -> Result<(), ConvertError> {
    if inputs.iter().any(|input| input == name) {
        Ok(())
    } else {
        Err(ConvertError::InvalidNode(format!(
            "bounding box refers to {name}, which is not an input of the model"
        )))
    }
}

fn interval_from_node(node: &Node) -> Result<Interval, ConvertError> {
    match node.to_f64_vec()?.as_slice() {
        [lower, upper] => Ok((*lower, *upper)),
        _ => Err(ConvertError::InvalidNode(
            "a bounding box interval has two bounds".to_string(),
        )),
    }
}

/// The domain of a model: an interval per input.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ModelBoundingBox {
    /// The interval of each input that is not ignored, by input name.
    pub intervals: IndexMap<String, Interval>,
    /// Inputs without an interval.
    pub ignored: Vec<String>,
    /// The legacy list order.
    pub order: Order,
}

astro_object!(ModelBoundingBox, "astropy.modeling.bounding_box.ModelBoundingBox");

impl ModelBoundingBox {
    /// Create a bounding box from named intervals.
    #[must_use]
    pub fn new<S: Into<String>>(intervals: impl IntoIterator<Item = (S, Interval)>) -> Self {
        Self {
            intervals: intervals
                .into_iter()
                .map(|(name, interval)| (name.into(), interval))
                .collect(),
            ..Self::default()
        }
    }

    /// Check that every interval and ignored input names one of `inputs`.
    ///
    /// # Errors
    /// Returns [`ConvertError::InvalidNode`] for an unknown input.
    pub fn validate(&self, inputs: &[String]) -> Result<(), ConvertError> {
        self.intervals
            .keys()
            .chain(&self.ignored)
            .try_for_each(|name| check_input(inputs, name))
    }

    fn ordered_inputs<'a>(order: Order, inputs: &'a [String]) -> Vec<&'a String> {
        match order {
            Order::C => inputs.iter().rev().collect(),
            Order::F => inputs.iter().collect(),
        }
    }

    /// Convert to the legacy list form written inline in a model node.
    ///
    /// A model with one input is written as `[lower, upper]`, otherwise as a list of intervals in [`Order`].
    ///
    /// # Errors
    /// Returns [`ConvertError::InvalidNode`] if an input has no interval.
    pub fn to_legacy_node(&self, inputs: &[String]) -> Result<Node, ConvertError> {
        let interval = |name: &String| {
            self.intervals
                .get(name)
                .map(|(lower, upper)| Node::from_f64s(&[*lower, *upper]))
                .ok_or_else(|| {
                    ConvertError::InvalidNode(format!("bounding box has no interval for {name}"))
                })
        };
        if let [input] = inputs {
            return interval(input);
        }
        Self::ordered_inputs(self.order, inputs)
            .into_iter()
            .filter(|input| !self.ignored.contains(*input))
            .map(interval)
            .collect::<Result<_, _>>()
            .map(Node::Sequence)
    }

    /// Convert the legacy list form for a model with `inputs`.
    ///
    /// # Errors
    /// Returns [`ConvertError::InvalidNode`] if the list does not have an interval per input.
    pub fn from_legacy_node(node: &Node, inputs: &[String]) -> Result<Self, ConvertError> {
        if let [input] = inputs {
            return Ok(Self::new([(input.clone(), interval_from_node(node)?)]));
        }
        let intervals = node
            .as_sequence()
            .ok_or_else(|| ConvertError::InvalidNode("expected a list of intervals".to_string()))?;
        if intervals.len() != inputs.len() {
            return Err(ConvertError::InvalidNode(format!(
                "bounding box has {} intervals for {} inputs",
                intervals.len(),
                inputs.len()
            )));
        }
        Ok(Self::new(
            Self::ordered_inputs(Order::C, inputs)
                .into_iter()
                .zip(intervals)
                .map(|(input, interval)| {
                    Ok::<_, ConvertError>((input.clone(), interval_from_node(interval)?))
                })
                .collect::<Result<Vec<_>, ConvertError>>()?,
        ))
    }
}

/// An input whose value selects a bounding box of a [`CompoundBoundingBox`].
#[derive(Clone, Debug, PartialEq)]
pub struct SelectorArgument {
    /// The input name.
    pub argument: String,
    /// True if the input is ignored by the selected bounding boxes.
    pub ignore: bool,
}

/// A set of bounding boxes selected by the values of some inputs.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CompoundBoundingBox {
    /// The selector arguments.
    pub selector_args: Vec<SelectorArgument>,
    /// The bounding box for each selector key.
    pub bounding_boxes: Vec<(Vec<Node>, ModelBoundingBox)>,
    /// Inputs ignored by every bounding box.
    pub ignored: Vec<String>,
    /// The legacy list order.
    pub order: Order,
}

astro_object!(CompoundBoundingBox, "astropy.modeling.bounding_box.CompoundBoundingBox");

impl CompoundBoundingBox {
    /// Check that every selector argument, ignored input and bounding box names one of `inputs`.
    ///
    /// # Errors
    /// Returns [`ConvertError::InvalidNode`] for an unknown input.
    pub fn validate(&self, inputs: &[String]) -> Result<(), ConvertError> {
        self.selector_args
            .iter()
            .map(|selector| &selector.argument)
            .chain(&self.ignored)
            .try_for_each(|name| check_input(inputs, name))?;
        self.bounding_boxes
            .iter()
            .try_for_each(|(_, bounding_box)| bounding_box.validate(inputs))
    }
}

/// The bounding box of a model.
#[derive(Clone, Debug, PartialEq)]
pub enum BoundingBox {
    /// A single bounding box.
    Model(ModelBoundingBox),
    /// Bounding boxes selected by input values.
    Compound(CompoundBoundingBox),
}

impl BoundingBox {
    /// Check the bounding box against the model `inputs`.
    ///
    /// # Errors
    /// Returns [`ConvertError::InvalidNode`] for an unknown input.
    pub fn validate(&self, inputs: &[String]) -> Result<(), ConvertError> {
        match self {
            Self::Model(bounding_box) => bounding_box.validate(inputs),
            Self::Compound(bounding_box) => bounding_box.validate(inputs),
        }
    }
}

/// A bounding box read from a document, waiting for the model that owns it.
///
/// Input names can only be checked against a model, so the bounding box converters produce a builder
/// that the owning model's converter applies once the model exists.
#[derive(Clone, Debug, PartialEq)]
pub enum BoundingBoxBuilder {
    /// A single bounding box.
    Model {
        /// The named intervals.
        intervals: IndexMap<String, Interval>,
        /// The ignored inputs.
        ignored: Vec<String>,
        /// The legacy list order.
        order: Order,
    },
    /// A compound bounding box.
    Compound {
        /// The selector arguments, by name or index.
        selector_args: Vec<(Node, bool)>,
        /// The selector keys and their bounding box builders.
        entries: Vec<(Vec<Node>, ObjectRef)>,
        /// The inputs ignored by every bounding box.
        ignored: Vec<String>,
        /// The legacy list order.
        order: Order,
    },
}

astro_object!(BoundingBoxBuilder, "asdf_astro.values.BoundingBoxBuilder");

fn input_name(inputs: &[String], argument: &Node) -> Result<String, ConvertError> {
    match argument {
        Node::String(name) => {
            check_input(inputs, name)?;
            Ok(name.clone())
        }
        Node::Int(index) => usize::try_from(*index)
            .ok()
            .and_then(|index| inputs.get(index))
            .cloned()
            .ok_or_else(|| ConvertError::InvalidNode(format!("no model input with index {index}"))),
        node => Err(ConvertError::InvalidNode(format!(
            "expected an input name or index, got {}",
            node.kind()
        ))),
    }
}

impl BoundingBoxBuilder {
    /// Build the bounding box for a model with `inputs`.
    ///
    /// # Errors
    /// Returns [`ConvertError::InvalidNode`] if the bounding box refers to an input the model does not have.
    pub fn build(&self, inputs: &[String]) -> Result<BoundingBox, ConvertError> {
        match self {
            Self::Model { .. } => self.build_model(inputs, &[]).map(BoundingBox::Model),
            Self::Compound {
                selector_args,
                entries,
                ignored,
                order,
            } => {
                let selector_args = selector_args
                    .iter()
                    .map(|(argument, ignore)| {
                        Ok::<_, ConvertError>(SelectorArgument {
                            argument: input_name(inputs, argument)?,
                            ignore: *ignore,
                        })
                    })
                    .collect::<Result<Vec<_>, ConvertError>>()?;
                let extra_ignored = selector_args
                    .iter()
                    .filter(|selector| selector.ignore)
                    .map(|selector| selector.argument.clone())
                    .chain(ignored.iter().cloned())
                    .unique()
                    .collect_vec();
                let bounding_boxes = entries
                    .iter()
                    .map(|(key, builder)| {
                        let builder = builder.downcast_ref::<Self>().ok_or_else(|| {
                            ConvertError::InvalidNode(format!(
                                "expected a bounding box, got {}",
                                builder.type_key()
                            ))
                        })?;
                        let bounding_box = builder.build_model(inputs, &extra_ignored)?;
                        Ok::<_, ConvertError>((key.clone(), bounding_box))
                    })
                    .collect::<Result<Vec<_>, ConvertError>>()?;
                let compound = CompoundBoundingBox {
                    selector_args,
                    bounding_boxes,
                    ignored: ignored.clone(),
                    order: *order,
                };
                compound.validate(inputs)?;
                Ok(BoundingBox::Compound(compound))
            }
        }
    }

    fn build_model(
        &self,
        inputs: &[String],
        extra_ignored: &[String],
    ) -> Result<ModelBoundingBox, ConvertError> {
        let Self::Model {
            intervals,
            ignored,
            order,
        } = self
        else {
            return Err(ConvertError::InvalidNode(
                "a compound bounding box cannot be nested".to_string(),
            ));
        };
        let bounding_box = ModelBoundingBox {
            intervals: intervals.clone(),
            ignored: ignored
                .iter()
                .chain(extra_ignored)
                .unique()
                .cloned()
                .collect(),
            order: *order,
        };
        bounding_box.validate(inputs)?;
        Ok(bounding_box)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inputs(names: &[&str]) -> Vec<String> {
        names.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn legacy_bounding_box() {
        let xy = inputs(&["x", "y"]);
        let bounding_box = ModelBoundingBox::new([("x", (1.0, 2.0)), ("y", (3.0, 4.0))]);
        let node = bounding_box.to_legacy_node(&xy).unwrap();
        assert_eq!(
            node,
            Node::Sequence(vec![Node::from_f64s(&[3.0, 4.0]), Node::from_f64s(&[1.0, 2.0])])
        );
        assert_eq!(ModelBoundingBox::from_legacy_node(&node, &xy).unwrap(), bounding_box);

        let x = inputs(&["x"]);
        let bounding_box = ModelBoundingBox::new([("x", (-1.0, 1.0))]);
        let node = bounding_box.to_legacy_node(&x).unwrap();
        assert_eq!(node, Node::from_f64s(&[-1.0, 1.0]));
        assert_eq!(ModelBoundingBox::from_legacy_node(&node, &x).unwrap(), bounding_box);
    }

    #[test]
    fn builder_validates_inputs() {
        let builder = BoundingBoxBuilder::Model {
            intervals: [("z".to_string(), (0.0, 1.0))].into_iter().collect(),
            ignored: vec![],
            order: Order::C,
        };
        assert!(builder.build(&inputs(&["x", "y"])).is_err());
        assert!(builder.build(&inputs(&["z"])).is_ok());
    }

    #[test]
    fn compound_builder() {
        let entry = ObjectRef::new(BoundingBoxBuilder::Model {
            intervals: [("x".to_string(), (0.0, 1.0))].into_iter().collect(),
            ignored: vec![],
            order: Order::C,
        });
        let builder = BoundingBoxBuilder::Compound {
            selector_args: vec![(Node::from("y"), true)],
            entries: vec![(vec![Node::Int(0)], entry)],
            ignored: vec![],
            order: Order::C,
        };
        let BoundingBox::Compound(compound) = builder.build(&inputs(&["x", "y"])).unwrap() else {
            panic!("expected a compound bounding box");
        };
        assert_eq!(compound.selector_args[0].argument, "y");
        assert_eq!(compound.bounding_boxes[0].1.ignored, vec!["y".to_string()]);
    }
}
