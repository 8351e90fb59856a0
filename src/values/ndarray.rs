use asdf_astro_plugin::{ConvertError, Node};

/// A dense, row-major n-dimensional array of floats.
#[derive(Clone, Debug, PartialEq)]
pub struct NdArray {
    shape: Vec<usize>,
    data: Vec<f64>,
}

impl NdArray {
    /// Create a new array.
    ///
    /// # Errors
    /// Returns [`ConvertError::InvalidNode`] if the number of elements does not match `shape`.
    pub fn new(shape: Vec<usize>, data: Vec<f64>) -> Result<Self, ConvertError> {
        if shape.iter().product::<usize>() == data.len() {
            Ok(Self { shape, data })
        } else {
            Err(ConvertError::InvalidNode(format!(
                "array of {} elements does not have shape {shape:?}",
                data.len()
            )))
        }
    }

    /// Create a one-dimensional array.
    #[must_use]
    pub fn from_vec(data: Vec<f64>) -> Self {
        Self {
            shape: vec![data.len()],
            data,
        }
    }

    /// Create a two-dimensional array from rows.
    ///
    /// # Errors
    /// Returns [`ConvertError::InvalidNode`] if the rows differ in length.
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Self, ConvertError> {
        let columns = rows.first().map_or(0, Vec::len);
        if rows.iter().any(|row| row.len() != columns) {
            return Err(ConvertError::InvalidNode("ragged array".to_string()));
        }
        Ok(Self {
            shape: vec![rows.len(), columns],
            data: rows.into_iter().flatten().collect(),
        })
    }

    /// Returns the shape.
    #[must_use]
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Returns the number of dimensions.
    #[must_use]
    pub fn ndim(&self) -> usize {
        self.shape.len()
    }

    /// Returns the elements in row-major order.
    #[must_use]
    pub fn data(&self) -> &[f64] {
        &self.data
    }

    /// Returns the element at a two-dimensional index.
    #[must_use]
    pub fn get2(&self, i: usize, j: usize) -> Option<f64> {
        match self.shape.as_slice() {
            [rows, columns] if i < *rows && j < *columns => Some(self.data[i * columns + j]),
            _ => None,
        }
    }

    /// Convert the array to nested sequences.
    #[must_use]
    pub fn to_node(&self) -> Node {
        fn nest(shape: &[usize], data: &[f64]) -> Node {
            match shape {
                [] => Node::Float(data.first().copied().unwrap_or_default()),
                [_] => Node::from_f64s(data),
                [n, rest @ ..] => {
                    let stride = rest.iter().product::<usize>();
                    Node::Sequence(
                        (0..*n)
                            .map(|i| nest(rest, &data[i * stride..(i + 1) * stride]))
                            .collect(),
                    )
                }
            }
        }
        nest(&self.shape, &self.data)
    }

    /// Convert nested sequences of numbers to an array.
    ///
    /// # Errors
    /// Returns [`ConvertError::InvalidNode`] if the node is not a rectangular nesting of numbers.
    pub fn from_node(node: &Node) -> Result<Self, ConvertError> {
        fn shape_of(node: &Node, shape: &mut Vec<usize>) {
            if let Some(values) = node.as_sequence() {
                shape.push(values.len());
                if let Some(first) = values.first() {
                    shape_of(first, shape);
                }
            }
        }
        fn flatten(node: &Node, shape: &[usize], data: &mut Vec<f64>) -> Result<(), ConvertError> {
            match shape {
                [] => data.push(node.to_f64()?),
                [n, rest @ ..] => {
                    let values = node
                        .as_sequence()
                        .filter(|values| values.len() == *n)
                        .ok_or_else(|| ConvertError::InvalidNode("ragged array".to_string()))?;
                    for value in values {
                        flatten(value, rest, data)?;
                    }
                }
            }
            Ok(())
        }

        let mut shape = Vec::new();
        shape_of(node, &mut shape);
        if shape.is_empty() {
            return Err(ConvertError::InvalidNode(format!(
                "expected an array, got {}",
                node.kind()
            )));
        }
        let mut data = Vec::with_capacity(shape.iter().product());
        flatten(node, &shape, &mut data)?;
        Ok(Self { shape, data })
    }
}

/// A scalar or array number.
#[derive(Clone, Debug, PartialEq)]
pub enum Numeric {
    /// A scalar.
    Scalar(f64),
    /// An array.
    Array(NdArray),
}

impl Numeric {
    /// Returns true if the value is a scalar.
    #[must_use]
    pub const fn is_scalar(&self) -> bool {
        matches!(self, Self::Scalar(_))
    }

    /// Returns the scalar value.
    #[must_use]
    pub const fn as_scalar(&self) -> Option<f64> {
        match self {
            Self::Scalar(value) => Some(*value),
            Self::Array(_) => None,
        }
    }

    /// Convert the value to a node.
    #[must_use]
    pub fn to_node(&self) -> Node {
        match self {
            Self::Scalar(value) => Node::Float(*value),
            Self::Array(array) => array.to_node(),
        }
    }

    /// Convert a number or nested sequences of numbers.
    ///
    /// # Errors
    /// Returns [`ConvertError::InvalidNode`] if the node is not a number or array.
    pub fn from_node(node: &Node) -> Result<Self, ConvertError> {
        match node.as_f64() {
            Some(value) => Ok(Self::Scalar(value)),
            None => NdArray::from_node(node).map(Self::Array),
        }
    }
}

impl From<f64> for Numeric {
    fn from(value: f64) -> Self {
        Self::Scalar(value)
    }
}

impl From<Vec<f64>> for Numeric {
    fn from(values: Vec<f64>) -> Self {
        Self::Array(NdArray::from_vec(values))
    }
}

impl From<NdArray> for Numeric {
    fn from(array: NdArray) -> Self {
        Self::Array(array)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ndarray_nodes() {
        let array =
            NdArray::from_rows(vec![vec![1.0, 2.0], vec![3.0, 4.0], vec![5.0, 6.0]]).unwrap();
        assert_eq!(array.shape(), &[3, 2]);
        assert_eq!(array.get2(2, 1), Some(6.0));
        assert_eq!(array.get2(3, 0), None);
        let node = array.to_node();
        assert_eq!(node.as_sequence().unwrap().len(), 3);
        assert_eq!(NdArray::from_node(&node).unwrap(), array);
    }

    #[test]
    fn ndarray_invalid() {
        assert!(NdArray::new(vec![2, 2], vec![1.0]).is_err());
        assert!(NdArray::from_rows(vec![vec![1.0], vec![1.0, 2.0]]).is_err());
        let ragged = Node::Sequence(vec![Node::from_f64s(&[1.0, 2.0]), Node::from_f64s(&[3.0])]);
        assert!(NdArray::from_node(&ragged).is_err());
        assert!(NdArray::from_node(&Node::from("x")).is_err());
    }

    #[test]
    fn numeric_nodes() {
        assert_eq!(Numeric::from_node(&Node::Int(3)).unwrap(), Numeric::Scalar(3.0));
        assert_eq!(
            Numeric::from_node(&Node::from_f64s(&[1.0, 2.0])).unwrap(),
            Numeric::from(vec![1.0, 2.0])
        );
        assert!(Numeric::from(1.5).is_scalar());
    }
}
