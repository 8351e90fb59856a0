use std::fmt;

use indexmap::IndexMap;

use crate::{ConvertError, ObjectRef};

/// An insertion-ordered mapping node.
pub type NodeMap = IndexMap<String, Node>;

/// A node of a document tree.
///
/// Converters produce and consume plain nodes, with nested convertible values as [`Node::Object`].
/// The document engine replaces objects with [`Node::Tagged`] nodes, and repeated objects with [`Node::Alias`] nodes.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Node {
    /// A null scalar.
    #[default]
    Null,
    /// A boolean scalar.
    Bool(bool),
    /// An integer scalar.
    Int(i64),
    /// A floating point scalar.
    Float(f64),
    /// A string scalar.
    String(String),
    /// A sequence.
    Sequence(Vec<Node>),
    /// A mapping.
    Mapping(NodeMap),
    /// A runtime value.
    Object(ObjectRef),
    /// A tagged node.
    Tagged(Box<TaggedNode>),
    /// A reference to an anchored node.
    Alias(String),
}

/// A tagged node, optionally with an anchor that [`Node::Alias`] nodes can refer to.
#[derive(Clone, Debug, PartialEq)]
pub struct TaggedNode {
    /// The tag.
    pub tag: String,
    /// The anchor.
    pub anchor: Option<String>,
    /// The tagged content.
    pub value: Node,
}

impl TaggedNode {
    /// Create a new tagged node without an anchor.
    #[must_use]
    pub fn new(tag: impl Into<String>, value: Node) -> Self {
        Self {
            tag: tag.into(),
            anchor: None,
            value,
        }
    }
}

fn invalid(expected: &str, node: &Node) -> ConvertError {
    ConvertError::InvalidNode(format!("expected {expected}, got {}", node.kind()))
}

impl Node {
    /// Create a tagged node.
    #[must_use]
    pub fn tagged(tag: impl Into<String>, value: Node) -> Self {
        Self::Tagged(Box::new(TaggedNode::new(tag, value)))
    }

    /// Create a sequence of floats.
    #[must_use]
    pub fn from_f64s(values: &[f64]) -> Self {
        Self::Sequence(values.iter().copied().map(Self::Float).collect())
    }

    /// Create a sequence of strings.
    pub fn from_strs<S: AsRef<str>>(values: impl IntoIterator<Item = S>) -> Self {
        Self::Sequence(
            values
                .into_iter()
                .map(|value| Self::String(value.as_ref().to_string()))
                .collect(),
        )
    }

    /// Returns the kind of the node, for error messages.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::String(_) => "string",
            Self::Sequence(_) => "sequence",
            Self::Mapping(_) => "mapping",
            Self::Object(_) => "object",
            Self::Tagged(_) => "tagged node",
            Self::Alias(_) => "alias",
        }
    }

    /// Returns true if the node is null.
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns the boolean value of a bool node.
    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(value) => Some(*value),
            _ => None,
        }
    }

    /// Returns the value of an int node.
    #[must_use]
    pub const fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(value) => Some(*value),
            _ => None,
        }
    }

    /// Returns the value of an int or float node as a float.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub const fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(value) => Some(*value as f64),
            Self::Float(value) => Some(*value),
            _ => None,
        }
    }

    /// Returns the value of a string node.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(value) => Some(value),
            _ => None,
        }
    }

    /// Returns the elements of a sequence node.
    #[must_use]
    pub fn as_sequence(&self) -> Option<&[Node]> {
        match self {
            Self::Sequence(values) => Some(values),
            _ => None,
        }
    }

    /// Returns the entries of a mapping node.
    #[must_use]
    pub const fn as_mapping(&self) -> Option<&NodeMap> {
        match self {
            Self::Mapping(map) => Some(map),
            _ => None,
        }
    }

    /// Returns the value of an object node.
    #[must_use]
    pub const fn as_object(&self) -> Option<&ObjectRef> {
        match self {
            Self::Object(object) => Some(object),
            _ => None,
        }
    }

    /// Convert the node to a float.
    ///
    /// # Errors
    /// Returns [`ConvertError::InvalidNode`] if the node is not an int or float.
    pub fn to_f64(&self) -> Result<f64, ConvertError> {
        self.as_f64().ok_or_else(|| invalid("a number", self))
    }

    /// Convert the node to an integer.
    ///
    /// # Errors
    /// Returns [`ConvertError::InvalidNode`] if the node is not an int.
    pub fn to_i64(&self) -> Result<i64, ConvertError> {
        self.as_i64().ok_or_else(|| invalid("an integer", self))
    }

    /// Convert a sequence node to a vector of floats.
    ///
    /// # Errors
    /// Returns [`ConvertError::InvalidNode`] if the node is not a sequence of numbers.
    pub fn to_f64_vec(&self) -> Result<Vec<f64>, ConvertError> {
        self.as_sequence()
            .ok_or_else(|| invalid("a sequence", self))?
            .iter()
            .map(Self::to_f64)
            .collect()
    }

    /// Convert a sequence node to a vector of strings.
    ///
    /// # Errors
    /// Returns [`ConvertError::InvalidNode`] if the node is not a sequence of strings.
    pub fn to_string_vec(&self) -> Result<Vec<String>, ConvertError> {
        self.as_sequence()
            .ok_or_else(|| invalid("a sequence", self))?
            .iter()
            .map(|value| {
                value
                    .as_str()
                    .map(str::to_string)
                    .ok_or_else(|| invalid("a string", value))
            })
            .collect()
    }

    /// Convert the node into a string.
    ///
    /// # Errors
    /// Returns [`ConvertError::InvalidNode`] if the node is not a string.
    pub fn into_string(self) -> Result<String, ConvertError> {
        match self {
            Self::String(value) => Ok(value),
            node => Err(invalid("a string", &node)),
        }
    }

    /// Convert the node into a sequence.
    ///
    /// # Errors
    /// Returns [`ConvertError::InvalidNode`] if the node is not a sequence.
    pub fn into_sequence(self) -> Result<Vec<Node>, ConvertError> {
        match self {
            Self::Sequence(values) => Ok(values),
            node => Err(invalid("a sequence", &node)),
        }
    }

    /// Convert the node into a mapping.
    ///
    /// # Errors
    /// Returns [`ConvertError::InvalidNode`] if the node is not a mapping.
    pub fn into_mapping(self) -> Result<NodeMap, ConvertError> {
        match self {
            Self::Mapping(map) => Ok(map),
            node => Err(invalid("a mapping", &node)),
        }
    }

    /// Convert the node into an object.
    ///
    /// # Errors
    /// Returns [`ConvertError::InvalidNode`] if the node is not an object.
    pub fn into_object(self) -> Result<ObjectRef, ConvertError> {
        match self {
            Self::Object(object) => Ok(object),
            node => Err(invalid("a convertible value", &node)),
        }
    }

    fn to_json(&self) -> serde_json::Value {
        use serde_json::Value;
        match self {
            Self::Null => Value::Null,
            Self::Bool(value) => Value::Bool(*value),
            Self::Int(value) => Value::from(*value),
            Self::Float(value) => Value::from(*value),
            Self::String(value) => Value::String(value.clone()),
            Self::Sequence(values) => Value::Array(values.iter().map(Self::to_json).collect()),
            Self::Mapping(map) => Value::Object(
                map.iter()
                    .map(|(key, value)| (key.clone(), value.to_json()))
                    .collect(),
            ),
            Self::Object(object) => match object.try_type_key() {
                Some(type_key) => Value::String(format!("<{type_key}>")),
                None => Value::String("<locked>".to_string()),
            },
            Self::Tagged(tagged) => {
                let mut map = serde_json::Map::new();
                map.insert(format!("!<{}>", tagged.tag), tagged.value.to_json());
                Value::Object(map)
            }
            Self::Alias(anchor) => Value::String(format!("*{anchor}")),
        }
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_json())
    }
}

impl From<bool> for Node {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for Node {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<usize> for Node {
    fn from(value: usize) -> Self {
        Self::Int(i64::try_from(value).unwrap_or(i64::MAX))
    }
}

impl From<f64> for Node {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<String> for Node {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<&str> for Node {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<Vec<Node>> for Node {
    fn from(values: Vec<Node>) -> Self {
        Self::Sequence(values)
    }
}

impl From<NodeMap> for Node {
    fn from(map: NodeMap) -> Self {
        Self::Mapping(map)
    }
}

impl From<ObjectRef> for Node {
    fn from(object: ObjectRef) -> Self {
        Self::Object(object)
    }
}

impl From<TaggedNode> for Node {
    fn from(tagged: TaggedNode) -> Self {
        Self::Tagged(Box::new(tagged))
    }
}

impl<T: Into<Node>> From<Option<T>> for Node {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

/// Field access helpers for mapping nodes.
pub trait NodeMapExt {
    /// Remove and return the required field `key`.
    ///
    /// # Errors
    /// Returns [`ConvertError::InvalidNode`] if the field is missing.
    fn required(&mut self, key: &str) -> Result<Node, ConvertError>;

    /// Remove and return the field `key` if it is present and not null.
    fn optional(&mut self, key: &str) -> Option<Node>;

    /// Remove and return the required number field `key`.
    ///
    /// # Errors
    /// Returns [`ConvertError::InvalidNode`] if the field is missing or not a number.
    fn required_f64(&mut self, key: &str) -> Result<f64, ConvertError> {
        self.required(key)?.to_f64()
    }

    /// Remove and return the required string field `key`.
    ///
    /// # Errors
    /// Returns [`ConvertError::InvalidNode`] if the field is missing or not a string.
    fn required_string(&mut self, key: &str) -> Result<String, ConvertError> {
        self.required(key)?.into_string()
    }

    /// Remove and return the string field `key` if it is present.
    ///
    /// # Errors
    /// Returns [`ConvertError::InvalidNode`] if the field is not a string.
    fn optional_string(&mut self, key: &str) -> Result<Option<String>, ConvertError> {
        self.optional(key).map(Node::into_string).transpose()
    }

    /// Remove and return the required object field `key`.
    ///
    /// # Errors
    /// Returns [`ConvertError::InvalidNode`] if the field is missing or not an object.
    fn required_object(&mut self, key: &str) -> Result<ObjectRef, ConvertError> {
        self.required(key)?.into_object()
    }

    /// Insert `value` at `key` if it is [`Some`].
    fn insert_some<T: Into<Node>>(&mut self, key: &str, value: Option<T>);
}

impl NodeMapExt for NodeMap {
    fn required(&mut self, key: &str) -> Result<Node, ConvertError> {
        self.shift_remove(key)
            .ok_or_else(|| ConvertError::InvalidNode(format!("missing required field `{key}`")))
    }

    fn optional(&mut self, key: &str) -> Option<Node> {
        self.shift_remove(key).filter(|node| !node.is_null())
    }

    fn insert_some<T: Into<Node>>(&mut self, key: &str, value: Option<T>) {
        if let Some(value) = value {
            self.insert(key.to_string(), value.into());
        }
    }
}

/// Create a [`NodeMap`] from `key => value` pairs.
///
/// ```
/// # use asdf_astro_plugin::{node_map, Node};
/// let map = node_map! { "value" => 5.0, "unit" => "m" };
/// assert_eq!(map["unit"], Node::from("m"));
/// ```
#[macro_export]
macro_rules! node_map {
    ($($key:expr => $value:expr),* $(,)?) => {{
        #[allow(unused_mut)]
        let mut map = $crate::NodeMap::new();
        $(map.insert(::std::string::String::from($key), $crate::Node::from($value));)*
        map
    }};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_accessors() {
        assert_eq!(Node::Int(2).as_f64(), Some(2.0));
        assert_eq!(Node::Float(2.5).to_i64().ok(), None);
        assert_eq!(Node::from("m").as_str(), Some("m"));
        assert_eq!(
            Node::from_f64s(&[1.0, 2.0]).to_f64_vec().unwrap(),
            vec![1.0, 2.0]
        );
        assert_eq!(
            Node::from_strs(["x", "y"]).to_string_vec().unwrap(),
            vec!["x".to_string(), "y".to_string()]
        );
        assert!(matches!(
            Node::Null.into_mapping(),
            Err(ConvertError::InvalidNode(_))
        ));
        assert_eq!(Node::from(None::<f64>), Node::Null);
    }

    #[test]
    fn node_map_fields() {
        let mut map = node_map! { "value" => 5.0, "unit" => "m", "name" => Node::Null };
        assert_eq!(map.required_f64("value").unwrap(), 5.0);
        assert_eq!(map.optional_string("name").unwrap(), None);
        assert!(map.required("value").is_err());
        assert!(map.required_f64("unit").is_err());
        assert!(map.is_empty());
        map.insert_some("name", Some("shift"));
        map.insert_some("inverse", None::<Node>);
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn node_display() {
        let node = Node::tagged(
            "tag:stsci.edu:asdf/unit/quantity-1.1.0",
            Node::from(node_map! { "value" => 1_i64, "unit" => "m" }),
        );
        assert_eq!(
            node.to_string(),
            r#"{"!<tag:stsci.edu:asdf/unit/quantity-1.1.0>":{"value":1,"unit":"m"}}"#
        );
    }
}
