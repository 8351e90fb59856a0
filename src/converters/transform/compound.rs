use asdf_astro_plugin::{
    ConvertError, ExtensionBuildError, Node, NodeMap, NodeMapExt, ObjectRef,
    SerializationContext, Tag,
};
use asdf_astro_registry::{tag_name, tags::transform};

use super::TransformConverter;
use crate::values::{InputKey, Model, ModelKind, Operand, Operator};

/// The tag name of each operator symbol.
const OPERATOR_TAG_NAMES: &[(&str, &str)] = &[
    ("+", "add"),
    ("-", "subtract"),
    ("*", "multiply"),
    ("/", "divide"),
    ("**", "power"),
    ("|", "compose"),
    ("&", "concatenate"),
    ("fix_inputs", "fix_inputs"),
];

/// The operator of each tag name.
const TAG_NAME_OPERATORS: &[(&str, Operator)] = &[
    ("add", Operator::Add),
    ("subtract", Operator::Subtract),
    ("multiply", Operator::Multiply),
    ("divide", Operator::Divide),
    ("power", Operator::Power),
    ("compose", Operator::Compose),
    ("concatenate", Operator::Concatenate),
    ("fix_inputs", Operator::FixInputs),
];

const TAGS: &[&str] = &[
    transform::ADD,
    transform::SUBTRACT,
    transform::MULTIPLY,
    transform::DIVIDE,
    transform::POWER,
    transform::COMPOSE,
    transform::CONCATENATE,
    transform::FIX_INPUTS,
];

/// Check that the operator tables describe the same operators and tags.
fn validate_tables(
    operator_tag_names: &[(&str, &str)],
    tag_name_operators: &[(&str, Operator)],
    tags: &[&str],
) -> Result<(), ExtensionBuildError> {
    let inconsistent = |reason: String| ExtensionBuildError::InconsistentTables {
        converter: "CompoundConverter",
        reason,
    };
    for operator in Operator::ALL {
        let symbol = operator.to_string();
        let count = operator_tag_names
            .iter()
            .filter(|(table_symbol, _)| *table_symbol == symbol)
            .count();
        if count != 1 {
            return Err(inconsistent(format!("operator {symbol} has {count} tag names")));
        }
    }
    if operator_tag_names.len() != tag_name_operators.len()
        || tag_name_operators.len() != tags.len()
    {
        return Err(inconsistent("tables differ in length".to_string()));
    }
    for (symbol, name) in operator_tag_names {
        match tag_name_operators.iter().find(|(table_name, _)| table_name == name) {
            Some((_, operator)) if operator.to_string() == *symbol => {}
            Some((_, operator)) => {
                return Err(inconsistent(format!(
                    "tag name {name} maps to {operator}, expected {symbol}"
                )))
            }
            None => return Err(inconsistent(format!("tag name {name} has no operator"))),
        }
        if !tags.iter().any(|tag| tag_name(tag) == Some(*name)) {
            return Err(inconsistent(format!("tag name {name} has no tag")));
        }
    }
    Ok(())
}

/// Describe an operand that is not a model.
fn describe_operand(node: &Node) -> String {
    match node {
        Node::Tagged(tagged) => tagged.tag.clone(),
        Node::Object(object) => object.type_key().to_string(),
        node => node.kind().to_string(),
    }
}

/// A converter for compound models, one tag per operator.
///
/// A compound node holds `forward: [left, right]`.
/// The right operand of `fix_inputs` is a mapping of `keys` and `values`.
#[derive(Debug)]
pub struct CompoundConverter(());

impl CompoundConverter {
    /// Create the converter.
    ///
    /// # Errors
    /// Returns [`ExtensionBuildError::InconsistentTables`] if the operator tables disagree.
    pub fn new() -> Result<Self, ExtensionBuildError> {
        validate_tables(OPERATOR_TAG_NAMES, TAG_NAME_OPERATORS, TAGS)?;
        Ok(Self(()))
    }

    fn tag_name(operator: Operator) -> Result<&'static str, ConvertError> {
        let symbol = operator.to_string();
        OPERATOR_TAG_NAMES
            .iter()
            .find_map(|(table_symbol, name)| (*table_symbol == symbol).then_some(*name))
            .ok_or_else(|| ConvertError::Other(format!("no tag for operator {symbol}")))
    }

    fn operator(tag: &Tag) -> Result<Operator, ConvertError> {
        TAG_NAME_OPERATORS
            .iter()
            .find_map(|(name, operator)| (*name == tag.name()).then_some(*operator))
            .ok_or_else(|| ConvertError::UnknownTag(tag.to_string()))
    }

    fn model_operand(node: Node, tag: &Tag) -> Result<ObjectRef, ConvertError> {
        match node {
            Node::Object(object) if object.is::<Model>() => Ok(object),
            node => Err(ConvertError::UnrecognizedOperand {
                tag: tag.to_string(),
                operand: describe_operand(&node),
            }),
        }
    }
}

fn fixed_inputs_to_node(fixed: &[(InputKey, f64)]) -> Node {
    let mut node = NodeMap::new();
    node.insert(
        "keys".to_string(),
        Node::Sequence(fixed.iter().map(|(key, _)| key.to_node()).collect()),
    );
    node.insert(
        "values".to_string(),
        Node::Sequence(fixed.iter().map(|(_, value)| Node::Float(*value)).collect()),
    );
    Node::Mapping(node)
}

fn fixed_inputs_from_node(node: Node, tag: &Tag) -> Result<Vec<(InputKey, f64)>, ConvertError> {
    let Node::Mapping(mut node) = node else {
        return Err(ConvertError::UnrecognizedOperand {
            tag: tag.to_string(),
            operand: describe_operand(&node),
        });
    };
    let keys = node.required("keys")?.into_sequence()?;
    let values = node.required("values")?.to_f64_vec()?;
    if keys.len() != values.len() {
        return Err(ConvertError::InvalidNode(format!(
            "{tag} has {} keys and {} values",
            keys.len(),
            values.len()
        )));
    }
    keys.into_iter()
        .map(InputKey::from_node)
        .zip(values)
        .map(|(key, value)| Ok((key?, value)))
        .collect()
}

impl TransformConverter for CompoundConverter {
    fn name(&self) -> &'static str {
        "CompoundConverter"
    }

    fn tags(&self) -> &[&'static str] {
        TAGS
    }

    fn types(&self) -> &[&'static str] {
        &["astropy.modeling.core.CompoundModel"]
    }

    fn select_tag(
        &self,
        model: &Model,
        tags: &[Tag],
        _ctx: &SerializationContext,
    ) -> Result<Tag, ConvertError> {
        let ModelKind::Compound { operator, .. } = model.kind() else {
            return Err(ConvertError::Other(format!(
                "{} is not a compound model",
                model.model_type().type_key
            )));
        };
        let name = Self::tag_name(*operator)?;
        tags.iter()
            .find(|tag| tag.name() == name)
            .cloned()
            .ok_or_else(|| {
                ConvertError::Other(format!("no tag for operator {operator} in the extension"))
            })
    }

    fn to_node_transform(
        &self,
        model: &Model,
        tag: &Tag,
        _ctx: &mut SerializationContext,
    ) -> Result<NodeMap, ConvertError> {
        let ModelKind::Compound {
            operator,
            left,
            right,
        } = model.kind()
        else {
            return Err(ConvertError::Other(format!(
                "{} is not a compound model",
                model.model_type().type_key
            )));
        };
        if tag.name() != Self::tag_name(*operator)? {
            return Err(ConvertError::Other(format!(
                "cannot write operator {operator} with {tag}"
            )));
        }
        let right = match right {
            Operand::Model(right) => Node::Object(right.clone()),
            Operand::FixedInputs(fixed) => fixed_inputs_to_node(fixed),
        };
        let mut node = NodeMap::new();
        node.insert(
            "forward".to_string(),
            Node::Sequence(vec![Node::Object(left.clone()), right]),
        );
        Ok(node)
    }

    fn from_node_transform(
        &self,
        node: &mut NodeMap,
        tag: &Tag,
        _ctx: &mut SerializationContext,
    ) -> Result<Model, ConvertError> {
        let operator = Self::operator(tag)?;
        let forward = node.required("forward")?.into_sequence()?;
        let Ok([left, right]) = <[Node; 2]>::try_from(forward) else {
            return Err(ConvertError::InvalidNode(format!(
                "{tag} requires exactly two forward operands"
            )));
        };
        let left = Self::model_operand(left, tag)?;
        if operator == Operator::FixInputs {
            Model::fix_inputs(left, fixed_inputs_from_node(right, tag)?)
        } else {
            Model::compound(operator, left, Self::model_operand(right, tag)?)
        }
    }
}

#[cfg(test)]
mod tests {
    use asdf_astro_plugin::Version;

    use super::*;

    fn ctx() -> SerializationContext {
        SerializationContext::new(Version::new(1, 5, 0))
    }

    fn compound_tag(name: &str) -> Tag {
        Tag::parse(&format!("tag:stsci.edu:asdf/transform/{name}-1.2.0")).unwrap()
    }

    #[test]
    fn compound_tables_consistent() {
        assert!(CompoundConverter::new().is_ok());
    }

    #[test]
    fn compound_tables_inconsistent() {
        let mut names = OPERATOR_TAG_NAMES.to_vec();
        names[0] = ("+", "plus");
        assert!(matches!(
            validate_tables(&names, TAG_NAME_OPERATORS, TAGS),
            Err(ExtensionBuildError::InconsistentTables { .. })
        ));

        let mut operators = TAG_NAME_OPERATORS.to_vec();
        operators[0] = ("add", Operator::Subtract);
        assert!(validate_tables(OPERATOR_TAG_NAMES, &operators, TAGS).is_err());

        assert!(validate_tables(OPERATOR_TAG_NAMES, TAG_NAME_OPERATORS, &TAGS[1..]).is_err());
        assert!(
            validate_tables(&OPERATOR_TAG_NAMES[1..], &TAG_NAME_OPERATORS[1..], &TAGS[1..])
                .is_err()
        );
    }

    #[test]
    fn compound_select_tag() {
        let converter = CompoundConverter::new().unwrap();
        let tags = ["add", "compose", "concatenate"].map(compound_tag);
        let model = Model::compound(
            Operator::Compose,
            ObjectRef::new(Model::shift(1.0)),
            ObjectRef::new(Model::scale(2.0)),
        )
        .unwrap();
        assert_eq!(converter.select_tag(&model, &tags, &ctx()).unwrap(), tags[1]);
        assert!(converter.select_tag(&Model::shift(1.0), &tags, &ctx()).is_err());
    }

    #[test]
    fn compound_unrecognized_operand() {
        let converter = CompoundConverter::new().unwrap();
        let tag = compound_tag("add");
        let mut node = NodeMap::new();
        node.insert(
            "forward".to_string(),
            Node::Sequence(vec![
                Node::Object(ObjectRef::new(Model::shift(1.0))),
                Node::tagged("tag:example.org:custom/model-1.0.0", Node::Null),
            ]),
        );
        let err = converter
            .from_node_transform(&mut node, &tag, &mut ctx())
            .unwrap_err();
        assert!(err.is_type_error());
        assert!(err.to_string().contains("tag:example.org:custom/model-1.0.0"));
    }

    #[test]
    fn fix_inputs_node() {
        let converter = CompoundConverter::new().unwrap();
        let tag = Tag::parse("tag:stsci.edu:asdf/transform/fix_inputs-1.0.0").unwrap();
        let left = ObjectRef::new(Model::rotation2d(30.0));
        let model = Model::fix_inputs(left, vec![(InputKey::Name("x".to_string()), 2.0)]).unwrap();
        let mut node = converter.to_node_transform(&model, &tag, &mut ctx()).unwrap();
        let read = converter.from_node_transform(&mut node, &tag, &mut ctx()).unwrap();
        assert_eq!(read, model);
        assert_eq!(read.inputs(), ["y"]);
    }
}
