use asdf_astro_plugin::{ConvertError, Node, NodeMap, NodeMapExt, SerializationContext, Tag};
use asdf_astro_registry::tags::transform;

use super::TransformConverter;
use crate::values::{
    transform::model_types::{self, MATH_FUNCTIONS_PREFIX},
    Model,
};

/// Returns the ufunc name of a math function class, e.g. `true_divide` for `True_divideUfunc`.
fn func_name(type_key: &str) -> Option<String> {
    let class = type_key
        .strip_prefix(MATH_FUNCTIONS_PREFIX)?
        .strip_suffix("Ufunc")?;
    let mut chars = class.chars();
    let first = chars.next()?;
    Some(first.to_lowercase().chain(chars).collect())
}

/// Returns the type key of the math function class of a ufunc name.
fn type_key(func_name: &str) -> Option<String> {
    let mut chars = func_name.chars();
    let first = chars.next()?;
    Some(format!(
        "{MATH_FUNCTIONS_PREFIX}{}{}Ufunc",
        first.to_uppercase(),
        chars.as_str()
    ))
}

/// Reads and writes models of numpy ufuncs as `{func_name}`.
#[derive(Debug)]
pub struct MathFunctionsConverter {
    types: Vec<&'static str>,
}

impl Default for MathFunctionsConverter {
    fn default() -> Self {
        Self {
            types: model_types::math_function_types()
                .iter()
                .map(|model_type| model_type.type_key)
                .collect(),
        }
    }
}

impl TransformConverter for MathFunctionsConverter {
    fn name(&self) -> &'static str {
        "MathFunctionsConverter"
    }

    fn tags(&self) -> &[&'static str] {
        &[transform::MATH_FUNCTIONS]
    }

    fn types(&self) -> &[&'static str] {
        &self.types
    }

    fn to_node_transform(
        &self,
        model: &Model,
        _tag: &Tag,
        _ctx: &mut SerializationContext,
    ) -> Result<NodeMap, ConvertError> {
        let type_key = model.model_type().type_key;
        let func_name = func_name(type_key).ok_or_else(|| {
            ConvertError::Other(format!("{} cannot convert {type_key}", self.name()))
        })?;
        let mut node = NodeMap::new();
        node.insert("func_name".to_string(), Node::from(func_name));
        Ok(node)
    }

    fn from_node_transform(
        &self,
        node: &mut NodeMap,
        _tag: &Tag,
        _ctx: &mut SerializationContext,
    ) -> Result<Model, ConvertError> {
        let func_name = node.required_string("func_name")?;
        type_key(&func_name)
            .and_then(|type_key| model_types::model_type(&type_key))
            .map(Model::new)
            .ok_or_else(|| ConvertError::InvalidNode(format!("unsupported ufunc {func_name}")))
    }
}

#[cfg(test)]
mod tests {
    use asdf_astro_plugin::Version;

    use super::*;

    #[test]
    fn ufunc_names() {
        for model_type in model_types::math_function_types() {
            let name = func_name(model_type.type_key).unwrap();
            assert_eq!(type_key(&name).as_deref(), Some(model_type.type_key));
        }
        assert_eq!(
            func_name("astropy.modeling.math_functions.Floor_divideUfunc").as_deref(),
            Some("floor_divide")
        );
        assert_eq!(func_name("astropy.modeling.functional_models.Shift"), None);
    }

    #[test]
    fn math_function_nodes() {
        let mut ctx = SerializationContext::new(Version::new(1, 5, 0));
        let tag = Tag::parse("tag:stsci.edu:asdf/transform/math_functions-1.0.0").unwrap();
        let mut node = asdf_astro_plugin::node_map! { "func_name" => "arctan2" };
        let model = MathFunctionsConverter::default()
            .from_node_transform(&mut node, &tag, &mut ctx)
            .unwrap();
        assert_eq!(model.inputs(), &["x0", "x1"]);
        let node = MathFunctionsConverter::default()
            .to_node_transform(&model, &tag, &mut ctx)
            .unwrap();
        assert_eq!(node["func_name"], Node::from("arctan2"));

        let mut node = asdf_astro_plugin::node_map! { "func_name" => "frobnicate" };
        assert!(MathFunctionsConverter::default()
            .from_node_transform(&mut node, &tag, &mut ctx)
            .is_err());
    }
}
