use asdf_astro_plugin::{
    ConvertError, Node, NodeMap, NodeMapExt, SerializationContext, Tag, Version,
};
use asdf_astro_registry::tags::transform;

use super::TransformConverter;
use crate::values::{Interval, Model, ModelKind, NdArray};

/// The first `polynomial` tag with `domain` and `window` fields.
///
/// Older tags define an unrelated `domain` field, so the fields are neither written nor read for them.
const DOMAIN_WINDOW: Version = Version::new(1, 2, 0);

/// A converter for `Polynomial1D` and `Polynomial2D`.
#[derive(Debug, Default)]
pub struct PolynomialConverter;

fn interval_to_node(interval: Option<Interval>) -> Node {
    interval.map_or(Node::Null, |(lower, upper)| Node::from_f64s(&[lower, upper]))
}

fn interval_from_node(node: &Node) -> Result<Option<Interval>, ConvertError> {
    if node.is_null() {
        return Ok(None);
    }
    match node.to_f64_vec()?.as_slice() {
        [lower, upper] => Ok(Some((*lower, *upper))),
        _ => Err(ConvertError::InvalidNode(
            "a polynomial domain or window has two bounds".to_string(),
        )),
    }
}

/// Write the domain or window of each input, if any is set.
fn intervals_to_node(intervals: &[Option<Interval>]) -> Option<Node> {
    match intervals {
        [interval] => interval.map(|interval| interval_to_node(Some(interval))),
        intervals if intervals.iter().any(Option::is_some) => Some(Node::Sequence(
            intervals.iter().copied().map(interval_to_node).collect(),
        )),
        _ => None,
    }
}

fn intervals_from_node(
    node: Option<Node>,
    ndim: usize,
) -> Result<Vec<Option<Interval>>, ConvertError> {
    let Some(node) = node else {
        return Ok(vec![None; ndim]);
    };
    if ndim == 1 {
        return Ok(vec![interval_from_node(&node)?]);
    }
    let intervals = node
        .as_sequence()
        .ok_or_else(|| ConvertError::InvalidNode("expected a list of intervals".to_string()))?;
    if intervals.len() != ndim {
        return Err(ConvertError::InvalidNode(format!(
            "expected {ndim} intervals, got {}",
            intervals.len()
        )));
    }
    intervals.iter().map(interval_from_node).collect()
}

impl TransformConverter for PolynomialConverter {
    fn name(&self) -> &'static str {
        "PolynomialConverter"
    }

    fn tags(&self) -> &[&'static str] {
        &[transform::POLYNOMIAL]
    }

    fn types(&self) -> &[&'static str] {
        &[
            "astropy.modeling.polynomial.Polynomial1D",
            "astropy.modeling.polynomial.Polynomial2D",
        ]
    }

    fn to_node_transform(
        &self,
        model: &Model,
        tag: &Tag,
        _ctx: &mut SerializationContext,
    ) -> Result<NodeMap, ConvertError> {
        let ModelKind::Polynomial {
            coefficients,
            domain,
            window,
        } = model.kind()
        else {
            return Err(ConvertError::Other(format!(
                "{} cannot convert {}",
                self.name(),
                model.model_type().type_key
            )));
        };
        let mut node = NodeMap::new();
        node.insert("coefficients".to_string(), coefficients.to_node());
        if tag.version() >= DOMAIN_WINDOW {
            node.insert_some("domain", intervals_to_node(domain));
            node.insert_some("window", intervals_to_node(window));
        }
        Ok(node)
    }

    fn from_node_transform(
        &self,
        node: &mut NodeMap,
        tag: &Tag,
        _ctx: &mut SerializationContext,
    ) -> Result<Model, ConvertError> {
        let coefficients = NdArray::from_node(&node.required("coefficients")?)?;
        let ndim = coefficients.ndim();
        let mut model = match ndim {
            1 => Model::polynomial1d(coefficients.data().to_vec()),
            2 => Model::polynomial2d(&coefficients).map_err(|err| match err {
                ConvertError::UnsupportedShape { reason, .. } => {
                    ConvertError::unsupported_shape(tag.as_str(), reason)
                }
                err => err,
            })?,
            _ => {
                return Err(ConvertError::unsupported_shape(
                    tag.as_str(),
                    "supports only 1D or 2D polynomial models",
                ))
            }
        };
        if tag.version() >= DOMAIN_WINDOW {
            let new_domain = intervals_from_node(node.optional("domain"), ndim)?;
            let new_window = intervals_from_node(node.optional("window"), ndim)?;
            if let ModelKind::Polynomial { domain, window, .. } = model.kind_mut() {
                *domain = new_domain;
                *window = new_window;
            }
        }
        Ok(model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> SerializationContext {
        SerializationContext::new(Version::new(1, 5, 0))
    }

    #[test]
    fn polynomial_domain_window_versions() {
        let mut model = Model::polynomial1d(vec![1.0, 2.0, 3.0]);
        if let ModelKind::Polynomial { domain, .. } = model.kind_mut() {
            *domain = vec![Some((-1.0, 1.0))];
        }
        let old = Tag::parse("tag:stsci.edu:asdf/transform/polynomial-1.1.0").unwrap();
        let new = Tag::parse("tag:stsci.edu:asdf/transform/polynomial-1.2.0").unwrap();

        let node = PolynomialConverter.to_node_transform(&model, &old, &mut ctx()).unwrap();
        assert!(!node.contains_key("domain"));

        let mut node = PolynomialConverter.to_node_transform(&model, &new, &mut ctx()).unwrap();
        assert_eq!(node["domain"], Node::from_f64s(&[-1.0, 1.0]));
        assert!(!node.contains_key("window"));
        let read = PolynomialConverter.from_node_transform(&mut node, &new, &mut ctx()).unwrap();
        assert_eq!(read, model);
    }

    #[test]
    fn polynomial2d_coefficients() {
        let tag = Tag::parse("tag:stsci.edu:asdf/transform/polynomial-1.2.0").unwrap();
        let coefficients = NdArray::from_rows(vec![vec![1.0, 2.0], vec![3.0, 4.0]]).unwrap();
        let model = Model::polynomial2d(&coefficients).unwrap();
        let mut node = PolynomialConverter.to_node_transform(&model, &tag, &mut ctx()).unwrap();
        assert_eq!(
            node["coefficients"],
            NdArray::from_rows(vec![vec![1.0, 2.0], vec![3.0, 0.0]]).unwrap().to_node()
        );
        let read = PolynomialConverter.from_node_transform(&mut node, &tag, &mut ctx()).unwrap();
        assert_eq!(read, model);

        let mut node = NodeMap::new();
        node.insert(
            "coefficients".to_string(),
            NdArray::from_rows(vec![vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]]).unwrap().to_node(),
        );
        let err = PolynomialConverter
            .from_node_transform(&mut node, &tag, &mut ctx())
            .unwrap_err();
        assert!(err.is_type_error());
        assert!(err.to_string().starts_with(tag.as_str()));
    }
}
