use asdf_astro_plugin::{
    AstroObject, Construct, ConvertError, Converter, Node, NodeMap, NodeMapExt, ObjectRef,
    SerializationContext, Tag,
};
use asdf_astro_registry::tags::fits;

use super::{complete, downcast, object_value};
use crate::values::{Card, HduData, HduList, NdArray, Table};

fn is_truthy(value: &Node) -> bool {
    match value {
        Node::Null => false,
        Node::Bool(value) => *value,
        Node::Int(value) => *value != 0,
        Node::Float(value) => *value != 0.0,
        Node::String(value) => !value.is_empty(),
        _ => true,
    }
}

fn card_to_node(card: &Card) -> Node {
    let keyword = Node::from(card.keyword.as_str());
    let value = if card.value.is_null() {
        Node::from("")
    } else {
        card.value.clone()
    };
    Node::Sequence(if !card.comment.is_empty() {
        vec![keyword, value, Node::from(card.comment.as_str())]
    } else if is_truthy(&card.value) {
        vec![keyword, value]
    } else if !card.keyword.is_empty() {
        vec![keyword]
    } else {
        vec![]
    })
}

fn card_from_node(node: Node) -> Result<Card, ConvertError> {
    let mut fields = node.into_sequence()?.into_iter();
    let keyword = fields.next().map(Node::into_string).transpose()?;
    let value = fields
        .next()
        .filter(|value| value.as_str() != Some(""))
        .unwrap_or_default();
    let comment = fields.next().map(Node::into_string).transpose()?;
    if fields.next().is_some() {
        return Err(ConvertError::InvalidNode(
            "a header card has at most a keyword, value and comment".to_string(),
        ));
    }
    Ok(Card {
        keyword: keyword.unwrap_or_default(),
        value,
        comment: comment.unwrap_or_default(),
    })
}

fn hdu_list_to_node(hdu_list: &HduList) -> Node {
    Node::Sequence(
        hdu_list
            .hdus
            .iter()
            .map(|hdu| {
                let mut node = NodeMap::new();
                node.insert(
                    "header".to_string(),
                    Node::Sequence(hdu.header.iter().map(card_to_node).collect()),
                );
                node.insert_some(
                    "data",
                    hdu.data.as_ref().map(|data| match data {
                        HduData::Image(image) => image.to_node(),
                        HduData::Table(table) => Node::Object(ObjectRef::new(table.clone())),
                    }),
                );
                Node::Mapping(node)
            })
            .collect(),
    )
}

fn hdu_list_from_node(node: Node) -> Result<HduList, ConvertError> {
    let mut hdu_list = HduList::default();
    for hdu in node.into_sequence()? {
        let mut hdu = hdu.into_mapping()?;
        let header = hdu
            .required("header")?
            .into_sequence()?
            .into_iter()
            .map(card_from_node)
            .collect::<Result<Vec<_>, _>>()?;
        let data = match hdu.optional("data") {
            None => None,
            Some(data @ Node::Object(_)) => {
                Some(HduData::Table(object_value::<Table>(data, "table data")?))
            }
            Some(data) => Some(HduData::Image(NdArray::from_node(&data)?)),
        };
        hdu_list.push(header, data);
    }
    Ok(hdu_list)
}

/// Reads the `fits` tag of the ASDF standard.
///
/// The converter has no types, HDU lists are written with the astropy FITS tag.
#[derive(Debug, Default)]
pub struct AsdfFitsConverter;

impl Converter for AsdfFitsConverter {
    fn name(&self) -> &'static str {
        "AsdfFitsConverter"
    }

    fn tags(&self) -> &[&'static str] {
        &[fits::FITS]
    }

    fn types(&self) -> &[&'static str] {
        &[]
    }

    fn to_node(
        &self,
        object: &dyn AstroObject,
        _tag: &Tag,
        _ctx: &mut SerializationContext,
    ) -> Result<Node, ConvertError> {
        Ok(hdu_list_to_node(downcast::<HduList>(object, self.name())?))
    }

    fn from_node(
        &self,
        node: Node,
        _tag: &Tag,
        _ctx: &mut SerializationContext,
    ) -> Result<Construct, ConvertError> {
        Ok(complete(hdu_list_from_node(node)?))
    }
}

/// Reads and writes [`HduList`] with the astropy FITS tag.
///
/// Each HDU is written as `{header, data?}` with header cards as `[keyword, value?, comment?]`.
#[derive(Debug, Default)]
pub struct AstropyFitsConverter;

impl Converter for AstropyFitsConverter {
    fn name(&self) -> &'static str {
        "AstropyFitsConverter"
    }

    fn tags(&self) -> &[&'static str] {
        &[fits::ASTROPY_FITS]
    }

    fn types(&self) -> &[&'static str] {
        &["astropy.io.fits.hdu.hdulist.HDUList"]
    }

    fn to_node(
        &self,
        object: &dyn AstroObject,
        _tag: &Tag,
        _ctx: &mut SerializationContext,
    ) -> Result<Node, ConvertError> {
        Ok(hdu_list_to_node(downcast::<HduList>(object, self.name())?))
    }

    fn from_node(
        &self,
        node: Node,
        _tag: &Tag,
        _ctx: &mut SerializationContext,
    ) -> Result<Construct, ConvertError> {
        Ok(complete(hdu_list_from_node(node)?))
    }
}
