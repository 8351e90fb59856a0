use asdf_astro_plugin::{astro_object, Node};

use super::{NdArray, Table};

/// A FITS header card.
#[derive(Clone, Debug, PartialEq)]
pub struct Card {
    /// The keyword, empty for a blank card.
    pub keyword: String,
    /// The value, [`Node::Null`] if undefined.
    pub value: Node,
    /// The comment, empty if none.
    pub comment: String,
}

impl Card {
    /// Create a card.
    #[must_use]
    pub fn new(
        keyword: impl Into<String>,
        value: impl Into<Node>,
        comment: impl Into<String>,
    ) -> Self {
        Self {
            keyword: keyword.into(),
            value: value.into(),
            comment: comment.into(),
        }
    }
}

/// The kind of a header/data unit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HduKind {
    /// The primary HDU, always first.
    Primary,
    /// An image extension.
    Image,
    /// A binary table extension.
    BinTable,
}

/// The data of a header/data unit.
#[derive(Clone, Debug, PartialEq)]
pub enum HduData {
    /// Image data.
    Image(NdArray),
    /// Table data.
    Table(Table),
}

/// A FITS header/data unit.
#[derive(Clone, Debug, PartialEq)]
pub struct Hdu {
    /// The kind.
    pub kind: HduKind,
    /// The header cards.
    pub header: Vec<Card>,
    /// The data.
    pub data: Option<HduData>,
}

/// A list of FITS header/data units.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct HduList {
    /// The units, the first being the primary HDU.
    pub hdus: Vec<Hdu>,
}

astro_object!(HduList, "astropy.io.fits.hdu.hdulist.HDUList");

impl HduList {
    /// Append a unit, inferring its kind from its position and data.
    pub fn push(&mut self, header: Vec<Card>, data: Option<HduData>) {
        let kind = if self.hdus.is_empty() {
            HduKind::Primary
        } else if matches!(data, Some(HduData::Table(_))) {
            HduKind::BinTable
        } else {
            HduKind::Image
        };
        self.hdus.push(Hdu { kind, header, data });
    }
}
