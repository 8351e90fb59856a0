use asdf_astro_plugin::{
    node_map, AstroObject, Construct, ConvertError, Converter, Node, NodeMap, NodeMapExt,
    ObjectRef, SerializationContext, Tag,
};
use asdf_astro_registry::tags::table;

use super::{complete, downcast, quantity::unit_from_node};
use crate::values::{Column, Quantity, Table};

/// Reads and writes [`Column`] as `{data, name, description?, unit?, meta?}`.
#[derive(Debug, Default)]
pub struct ColumnConverter;

impl Converter for ColumnConverter {
    fn name(&self) -> &'static str {
        "ColumnConverter"
    }

    fn tags(&self) -> &[&'static str] {
        &[table::COLUMN]
    }

    fn types(&self) -> &[&'static str] {
        &["astropy.table.column.Column"]
    }

    fn to_node(
        &self,
        object: &dyn AstroObject,
        _tag: &Tag,
        _ctx: &mut SerializationContext,
    ) -> Result<Node, ConvertError> {
        let column = downcast::<Column>(object, self.name())?;
        let mut node = node_map! {
            "data" => column.data.clone(),
            "name" => column.name.as_str(),
        };
        node.insert_some(
            "description",
            column.description.as_deref().filter(|description| !description.is_empty()),
        );
        node.insert_some("unit", column.unit.clone());
        if !column.meta.is_empty() {
            node.insert("meta".to_string(), Node::Mapping(column.meta.clone()));
        }
        Ok(Node::Mapping(node))
    }

    fn from_node(
        &self,
        node: Node,
        _tag: &Tag,
        _ctx: &mut SerializationContext,
    ) -> Result<Construct, ConvertError> {
        let mut node = node.into_mapping()?;
        Ok(complete(Column {
            data: node.required("data")?,
            name: node.required_string("name")?,
            description: node.optional_string("description")?,
            unit: node.optional("unit").map(unit_from_node).transpose()?,
            meta: meta_from_node(&mut node)?,
        }))
    }
}

fn meta_from_node(node: &mut NodeMap) -> Result<NodeMap, ConvertError> {
    Ok(node
        .optional("meta")
        .map(Node::into_mapping)
        .transpose()?
        .unwrap_or_default())
}

/// Convert a column object, or a quantity column of a quantity table.
fn column_from_node(node: Node, name: Option<String>) -> Result<Column, ConvertError> {
    let object = node.into_object()?;
    let column = object.downcast_ref::<Column>().map(|column| Column::clone(&column));
    let column = match column {
        Some(column) => column,
        None => {
            let quantity = object.downcast_ref::<Quantity>().ok_or_else(|| {
                ConvertError::InvalidNode(format!(
                    "expected a table column, got {}",
                    object.type_key()
                ))
            })?;
            Column::new(name.clone().unwrap_or_default(), quantity.value.to_node())
                .with_unit(quantity.unit.clone())
        }
    };
    Ok(match name {
        Some(name) => Column { name, ..column },
        None => column,
    })
}

/// Reads the `table` tag of the ASDF standard, `{columns, meta?}`.
///
/// The converter has no types, tables are written with the astropy table tag.
#[derive(Debug, Default)]
pub struct AsdfTableConverter;

impl Converter for AsdfTableConverter {
    fn name(&self) -> &'static str {
        "AsdfTableConverter"
    }

    fn tags(&self) -> &[&'static str] {
        &[table::TABLE]
    }

    fn types(&self) -> &[&'static str] {
        &[]
    }

    fn to_node(
        &self,
        _object: &dyn AstroObject,
        tag: &Tag,
        _ctx: &mut SerializationContext,
    ) -> Result<Node, ConvertError> {
        Err(ConvertError::Other(format!(
            "writing tables with {tag} is not supported"
        )))
    }

    fn from_node(
        &self,
        node: Node,
        _tag: &Tag,
        _ctx: &mut SerializationContext,
    ) -> Result<Construct, ConvertError> {
        let mut node = node.into_mapping()?;
        let columns = node
            .required("columns")?
            .into_sequence()?
            .into_iter()
            .map(|column| column_from_node(column, None))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(complete(Table {
            columns,
            meta: meta_from_node(&mut node)?,
            qtable: false,
        }))
    }
}

/// Reads and writes [`Table`] with the astropy table tag, `{columns, colnames, qtable, meta?}`.
#[derive(Debug, Default)]
pub struct AstropyTableConverter;

impl Converter for AstropyTableConverter {
    fn name(&self) -> &'static str {
        "AstropyTableConverter"
    }

    fn tags(&self) -> &[&'static str] {
        &[table::ASTROPY_TABLE]
    }

    fn types(&self) -> &[&'static str] {
        &["astropy.table.table.Table", "astropy.table.table.QTable"]
    }

    fn to_node(
        &self,
        object: &dyn AstroObject,
        _tag: &Tag,
        _ctx: &mut SerializationContext,
    ) -> Result<Node, ConvertError> {
        let table = downcast::<Table>(object, self.name())?;
        let mut node = node_map! {
            "columns" => table
                .columns
                .iter()
                .map(|column| Node::Object(ObjectRef::new(column.clone())))
                .collect::<Vec<_>>(),
            "colnames" => Node::from_strs(table.colnames()),
            "qtable" => table.qtable,
        };
        if !table.meta.is_empty() {
            node.insert("meta".to_string(), Node::Mapping(table.meta.clone()));
        }
        Ok(Node::Mapping(node))
    }

    fn from_node(
        &self,
        node: Node,
        _tag: &Tag,
        _ctx: &mut SerializationContext,
    ) -> Result<Construct, ConvertError> {
        let mut node = node.into_mapping()?;
        let colnames = node.required("colnames")?.to_string_vec()?;
        let columns = node.required("columns")?.into_sequence()?;
        if colnames.len() != columns.len() {
            return Err(ConvertError::InvalidNode(format!(
                "table has {} column names and {} columns",
                colnames.len(),
                columns.len()
            )));
        }
        let qtable = node
            .optional("qtable")
            .map(|qtable| {
                qtable.as_bool().ok_or_else(|| {
                    ConvertError::InvalidNode("qtable must be a boolean".to_string())
                })
            })
            .transpose()?
            .unwrap_or(false);
        let columns = colnames
            .into_iter()
            .zip(columns)
            .map(|(name, column)| column_from_node(column, Some(name)))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(complete(Table {
            columns,
            meta: meta_from_node(&mut node)?,
            qtable,
        }))
    }
}
