use std::any::Any;

use asdf_astro_plugin::{astro_object, AstroObject, Node, NodeMap};

use super::Unit;

/// A named table column.
#[derive(Clone, Debug, PartialEq)]
pub struct Column {
    /// The column name.
    pub name: String,
    /// The column values, a sequence node.
    pub data: Node,
    /// The description.
    pub description: Option<String>,
    /// The unit of the values.
    pub unit: Option<Unit>,
    /// Column metadata.
    pub meta: NodeMap,
}

astro_object!(Column, "astropy.table.column.Column");

impl Column {
    /// Create a column without description, unit or metadata.
    #[must_use]
    pub fn new(name: impl Into<String>, data: Node) -> Self {
        Self {
            name: name.into(),
            data,
            description: None,
            unit: None,
            meta: NodeMap::new(),
        }
    }

    /// Return the column with `unit`.
    #[must_use]
    pub fn with_unit(mut self, unit: Unit) -> Self {
        self.unit = Some(unit);
        self
    }
}

/// A table of named columns.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Table {
    /// The columns, in order.
    pub columns: Vec<Column>,
    /// Table metadata.
    pub meta: NodeMap,
    /// True if the table is a quantity table, whose columns with units behave as quantities.
    pub qtable: bool,
}

impl Table {
    /// Create a table from `columns`.
    #[must_use]
    pub fn new(columns: Vec<Column>) -> Self {
        Self {
            columns,
            ..Self::default()
        }
    }

    /// Returns the column names.
    #[must_use]
    pub fn colnames(&self) -> Vec<&str> {
        self.columns.iter().map(|column| column.name.as_str()).collect()
    }

    /// Returns the column named `name`.
    #[must_use]
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|column| column.name == name)
    }
}

impl AstroObject for Table {
    fn type_key(&self) -> &'static str {
        if self.qtable {
            "astropy.table.table.QTable"
        } else {
            "astropy.table.table.Table"
        }
    }

    fn type_ancestors(&self) -> &'static [&'static str] {
        if self.qtable {
            &["astropy.table.table.Table"]
        } else {
            &[]
        }
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
