use super::{Column, ColumnId, LinkId, Type};
use crate::stmt;

use std::fmt;

/// A database table
#[derive(Debug, Clone)]
pub struct Table {
    /// Uniquely identifies a table
    pub id: TableId,

    /// Name of the table
    pub name: String,

    /// The table's columns, in registration order
    pub columns: Vec<Column>,

    /// Primary key columns, in key order
    pub primary_key: Vec<ColumnId>,

    /// Links whose source columns live on this table
    pub outgoing: Vec<LinkId>,

    /// Links pointing at this table
    pub incoming: Vec<LinkId>,
}

/// Uniquely identifies a table
#[derive(PartialEq, Eq, Clone, Copy, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TableId(pub usize);

impl Table {
    pub(crate) fn new(id: TableId, name: String) -> Self {
        Self {
            id,
            name,
            columns: vec![],
            primary_key: vec![],
            outgoing: vec![],
            incoming: vec![],
        }
    }

    pub fn column(&self, id: impl Into<ColumnId>) -> &Column {
        &self.columns[id.into().index]
    }

    pub fn column_mut(&mut self, id: impl Into<ColumnId>) -> &mut Column {
        &mut self.columns[id.into().index]
    }

    pub fn column_by_name(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|column| column.name == name)
    }

    pub fn primary_key_columns(&self) -> impl ExactSizeIterator<Item = &Column> + '_ {
        self.primary_key
            .iter()
            .map(|column_id| &self.columns[column_id.index])
    }

    /// Registers a column. Registering a name that already exists returns the
    /// existing column unchanged.
    pub fn create_column(&mut self, name: &str, ty: stmt::Type, storage_ty: Type) -> ColumnId {
        if let Some(column) = self.column_by_name(name) {
            return column.id;
        }

        let id = ColumnId {
            table: self.id,
            index: self.columns.len(),
        };
        self.columns
            .push(Column::new(id, name.to_string(), ty, storage_ty));
        id
    }

    /// Registers a column referencing `target`, copying its types.
    pub fn create_foreign_column(&mut self, name: &str, target: &Column) -> ColumnId {
        let id = self.create_column(name, target.ty.clone(), target.storage_ty);
        let column = self.column_mut(id);
        if column.foreign.is_none() {
            column.foreign = Some(target.id);
        }
        id
    }

    /// Adds the column to the primary key, once.
    pub fn add_primary_key(&mut self, id: ColumnId) {
        if !self.primary_key.contains(&id) {
            self.primary_key.push(id);
        }

        let column = self.column_mut(id);
        column.primary_key = true;
        column.nullable = false;
    }
}

impl TableId {
    pub fn placeholder() -> Self {
        Self(usize::MAX)
    }
}

impl fmt::Debug for TableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TableId({})", self.0)
    }
}
