use super::{table, TableId, Type};
use crate::stmt;

use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    /// Uniquely identifies the column in the schema.
    pub id: ColumnId,

    /// The name of the column in the database.
    pub name: String,

    /// The column type, from Amber's point of view.
    pub ty: stmt::Type,

    /// The database storage type of the column.
    pub storage_ty: Type,

    /// Whether or not the column is nullable
    pub nullable: bool,

    /// Whether the column carries a unique constraint
    pub unique: bool,

    /// True if the column is part of the table's primary key
    pub primary_key: bool,

    /// True if the database assigns the value on insert (identity column).
    pub auto_increment: bool,

    /// Target column when this column is a foreign key.
    pub foreign: Option<ColumnId>,
}

#[derive(PartialEq, Eq, Clone, Copy, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ColumnId {
    pub table: TableId,
    pub index: usize,
}

impl Column {
    pub(crate) fn new(id: ColumnId, name: String, ty: stmt::Type, storage_ty: Type) -> Column {
        Column {
            id,
            name,
            ty,
            storage_ty,
            nullable: true,
            unique: false,
            primary_key: false,
            auto_increment: false,
            foreign: None,
        }
    }
}

impl ColumnId {
    pub fn placeholder() -> Self {
        Self {
            table: table::TableId::placeholder(),
            index: usize::MAX,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        *self == ColumnId::placeholder()
    }
}

impl From<&Column> for ColumnId {
    fn from(value: &Column) -> Self {
        value.id
    }
}

impl fmt::Debug for ColumnId {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(fmt, "ColumnId({}/{})", self.table.0, self.index)
    }
}
