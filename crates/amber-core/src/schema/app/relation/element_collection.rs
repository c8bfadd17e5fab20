use crate::{
    schema::db::{ColumnId, LinkId, TableId},
    stmt,
};

/// Collection of scalar values stored in a collection table.
#[derive(Debug, Clone)]
pub struct ElementCollection {
    pub element: stmt::Type,

    /// Collection table.
    pub table: TableId,

    /// Collection table columns referencing the owner. Owned by this field.
    pub source_link: LinkId,

    /// Column holding the element value.
    pub column: ColumnId,

    /// True if elements are loaded ordered by value.
    pub ordered: bool,
}
