use super::FieldId;
use crate::schema::db::ColumnId;

/// A scalar property stored in a single column.
#[derive(Debug, Clone)]
pub struct Property {
    pub column: ColumnId,

    /// True if the column is written by INSERT statements
    pub insertable: bool,

    /// True if the column is written by UPDATE statements
    pub updatable: bool,

    /// Key many-to-one whose link columns include this column. The key field
    /// writes the column; this property only reads it.
    pub alias_key: Option<FieldId>,
}
