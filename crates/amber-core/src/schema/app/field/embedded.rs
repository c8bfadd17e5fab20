use crate::{
    schema::{app::ModelId, db::ColumnId},
    stmt,
};

/// A value object whose fields map to columns of the owner's table.
///
/// Also used for an embedded primary key.
#[derive(Debug, Clone)]
pub struct Embedded {
    /// The embeddable type.
    pub target: ModelId,

    /// One entry per field of the embeddable, in declaration order.
    pub fields: Vec<SubField>,

    pub insertable: bool,
    pub updatable: bool,
}

/// Column copy of one embeddable field on the owner's table.
#[derive(Debug, Clone, PartialEq)]
pub struct SubField {
    pub name: String,
    pub column: ColumnId,
    pub ty: stmt::Type,
}

impl Embedded {
    pub fn sub_field(&self, name: &str) -> Option<(usize, &SubField)> {
        self.fields
            .iter()
            .enumerate()
            .find(|(_, sub)| sub.name == name)
    }
}
