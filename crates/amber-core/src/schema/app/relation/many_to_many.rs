use super::OrderByColumn;
use crate::schema::{
    app::{CascadeSet, ModelId},
    db::{LinkId, TableId},
};

/// Collection of target entities joined through an association table.
#[derive(Debug, Clone)]
pub struct ManyToMany {
    pub target: ModelId,

    /// Association table.
    pub table: TableId,

    /// Association table columns referencing the owner. Owned by this field.
    pub source_link: LinkId,

    /// Association table columns referencing the target. Owned by this field.
    pub target_link: LinkId,

    pub cascade: CascadeSet,

    pub order_by: Vec<OrderByColumn>,
}
