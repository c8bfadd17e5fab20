use super::OrderByColumn;
use crate::schema::{
    app::{CascadeSet, FieldId, ModelId},
    db::{ColumnId, LinkId},
};

/// Collection of target entities whose many-to-one points back at the owner.
#[derive(Debug, Clone)]
pub struct OneToMany {
    pub target: ModelId,

    /// Many-to-one on the target that owns the link.
    pub source: FieldId,

    /// The source field's link, referenced but not owned.
    pub link: LinkId,

    pub cascade: CascadeSet,

    pub order_by: Vec<OrderByColumn>,

    /// Target property keying a map-valued collection.
    pub map_key: Option<MapKey>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MapKey {
    pub field: FieldId,

    /// Column of `field` on the table holding the link.
    pub column: ColumnId,
}
