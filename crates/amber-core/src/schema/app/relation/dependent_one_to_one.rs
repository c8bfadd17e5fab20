use crate::schema::{
    app::{CascadeSet, FieldId, ModelId},
    db::LinkId,
};

/// Mapped-by side of a one-to-one: the target's row holds the foreign key.
#[derive(Debug, Clone)]
pub struct DependentOneToOne {
    pub target: ModelId,

    /// Owning many-to-one on the target.
    pub target_field: FieldId,

    /// The target field's link, referenced but not owned.
    pub link: LinkId,

    pub cascade: CascadeSet,
}
