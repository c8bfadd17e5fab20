use crate::schema::{
    app::{CascadeSet, FieldId, ModelId},
    db::LinkId,
};

/// Reference to one target entity through foreign-key columns on the
/// owner's table. Also models the owning side of a one-to-one and a
/// many-to-one that is part of the primary key.
#[derive(Debug, Clone)]
pub struct ManyToOne {
    /// The target entity
    pub target: ModelId,

    /// Foreign-key columns. Owned by this field.
    pub link: LinkId,

    pub cascade: CascadeSet,

    pub insertable: bool,
    pub updatable: bool,

    /// True if the foreign key is part of the owner's primary key.
    pub key: bool,

    /// True for the owning side of a one-to-one.
    pub one_to_one: bool,

    /// Key field whose column is one of this field's link columns. Setting
    /// an aliased many-to-one is rejected.
    pub alias: Option<FieldId>,

    /// Dependent one-to-one on the target pointing back at this field.
    pub dependent: Option<FieldId>,

    /// Load group tracking whether the target has been resolved.
    pub target_load_group: Option<usize>,
}
