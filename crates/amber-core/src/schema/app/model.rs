use super::{Field, FieldId, Id};
use crate::schema::Name;
use crate::schema::db::TableId;
use std::fmt;

#[derive(Debug, Clone)]
pub struct Model {
    /// Uniquely identifies the model within the schema
    pub id: ModelId,

    /// Name of the model
    pub name: Name,

    /// Fields declared by the model. Fields inherited from a joined parent
    /// live on the parent.
    pub fields: Vec<Field>,

    pub kind: ModelKind,
}

#[derive(Debug, Clone)]
pub enum ModelKind {
    /// Entity mapped to a table
    Entity(EntityModel),

    /// Value object flattened into its owner's table
    Embeddable,

    /// Supplies fields to entities but is never mapped itself
    MappedSuperclass,
}

#[derive(Debug, Clone)]
pub struct EntityModel {
    /// Table holding the model's own fields
    pub table: TableId,

    /// Joined-inheritance parent
    pub parent: Option<ModelId>,

    /// Primary key
    pub id: Id,

    /// Optimistic locking field, possibly inherited
    pub version: Option<FieldId>,

    /// Load group shared by the model's eager fields
    pub default_load_group: usize,

    /// Load mask bits needed by an instance, covering inherited fields
    pub load_group_count: usize,

    /// Dirty mask bits needed by an instance, covering inherited fields
    pub dirty_count: usize,

    /// First dirty index owned by this model
    pub min_dirty_index: usize,
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ModelId(pub usize);

impl Model {
    pub fn is_entity(&self) -> bool {
        matches!(self.kind, ModelKind::Entity(_))
    }

    pub fn is_embeddable(&self) -> bool {
        matches!(self.kind, ModelKind::Embeddable)
    }

    pub fn as_entity(&self) -> Option<&EntityModel> {
        match &self.kind {
            ModelKind::Entity(entity) => Some(entity),
            _ => None,
        }
    }

    #[track_caller]
    pub fn expect_entity(&self) -> &EntityModel {
        match &self.kind {
            ModelKind::Entity(entity) => entity,
            _ => panic!("expected entity model, but `{}` is not", self.name.upper_camel_case()),
        }
    }

    #[track_caller]
    pub fn expect_entity_mut(&mut self) -> &mut EntityModel {
        match &mut self.kind {
            ModelKind::Entity(entity) => entity,
            _ => panic!("expected entity model, but `{}` is not", self.name.upper_camel_case()),
        }
    }

    pub fn field(&self, index: usize) -> &Field {
        &self.fields[index]
    }

    pub fn field_by_name(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|field| field.name == name)
    }

    pub fn table(&self) -> Option<TableId> {
        self.as_entity().map(|entity| entity.table)
    }

    pub fn parent(&self) -> Option<ModelId> {
        self.as_entity().and_then(|entity| entity.parent)
    }
}

impl ModelId {
    /// Create a `FieldId` representing the current model's field at index
    /// `index`.
    pub const fn field(self, index: usize) -> FieldId {
        FieldId { model: self, index }
    }

    pub(crate) const fn placeholder() -> Self {
        Self(usize::MAX)
    }
}

impl From<&Model> for ModelId {
    fn from(value: &Model) -> Self {
        value.id
    }
}

impl From<&mut Model> for ModelId {
    fn from(value: &mut Model) -> Self {
        value.id
    }
}

impl fmt::Debug for ModelId {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(fmt, "ModelId({})", self.0)
    }
}
