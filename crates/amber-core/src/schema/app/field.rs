mod embedded;
pub use embedded::{Embedded, SubField};

mod init;

mod key;
pub use key::Key;

mod property;
pub use property::Property;

mod sql;

mod version;
pub use version::Version;

use super::{
    Accessor, AssociationKind, CascadeSet, CascadeType, DependentOneToOne, ElementCollection,
    ManyToMany, ManyToOne, ModelId, OneToMany, Phase,
};
use crate::{
    schema::db::{self, ColumnId},
    stmt, Error, Result,
};
use std::fmt;

/// One mapped property of an entity, embeddable or mapped superclass.
#[derive(Debug, Clone)]
pub struct Field {
    /// Uniquely identifies the field within the containing model.
    pub id: FieldId,

    /// The property name
    pub name: String,

    /// How the property value is read and written
    pub accessor: Accessor,

    /// Scalar, key, association, collection, ...
    pub ty: FieldTy,

    /// Declared type of the property
    pub declared: stmt::Type,

    /// True if the declared type is a non-nullable primitive
    pub primitive: bool,

    /// True if the field is fetched by its own load group on first access
    pub lazy: bool,

    /// True if the field was inherited from a mapped superclass
    pub overridden: bool,

    /// Position in the load mask. Assigned once by `init`.
    pub load_group: Option<usize>,

    /// Position in the dirty mask. Assigned once by `init`; fields that are
    /// never written by an UPDATE have none.
    pub update_index: Option<usize>,
}

#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FieldId {
    pub model: ModelId,
    pub index: usize,
}

#[derive(Debug, Clone)]
pub enum FieldTy {
    Property(Property),
    Key(Key),
    Version(Version),
    Embedded(Embedded),
    EmbeddedId(Embedded),
    ManyToOne(ManyToOne),
    OneToMany(OneToMany),
    ManyToMany(ManyToMany),
    ElementCollection(ElementCollection),
    DependentOneToOne(DependentOneToOne),
}

/// A column owned by a field, and which part of the field value it holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldColumn {
    pub column: ColumnId,
    pub part: Part,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Part {
    /// The whole scalar value.
    Whole,

    /// Field `n` of an embedded value.
    Sub(usize),

    /// Component `n` of the target key referenced by a many-to-one.
    Foreign(usize),
}

impl Field {
    /// Gets the id.
    pub fn id(&self) -> FieldId {
        self.id
    }

    /// Gets the name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Gets the type.
    pub fn ty(&self) -> &FieldTy {
        &self.ty
    }

    /// The load group index.
    ///
    /// # Panics
    ///
    /// Panics if the field has not been initialized.
    #[track_caller]
    pub fn load_group_index(&self) -> usize {
        match self.load_group {
            Some(index) => index,
            None => panic!("field `{}` has no load group; was init() called?", self.name),
        }
    }

    pub fn update_index(&self) -> Option<usize> {
        self.update_index
    }

    pub fn is_initialized(&self) -> bool {
        self.load_group.is_some()
    }

    pub fn insertable(&self) -> bool {
        match &self.ty {
            FieldTy::Property(property) => property.insertable,
            FieldTy::Embedded(embedded) => embedded.insertable,
            FieldTy::ManyToOne(many_to_one) => many_to_one.insertable,
            FieldTy::OneToMany(_) | FieldTy::DependentOneToOne(_) => false,
            _ => true,
        }
    }

    pub fn updatable(&self) -> bool {
        match &self.ty {
            FieldTy::Property(property) => property.updatable,
            FieldTy::Embedded(embedded) => embedded.updatable,
            FieldTy::ManyToOne(many_to_one) => many_to_one.updatable && !many_to_one.key,
            FieldTy::Version(_) | FieldTy::ManyToMany(_) | FieldTy::ElementCollection(_) => true,
            FieldTy::Key(_)
            | FieldTy::EmbeddedId(_)
            | FieldTy::OneToMany(_)
            | FieldTy::DependentOneToOne(_) => false,
        }
    }

    /// True if the field takes part in the primary key.
    pub fn is_key(&self) -> bool {
        match &self.ty {
            FieldTy::Key(_) | FieldTy::EmbeddedId(_) => true,
            FieldTy::ManyToOne(many_to_one) => many_to_one.key,
            _ => false,
        }
    }

    /// True if writes to the field are tracked in the dirty mask.
    pub fn is_dirty_tracked(&self) -> bool {
        match &self.ty {
            FieldTy::Key(_)
            | FieldTy::EmbeddedId(_)
            | FieldTy::OneToMany(_)
            | FieldTy::DependentOneToOne(_) => false,
            FieldTy::ManyToOne(many_to_one) => !many_to_one.key,
            _ => true,
        }
    }

    /// True for a one-to-many loaded as a map.
    pub fn is_map(&self) -> bool {
        matches!(&self.ty, FieldTy::OneToMany(rel) if rel.map_key.is_some())
    }

    /// True if the field's value lives in another table and is resolved by
    /// its own load group.
    pub fn is_collection_like(&self) -> bool {
        matches!(
            self.ty,
            FieldTy::OneToMany(_)
                | FieldTy::ManyToMany(_)
                | FieldTy::ElementCollection(_)
                | FieldTy::DependentOneToOne(_)
        )
    }

    /// Cascade configuration, empty for non-association fields.
    pub fn cascade(&self) -> CascadeSet {
        match &self.ty {
            FieldTy::ManyToOne(rel) => rel.cascade,
            FieldTy::OneToMany(rel) => rel.cascade,
            FieldTy::ManyToMany(rel) => rel.cascade,
            FieldTy::DependentOneToOne(rel) => rel.cascade,
            _ => CascadeSet::NONE,
        }
    }

    pub fn association_kind(&self) -> Option<AssociationKind> {
        match &self.ty {
            FieldTy::ManyToOne(_) => Some(AssociationKind::ToOne),
            FieldTy::OneToMany(_) | FieldTy::ManyToMany(_) => Some(AssociationKind::Collection),
            FieldTy::DependentOneToOne(_) => Some(AssociationKind::Dependent),
            _ => None,
        }
    }

    /// Phase in which `op` cascades through this field, or `None` if the
    /// field does not cascade `op`.
    pub fn cascade_phase(&self, op: CascadeType) -> Option<Phase> {
        let kind = self.association_kind()?;

        if self.cascade().contains(op) {
            Some(Phase::default_for(kind, op))
        } else {
            None
        }
    }

    /// Target entity of an association.
    pub fn target(&self) -> Option<ModelId> {
        match &self.ty {
            FieldTy::ManyToOne(rel) => Some(rel.target),
            FieldTy::OneToMany(rel) => Some(rel.target),
            FieldTy::ManyToMany(rel) => Some(rel.target),
            FieldTy::DependentOneToOne(rel) => Some(rel.target),
            _ => None,
        }
    }

    /// Load group tracking whether a many-to-one's target has been resolved.
    pub fn target_load_group(&self) -> Option<usize> {
        match &self.ty {
            FieldTy::ManyToOne(rel) => rel.target_load_group,
            _ => None,
        }
    }

    /// Columns owned by the field, in value order. Collection fields own no
    /// columns on the entity's tables.
    pub fn columns(&self, db: &db::Schema) -> Vec<FieldColumn> {
        let whole = |column| {
            vec![FieldColumn {
                column,
                part: Part::Whole,
            }]
        };

        match &self.ty {
            FieldTy::Property(property) => whole(property.column),
            FieldTy::Key(key) => whole(key.column),
            FieldTy::Version(version) => whole(version.column),
            FieldTy::Embedded(embedded) | FieldTy::EmbeddedId(embedded) => embedded
                .fields
                .iter()
                .enumerate()
                .map(|(i, sub)| FieldColumn {
                    column: sub.column,
                    part: Part::Sub(i),
                })
                .collect(),
            FieldTy::ManyToOne(rel) => db
                .link(rel.link)
                .source_columns()
                .enumerate()
                .map(|(i, column)| FieldColumn {
                    column,
                    part: Part::Foreign(i),
                })
                .collect(),
            FieldTy::OneToMany(_)
            | FieldTy::ManyToMany(_)
            | FieldTy::ElementCollection(_)
            | FieldTy::DependentOneToOne(_) => vec![],
        }
    }

    /// Returns a copy of the field bound to a different owner, used when an
    /// entity inherits the field from a mapped superclass.
    ///
    /// Laziness and insert/update flags are copied; load group and update
    /// index are not, so the copy must be initialized by its new owner.
    /// `column` replaces the column of scalar fields.
    pub fn override_to(&self, id: FieldId, column: ColumnId) -> Result<Field> {
        let ty = match &self.ty {
            FieldTy::Property(property) => FieldTy::Property(Property {
                column,
                alias_key: None,
                ..property.clone()
            }),
            FieldTy::Key(key) => FieldTy::Key(Key {
                column,
                ..key.clone()
            }),
            FieldTy::Version(_) => FieldTy::Version(Version { column }),
            FieldTy::ManyToOne(rel) => FieldTy::ManyToOne(ManyToOne {
                alias: None,
                dependent: None,
                target_load_group: None,
                ..rel.clone()
            }),
            _ => {
                return Err(Error::invalid_state(format!(
                    "field `{}` of kind {} cannot be overridden",
                    self.name,
                    self.ty.kind_name()
                )))
            }
        };

        Ok(Field {
            id,
            name: self.name.clone(),
            accessor: self.accessor.clone(),
            ty,
            declared: self.declared.clone(),
            primitive: self.primitive,
            lazy: self.lazy,
            overridden: true,
            load_group: None,
            update_index: None,
        })
    }
}

impl FieldTy {
    pub fn kind_name(&self) -> &'static str {
        match self {
            FieldTy::Property(_) => "property",
            FieldTy::Key(_) => "key",
            FieldTy::Version(_) => "version",
            FieldTy::Embedded(_) => "embedded",
            FieldTy::EmbeddedId(_) => "embedded id",
            FieldTy::ManyToOne(_) => "many-to-one",
            FieldTy::OneToMany(_) => "one-to-many",
            FieldTy::ManyToMany(_) => "many-to-many",
            FieldTy::ElementCollection(_) => "element collection",
            FieldTy::DependentOneToOne(_) => "dependent one-to-one",
        }
    }

    pub fn is_property(&self) -> bool {
        matches!(self, Self::Property(..))
    }

    pub fn as_property(&self) -> Option<&Property> {
        match self {
            Self::Property(property) => Some(property),
            _ => None,
        }
    }

    #[track_caller]
    pub fn expect_property(&self) -> &Property {
        match self {
            Self::Property(property) => property,
            _ => panic!("expected property field, but was {self:?}"),
        }
    }

    pub fn is_key(&self) -> bool {
        matches!(self, Self::Key(..))
    }

    pub fn as_key(&self) -> Option<&Key> {
        match self {
            Self::Key(key) => Some(key),
            _ => None,
        }
    }

    #[track_caller]
    pub fn expect_key(&self) -> &Key {
        match self {
            Self::Key(key) => key,
            _ => panic!("expected key field, but was {self:?}"),
        }
    }

    pub fn is_version(&self) -> bool {
        matches!(self, Self::Version(..))
    }

    pub fn as_embedded(&self) -> Option<&Embedded> {
        match self {
            Self::Embedded(embedded) | Self::EmbeddedId(embedded) => Some(embedded),
            _ => None,
        }
    }

    #[track_caller]
    pub fn expect_embedded(&self) -> &Embedded {
        match self {
            Self::Embedded(embedded) | Self::EmbeddedId(embedded) => embedded,
            _ => panic!("expected embedded field, but was {self:?}"),
        }
    }

    pub fn is_many_to_one(&self) -> bool {
        matches!(self, Self::ManyToOne(..))
    }

    pub fn as_many_to_one(&self) -> Option<&ManyToOne> {
        match self {
            Self::ManyToOne(rel) => Some(rel),
            _ => None,
        }
    }

    #[track_caller]
    pub fn expect_many_to_one(&self) -> &ManyToOne {
        match self {
            Self::ManyToOne(rel) => rel,
            _ => panic!("expected many-to-one field, but was {self:?}"),
        }
    }

    #[track_caller]
    pub fn expect_many_to_one_mut(&mut self) -> &mut ManyToOne {
        match self {
            Self::ManyToOne(rel) => rel,
            _ => panic!("expected many-to-one field, but was {self:?}"),
        }
    }

    pub fn as_one_to_many(&self) -> Option<&OneToMany> {
        match self {
            Self::OneToMany(rel) => Some(rel),
            _ => None,
        }
    }

    #[track_caller]
    pub fn expect_one_to_many(&self) -> &OneToMany {
        match self {
            Self::OneToMany(rel) => rel,
            _ => panic!("expected one-to-many field, but was {self:?}"),
        }
    }

    pub fn as_many_to_many(&self) -> Option<&ManyToMany> {
        match self {
            Self::ManyToMany(rel) => Some(rel),
            _ => None,
        }
    }

    pub fn as_element_collection(&self) -> Option<&ElementCollection> {
        match self {
            Self::ElementCollection(rel) => Some(rel),
            _ => None,
        }
    }

    pub fn as_dependent_one_to_one(&self) -> Option<&DependentOneToOne> {
        match self {
            Self::DependentOneToOne(rel) => Some(rel),
            _ => None,
        }
    }
}

impl FieldId {
    pub fn placeholder() -> FieldId {
        FieldId {
            model: ModelId::placeholder(),
            index: usize::MAX,
        }
    }
}

impl From<&Field> for FieldId {
    fn from(value: &Field) -> Self {
        value.id
    }
}

impl fmt::Debug for FieldId {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(fmt, "FieldId({}/{})", self.model.0, self.index)
    }
}
