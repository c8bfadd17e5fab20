mod accessor;
pub use accessor::Accessor;

mod cascade;
pub use cascade::{AssociationKind, CascadeSet, CascadeType, Phase};

mod descriptor;
pub use descriptor::{AccessMode, PropertyDescriptor};

mod field;
pub use field::{
    Embedded, Field, FieldColumn, FieldId, FieldTy, Key, Part, Property, SubField, Version,
};

mod id;
pub use id::{Generator, Id, KeyFactories, KeyFactory, KeyParam};

mod load_group;
pub use load_group::TypeBuilder;

mod model;
pub use model::{EntityModel, Model, ModelId, ModelKind};

mod relation;
pub use relation::{
    DependentOneToOne, ElementCollection, ManyToMany, ManyToOne, MapKey, OneToMany,
    OrderByColumn,
};

mod schema;
pub use schema::Schema;
