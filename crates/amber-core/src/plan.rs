//! Statement and accessor plans derived from the schema.
//!
//! Plans are structured statements plus the bindings needed to fill their
//! parameters from an entity instance. The runtime session interprets them;
//! code generators can render them with `amber-sql`.

mod accessor;
pub use accessor::{getter, setter, Equality, GetterPlan, SetterPlan};

mod collection;
pub use collection::{association, collection, AssociationPlan, CollectionPlan, CollectionRows};

mod delete;
pub use delete::{delete, TableDelete};

mod insert;
pub use insert::{insert, max_key, TableInsert};

mod load;
pub use load::{load_group, LoadGroupPlan};

mod update;
pub use update::{update, TableUpdate};

use crate::schema::app::{FieldId, Part};

/// Alias used for the entity table in generated SELECTs.
pub const ALIAS: &str = "o";

/// A field value slot read from, or written to, a statement column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ColumnTarget {
    pub field: FieldId,
    pub part: Part,
}

/// Source of one statement parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Bind {
    /// Part of a field's current value.
    Field(ColumnTarget),

    /// Key column `n` of the instance, in key column order.
    Key(usize),

    /// The version the instance was loaded with.
    Version,

    /// The version the statement writes.
    NextVersion,
}
