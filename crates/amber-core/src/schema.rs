pub mod app;

mod builder;
pub use builder::{
    Builder, ColumnDef, ElementCollectionDef, FieldDef, GeneratorDef, JoinColumnDef, Mapping,
    ManyToManyDef, ModelDef, ModelDefKind, OneToManyDef, OrderByDef, ToOneDef,
};

pub mod db;

mod name;
pub use name::Name;

mod verify;

use app::{EntityModel, Field, FieldId, Model, ModelId};
use db::{Column, ColumnId, Table};
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct Schema {
    /// Application-level schema
    pub app: app::Schema,

    /// Database-level schema
    pub db: Arc<db::Schema>,
}

impl Schema {
    pub fn builder() -> Builder {
        Builder::default()
    }

    pub fn model(&self, id: impl Into<ModelId>) -> &Model {
        self.app.model(id)
    }

    pub fn field(&self, id: FieldId) -> &Field {
        self.app.field(id)
    }

    /// The entity part of a model.
    ///
    /// # Panics
    ///
    /// Panics if the model is not an entity.
    #[track_caller]
    pub fn entity(&self, id: impl Into<ModelId>) -> &EntityModel {
        self.app.model(id).expect_entity()
    }

    pub fn table_for(&self, id: impl Into<ModelId>) -> &Table {
        self.db.table(self.entity(id).table)
    }

    pub fn column(&self, id: impl Into<ColumnId>) -> &Column {
        self.db.column(id)
    }
}
