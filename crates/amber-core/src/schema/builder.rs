mod bind;

mod def;
pub use def::{
    ColumnDef, ElementCollectionDef, FieldDef, GeneratorDef, JoinColumnDef, ManyToManyDef,
    Mapping, ModelDef, ModelDefKind, OneToManyDef, OrderByDef, ToOneDef,
};

mod field;
mod key;
mod resolve;

use super::{
    app::{self, EntityModel, FieldId, Id, Model, ModelId, ModelKind},
    db::{self, ColumnId, ForeignColumn, LinkColumns, LinkId, LinkOwner, Table, TableId},
    Name, Schema,
};
use crate::{stmt, Error, Result};
use indexmap::{IndexMap, IndexSet};
use std::sync::Arc;

/// Builds a [`Schema`] from model definitions.
#[derive(Debug, Default)]
pub struct Builder {
    /// If set, prefix all table names with this string
    table_name_prefix: Option<String>,

    models: Vec<ModelDef>,
}

/// Used to track state during the build process
struct BuildSchema<'a> {
    /// Build options
    builder: &'a Builder,

    /// Maps snake-case model names to identifiers.
    model_lookup: IndexMap<String, ModelId>,

    /// Maps table names to identifiers.
    table_lookup: IndexMap<String, TableId>,

    app: app::Schema,
    db: db::Schema,

    /// Definition each field was built from. Fields inherited from a mapped
    /// superclass point at the superclass definition.
    field_defs: IndexMap<FieldId, &'a FieldDef>,

    /// Entities whose primary key columns have been bound.
    keyed: IndexSet<ModelId>,
}

impl Builder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn table_name_prefix(&mut self, prefix: &str) -> &mut Self {
        self.table_name_prefix = Some(prefix.to_string());
        self
    }

    pub fn model(&mut self, model: ModelDef) -> &mut Self {
        self.models.push(model);
        self
    }

    pub fn build(&self) -> Result<Schema> {
        let mut builder = BuildSchema {
            builder: self,
            model_lookup: IndexMap::new(),
            table_lookup: IndexMap::new(),
            app: app::Schema::default(),
            db: db::Schema::default(),
            field_defs: IndexMap::new(),
            keyed: IndexSet::new(),
        };

        builder.declare_models()?;

        // Fields are created unbound. Embeddables and mapped superclasses
        // are built first so entities can copy from them.
        builder.build_fields()?;

        // Key columns are bound before anything referencing them. A key
        // many-to-one needs its target's key first.
        builder.build_keys()?;

        builder.bind_fields()?;
        builder.resolve_inverse_sides()?;
        builder.resolve_aliases();
        builder.init_types()?;

        let schema = Schema {
            app: builder.app,
            db: Arc::new(builder.db),
        };

        schema.verify()?;

        tracing::debug!(
            models = schema.app.models.len(),
            tables = schema.db.tables.len(),
            links = schema.db.links.len(),
            "built schema"
        );

        Ok(schema)
    }
}

impl<'a> BuildSchema<'a> {
    fn declare_models(&mut self) -> Result<()> {
        let builder = self.builder;

        for (index, def) in builder.models.iter().enumerate() {
            let key = Name::new(&def.name).snake_case();

            if self.model_lookup.insert(key, ModelId(index)).is_some() {
                return Err(Error::invalid_mapping(format!(
                    "model `{}` is declared more than once",
                    def.name
                )));
            }
        }

        for (index, def) in builder.models.iter().enumerate() {
            let id = ModelId(index);

            let kind = match def.kind {
                ModelDefKind::Entity => ModelKind::Entity(self.declare_entity(def)?),
                ModelDefKind::Embeddable => {
                    if let Some(parent) = &def.extends {
                        return Err(Error::invalid_mapping(format!(
                            "{}: embeddable cannot extend `{parent}`",
                            def.name
                        )));
                    }
                    ModelKind::Embeddable
                }
                ModelDefKind::MappedSuperclass => {
                    if let Some(parent) = &def.extends {
                        self.expect_kind(&def.name, parent, ModelDefKind::MappedSuperclass)?;
                    }
                    ModelKind::MappedSuperclass
                }
            };

            self.app.models.push(Model {
                id,
                name: Name::new(&def.name),
                fields: vec![],
                kind,
            });
        }

        self.verify_acyclic_inheritance()
    }

    fn declare_entity(&mut self, def: &ModelDef) -> Result<EntityModel> {
        let parent = match &def.extends {
            Some(parent) => {
                let id = self.lookup(parent)?;

                match self.builder.models[id.0].kind {
                    ModelDefKind::Entity => Some(id),
                    ModelDefKind::MappedSuperclass => None,
                    ModelDefKind::Embeddable => {
                        return Err(Error::invalid_mapping(format!(
                            "{}: entity cannot extend embeddable `{parent}`",
                            def.name
                        )))
                    }
                }
            }
            None => None,
        };

        let table = self.create_table(def.table.as_deref().unwrap_or(&def.name))?;

        Ok(EntityModel {
            table,
            parent,
            id: Id::Simple(FieldId::placeholder()),
            version: None,
            default_load_group: 0,
            load_group_count: 0,
            dirty_count: 0,
            min_dirty_index: 0,
        })
    }

    fn verify_acyclic_inheritance(&self) -> Result<()> {
        for def in &self.builder.models {
            let mut next = def.extends.as_deref();
            let mut depth = 0;

            while let Some(parent) = next {
                depth += 1;
                if depth > self.builder.models.len() {
                    return Err(Error::invalid_mapping(format!(
                        "{}: inheritance cycle through `{parent}`",
                        def.name
                    )));
                }

                next = self.builder.models[self.lookup(parent)?.0].extends.as_deref();
            }
        }

        Ok(())
    }

    fn lookup(&self, name: &str) -> Result<ModelId> {
        self.model_lookup
            .get(&Name::new(name).snake_case())
            .copied()
            .ok_or_else(|| Error::invalid_mapping(format!("unknown model `{name}`")))
    }

    /// Resolves `name`, requiring its definition to be of `kind`.
    fn expect_kind(&self, owner: &str, name: &str, kind: ModelDefKind) -> Result<ModelId> {
        let id = self.lookup(name)?;

        if self.builder.models[id.0].kind != kind {
            let expected = match kind {
                ModelDefKind::Entity => "an entity",
                ModelDefKind::Embeddable => "an embeddable",
                ModelDefKind::MappedSuperclass => "a mapped superclass",
            };
            return Err(Error::invalid_mapping(format!(
                "{owner}: `{name}` is not {expected}"
            )));
        }

        Ok(id)
    }

    fn owner_name(&self, model: ModelId) -> String {
        self.app.models[model.0].name.upper_camel_case()
    }

    /// `Owner.field`, used in error messages.
    fn field_path(&self, id: FieldId) -> String {
        format!("{}.{}", self.owner_name(id.model), self.app.field(id).name)
    }

    fn entity(&self, model: ModelId) -> &EntityModel {
        self.app.models[model.0].expect_entity()
    }

    fn entity_mut(&mut self, model: ModelId) -> &mut EntityModel {
        self.app.models[model.0].expect_entity_mut()
    }

    fn field_mut(&mut self, id: FieldId) -> &mut app::Field {
        &mut self.app.models[id.model.0].fields[id.index]
    }

    fn field_def(&self, id: FieldId) -> Result<&'a FieldDef> {
        self.field_defs
            .get(&id)
            .copied()
            .ok_or_else(|| Error::invalid_state(format!("no definition for field {id:?}")))
    }

    /// Unprefixed table name of an entity, used to derive join table names.
    fn base_table_name(&self, model: ModelId) -> &'a str {
        let def = &self.builder.models[model.0];
        def.table.as_deref().unwrap_or(&def.name)
    }

    fn create_table(&mut self, name: &str) -> Result<TableId> {
        let name = match &self.builder.table_name_prefix {
            Some(prefix) => format!("{prefix}{name}"),
            None => name.to_string(),
        };

        if self.table_lookup.contains_key(&name) {
            return Err(Error::invalid_mapping(format!(
                "table `{name}` is mapped more than once"
            )));
        }

        let id = TableId(self.db.tables.len());
        self.table_lookup.insert(name.clone(), id);
        self.db.tables.push(Table::new(id, name));
        Ok(id)
    }

    /// Registers a column, applying `nullable` and `unique` only when the
    /// column is new. Two fields naming the same column share it.
    fn create_column(
        &mut self,
        table: TableId,
        name: &str,
        ty: stmt::Type,
        storage_ty: db::Type,
        nullable: bool,
        unique: bool,
    ) -> ColumnId {
        let table = &mut self.db.tables[table.0];

        if let Some(column) = table.column_by_name(name) {
            return column.id;
        }

        let id = table.create_column(name, ty, storage_ty);
        let column = table.column_mut(id);
        column.nullable = nullable;
        column.unique = unique;
        id
    }

    fn create_link(
        &mut self,
        owner: LinkOwner,
        source: TableId,
        target: TableId,
        columns: Vec<ForeignColumn>,
    ) -> LinkId {
        let id = LinkId(self.db.links.len());

        self.db.links.push(LinkColumns {
            id,
            owner,
            source,
            target,
            columns,
            cascade_delete: db::CascadeDelete::None,
        });

        self.db.tables[source.0].outgoing.push(id);
        self.db.tables[target.0].incoming.push(id);
        id
    }

    /// Key columns of a keyed entity on its own table, in key order.
    fn key_columns(&self, model: ModelId) -> Vec<ColumnId> {
        match &self.entity(model).id {
            Id::Sub { link, .. } => self.db.link(*link).source_columns().collect(),
            Id::Simple(field) | Id::Embedded { field, .. } => self.field_columns(*field),
            Id::Composite { keys, .. } => keys
                .iter()
                .flat_map(|key| self.field_columns(*key))
                .collect(),
        }
    }

    fn field_columns(&self, id: FieldId) -> Vec<ColumnId> {
        self.app
            .field(id)
            .columns(&self.db)
            .into_iter()
            .map(|fc| fc.column)
            .collect()
    }

    /// Entity models, parents before subtypes.
    fn entities_in_hierarchy_order(&self) -> Vec<ModelId> {
        let mut entities: Vec<_> = self.app.entities().map(|model| model.id).collect();
        entities.sort_by_key(|id| self.app.ancestry(*id).len());
        entities
    }
}
