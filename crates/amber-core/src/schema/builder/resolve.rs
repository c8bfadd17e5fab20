use super::{BuildSchema, Mapping, OrderByDef};
use crate::{
    schema::{
        app::{FieldId, FieldTy, MapKey, ModelId, OrderByColumn, TypeBuilder},
        db::{ColumnId, TableId},
    },
    stmt::Type,
    Error, Result,
};
use indexmap::IndexMap;

impl BuildSchema<'_> {
    /// Points one-to-many and dependent one-to-one fields at the many-to-one
    /// owning their link, and resolves collection ordering.
    pub(super) fn resolve_inverse_sides(&mut self) -> Result<()> {
        for model in self.entities_in_hierarchy_order() {
            for index in 0..self.app.models[model.0].fields.len() {
                let id = model.field(index);
                let def = self.field_def(id)?;

                match &def.mapping {
                    Mapping::OneToMany(one_to_many) => {
                        let target = self.app.field(id).target().unwrap_or(model);
                        let source = self.mapped_by(id, target, &one_to_many.mapped_by)?;
                        let link = self.app.field(source).ty.expect_many_to_one().link;

                        // Children are selected from the table holding the
                        // foreign key, so ordering columns must live there.
                        let table = self.db.link(link).source;
                        let order_by = self.order_by(id, target, table, &one_to_many.order_by)?;

                        let map_key = match &one_to_many.map_key {
                            Some(name) => {
                                let (field, column) = self
                                    .single_column(target, table, name)
                                    .filter(|(field, _)| self.app.field(*field).ty.is_property())
                                    .ok_or_else(|| {
                                        Error::invalid_mapping(format!(
                                            "{}: map key `{name}` must be a single-column property of {}",
                                            self.field_path(id),
                                            self.owner_name(target)
                                        ))
                                    })?;
                                Some(MapKey { field, column })
                            }
                            None => None,
                        };

                        let declared = map_key.map(|key| {
                            Type::map(self.app.field(key.field).declared.clone(), Type::Model(target))
                        });

                        let field = self.field_mut(id);
                        if let Some(declared) = declared {
                            field.declared = declared;
                        }
                        if let FieldTy::OneToMany(rel) = &mut field.ty {
                            rel.source = source;
                            rel.link = link;
                            rel.order_by = order_by;
                            rel.map_key = map_key;
                        }
                    }
                    Mapping::ManyToMany(many_to_many) => {
                        let target = self.app.field(id).target().unwrap_or(model);
                        let table = self.entity(target).table;
                        let order_by = self.order_by(id, target, table, &many_to_many.order_by)?;

                        if let FieldTy::ManyToMany(rel) = &mut self.field_mut(id).ty {
                            rel.order_by = order_by;
                        }
                    }
                    Mapping::OneToOneMappedBy {
                        target, mapped_by, ..
                    } => {
                        let target = self.lookup(target)?;
                        let source = self.mapped_by(id, target, mapped_by)?;
                        let link = self.app.field(source).ty.expect_many_to_one().link;

                        if let FieldTy::DependentOneToOne(rel) = &mut self.field_mut(id).ty {
                            rel.target_field = source;
                            rel.link = link;
                        }

                        let owner = self.field_mut(source).ty.expect_many_to_one_mut();
                        if let Some(other) = owner.dependent.replace(id) {
                            return Err(Error::invalid_mapping(format!(
                                "{}: already mapped by {other:?}",
                                self.field_path(source)
                            )));
                        }
                    }
                    _ => {}
                }
            }
        }

        Ok(())
    }

    /// Finds the many-to-one named `mapped_by` on `target` that references
    /// the owner of `id` or one of its ancestors.
    fn mapped_by(&self, id: FieldId, target: ModelId, mapped_by: &str) -> Result<FieldId> {
        let error = || {
            Error::invalid_mapping(format!(
                "{}: mapped_by `{mapped_by}` must name a many-to-one on {} referencing {}",
                self.field_path(id),
                self.owner_name(target),
                self.owner_name(id.model)
            ))
        };

        let field = self
            .app
            .field_by_name(target, mapped_by)
            .ok_or_else(error)?;

        match &field.ty {
            FieldTy::ManyToOne(rel) if self.app.is_subtype_of(id.model, rel.target) => {
                Ok(field.id)
            }
            _ => Err(error()),
        }
    }

    fn order_by(
        &self,
        id: FieldId,
        target: ModelId,
        table: TableId,
        defs: &[OrderByDef],
    ) -> Result<Vec<OrderByColumn>> {
        defs.iter()
            .map(|def| match self.single_column(target, table, &def.field) {
                Some((field, column)) => Ok(OrderByColumn {
                    field,
                    column,
                    descending: def.descending,
                }),
                None => Err(Error::invalid_mapping(format!(
                    "{}: cannot order by `{}`; it must be a single-column property of {}",
                    self.field_path(id),
                    def.field,
                    self.owner_name(target)
                ))),
            })
            .collect()
    }

    /// The field `name` of `target` if it maps to exactly one column of
    /// `table`.
    fn single_column(&self, target: ModelId, table: TableId, name: &str) -> Option<(FieldId, ColumnId)> {
        let field = self.app.field_by_name(target, name)?;

        match &self.field_columns(field.id)[..] {
            [column] if column.table == table => Some((field.id, *column)),
            _ => None,
        }
    }

    /// Marks fields whose columns are written by a key field. The key field
    /// owns INSERT and UPDATE of a shared column; the aliased field is only
    /// loaded.
    pub(super) fn resolve_aliases(&mut self) {
        for model in self.entities_in_hierarchy_order() {
            let fields = &self.app.models[model.0].fields;

            let key_columns: Vec<(FieldId, ColumnId)> = fields
                .iter()
                .filter(|field| field.is_key())
                .flat_map(|field| {
                    self.field_columns(field.id)
                        .into_iter()
                        .map(move |column| (field.id, column))
                })
                .collect();

            let aliases: Vec<(FieldId, FieldId)> = fields
                .iter()
                .filter(|field| !field.is_key())
                .filter_map(|field| {
                    let columns = match &field.ty {
                        FieldTy::Property(_) | FieldTy::ManyToOne(_) => {
                            self.field_columns(field.id)
                        }
                        _ => return None,
                    };

                    key_columns
                        .iter()
                        .find(|(_, key_column)| columns.contains(key_column))
                        .map(|(key, _)| (field.id, *key))
                })
                .collect();

            for (field, key) in aliases {
                tracing::trace!(
                    field = %self.field_path(field),
                    key = %self.field_path(key),
                    "aliased to key"
                );

                match &mut self.field_mut(field).ty {
                    FieldTy::Property(property) => property.alias_key = Some(key),
                    FieldTy::ManyToOne(rel) => rel.alias = Some(key),
                    _ => {}
                }
            }
        }
    }

    /// Assigns load groups and update indices, parents before subtypes so a
    /// subtype continues numbering after everything it inherits.
    pub(super) fn init_types(&mut self) -> Result<()> {
        let mut types: IndexMap<ModelId, TypeBuilder> = IndexMap::new();

        for model in self.entities_in_hierarchy_order() {
            let parent = self.entity(model).parent;

            let mut builder = match parent.and_then(|parent| types.get(&parent)) {
                Some(parent) => TypeBuilder::subtype(parent),
                None => TypeBuilder::root(),
            };

            for field in &mut self.app.models[model.0].fields {
                field.init(&mut builder)?;
            }

            let own: Vec<FieldId> = self.app.models[model.0]
                .fields
                .iter()
                .filter(|field| field.ty.is_version())
                .map(|field| field.id)
                .collect();
            let inherited = parent.and_then(|parent| self.entity(parent).version);

            if own.len() + usize::from(inherited.is_some()) > 1 {
                return Err(Error::invalid_mapping(format!(
                    "{}: more than one version field",
                    self.owner_name(model)
                )));
            }

            let entity = self.entity_mut(model);
            entity.version = own.first().copied().or(inherited);
            entity.default_load_group = builder.default_load_group_index();
            entity.load_group_count = builder.load_group_count();
            entity.dirty_count = builder.dirty_count();
            entity.min_dirty_index = builder.min_dirty_index();

            tracing::debug!(
                model = %self.owner_name(model),
                load_groups = builder.load_group_count(),
                dirty = builder.dirty_count(),
                "initialized entity type"
            );

            types.insert(model, builder);
        }

        Ok(())
    }
}
