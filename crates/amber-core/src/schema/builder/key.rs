use super::{BuildSchema, GeneratorDef, Mapping};
use crate::{
    schema::{
        app::{FieldId, FieldTy, Generator, Id, Key, KeyParam, ModelId},
        db::{self, ForeignColumn, LinkOwner},
    },
    stmt::Type,
    Error, Result,
};

impl BuildSchema<'_> {
    /// Binds the primary key of every entity.
    ///
    /// A subtype's key waits for its parent's, and a key many-to-one waits
    /// for its target's. No progress in a full pass means the remaining keys
    /// depend on each other.
    pub(super) fn build_keys(&mut self) -> Result<()> {
        let mut pending: Vec<ModelId> = self.app.entities().map(|model| model.id).collect();

        while !pending.is_empty() {
            let mut remaining = vec![];

            for model in pending.iter().copied() {
                if !self.build_key(model)? {
                    remaining.push(model);
                }
            }

            if remaining.len() == pending.len() {
                let names: Vec<_> = remaining.iter().map(|id| self.owner_name(*id)).collect();
                return Err(Error::invalid_mapping(format!(
                    "cannot resolve the primary keys of [{}]: key associations form a cycle",
                    names.join(", ")
                )));
            }

            pending = remaining;
        }

        Ok(())
    }

    /// Returns `false` if the key depends on a key not bound yet.
    fn build_key(&mut self, model: ModelId) -> Result<bool> {
        let key_fields: Vec<FieldId> = self.app.models[model.0]
            .fields
            .iter()
            .filter(|field| field.is_key())
            .map(|field| field.id)
            .collect();

        if let Some(parent) = self.entity(model).parent {
            if !key_fields.is_empty() {
                return Err(Error::invalid_mapping(format!(
                    "{}: a subtype cannot declare key fields",
                    self.owner_name(model)
                )));
            }

            if !self.keyed.contains(&parent) {
                return Ok(false);
            }

            self.build_sub_key(model, parent);
        } else {
            for key in &key_fields {
                let Some(rel) = self.app.field(*key).ty.as_many_to_one() else {
                    continue;
                };

                if rel.target == model {
                    return Err(Error::invalid_mapping(format!(
                        "{}: a key association cannot reference its own entity",
                        self.field_path(*key)
                    )));
                }

                if !self.keyed.contains(&rel.target) {
                    return Ok(false);
                }
            }

            self.build_root_key(model, key_fields)?;
        }

        self.keyed.insert(model);
        Ok(true)
    }

    /// The subtype table repeats the parent's key column names, each one
    /// referencing the parent's column.
    fn build_sub_key(&mut self, model: ModelId, parent: ModelId) {
        let table = self.entity(model).table;
        let parent_table = self.entity(parent).table;
        let mut columns = vec![];

        for target in self.key_columns(parent) {
            let target_column = self.db.column(target).clone();
            let sub_table = &mut self.db.tables[table.0];

            let column = sub_table.create_foreign_column(&target_column.name, &target_column);
            sub_table.add_primary_key(column);
            columns.push(ForeignColumn { column, target });
        }

        let link = self.create_link(LinkOwner::SubId(model), table, parent_table, columns);
        self.db.links[link.0].set_source_cascade_delete();
        self.entity_mut(model).id = Id::Sub { parent, link };
    }

    fn build_root_key(&mut self, model: ModelId, key_fields: Vec<FieldId>) -> Result<()> {
        let owner = self.owner_name(model);

        if key_fields.is_empty() {
            return Err(Error::invalid_mapping(format!(
                "{owner}: entity has no primary key"
            )));
        }

        let embedded = key_fields
            .iter()
            .find(|key| matches!(self.app.field(**key).ty, FieldTy::EmbeddedId(_)))
            .copied();

        if embedded.is_some() && key_fields.len() > 1 {
            return Err(Error::invalid_mapping(format!(
                "{owner}: an embedded id cannot be combined with other key fields"
            )));
        }

        let mut generated = 0;
        for key in &key_fields {
            if let Mapping::Id {
                generator: Some(_),
            } = self.field_def(*key)?.mapping
            {
                generated += 1;
            }
        }

        if generated > 1 {
            return Err(Error::invalid_mapping(format!(
                "{owner}: more than one key field declares a generator"
            )));
        }

        for key in &key_fields {
            let ty = &self.app.field(*key).ty;

            if ty.is_key() {
                self.bind_key(*key)?;
            } else if ty.is_many_to_one() {
                self.bind_many_to_one(*key)?;
            } else {
                self.bind_embedded(*key, true)?;
            }
        }

        let table = self.entity(model).table;
        for key in &key_fields {
            for column in self.field_columns(*key) {
                self.db.tables[table.0].add_primary_key(column);
            }
        }

        let name = self.app.models[model.0].name.clone();

        let id = if let Some(field) = embedded {
            let params = self
                .app
                .field(field)
                .ty
                .expect_embedded()
                .fields
                .iter()
                .map(|sub| KeyParam {
                    name: sub.name.clone(),
                    ty: sub.ty.clone(),
                })
                .collect();

            let factory = self.app.key_factories.register(model, &name, params);
            Id::Embedded { field, factory }
        } else if key_fields.len() == 1 {
            Id::Simple(key_fields[0])
        } else {
            let params = key_fields
                .iter()
                .map(|key| {
                    let field = self.app.field(*key);
                    let ty = match &field.ty {
                        FieldTy::ManyToOne(rel) => Type::Key(rel.target),
                        _ => field.declared.clone(),
                    };

                    KeyParam {
                        name: field.name.clone(),
                        ty,
                    }
                })
                .collect();

            let factory = self.app.key_factories.register(model, &name, params);
            Id::Composite {
                keys: key_fields,
                factory,
            }
        };

        tracing::trace!(model = %owner, ?id, "bound primary key");
        self.entity_mut(model).id = id;
        Ok(())
    }

    fn bind_key(&mut self, id: FieldId) -> Result<()> {
        let def = self.field_def(id)?;
        let table = self.entity(id.model).table;
        let declared = self.app.field(id).declared.clone();

        let storage_ty = db::Type::from_app(&declared, def.column.length)?;
        let column = self.create_column(
            table,
            def.column_name(),
            declared.clone(),
            storage_ty,
            false,
            def.column.unique,
        );

        let generator = match &def.mapping {
            Mapping::Id {
                generator: Some(generator),
            } => {
                if !declared.is_integer() {
                    return Err(Error::invalid_mapping(format!(
                        "{}: generated keys must have an integer type, not {declared:?}",
                        self.field_path(id)
                    )));
                }

                let table_name = &self.db.tables[table.0].name;
                let generator = match generator {
                    GeneratorDef::Identity => Generator::Identity,
                    GeneratorDef::Auto => Generator::Auto,
                    GeneratorDef::Sequence(name) => Generator::Sequence {
                        name: name
                            .clone()
                            .unwrap_or_else(|| Generator::default_sequence_name(table_name)),
                    },
                    GeneratorDef::Table(name) => Generator::Table {
                        name: name
                            .clone()
                            .unwrap_or_else(|| Generator::default_sequence_name(table_name)),
                    },
                    GeneratorDef::Max => Generator::Max,
                };

                if generator.is_identity() {
                    self.db.tables[table.0].column_mut(column).auto_increment = true;
                }

                Some(generator)
            }
            _ => None,
        };

        self.field_mut(id).ty = FieldTy::Key(Key { column, generator });
        Ok(())
    }
}
