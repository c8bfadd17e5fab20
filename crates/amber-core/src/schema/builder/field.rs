use super::{BuildSchema, FieldDef, Mapping, ModelDef, ModelDefKind};
use crate::{
    schema::{
        app::{
            Accessor, DependentOneToOne, ElementCollection, Embedded, Field, FieldId, FieldTy, Key,
            ManyToMany, ManyToOne, ModelId, OneToMany, Property, Version,
        },
        db::{ColumnId, LinkId, TableId},
    },
    stmt::Type,
    Error, Result,
};

impl<'a> BuildSchema<'a> {
    pub(super) fn build_fields(&mut self) -> Result<()> {
        let (shared, entities): (Vec<_>, Vec<_>) = self
            .app
            .models
            .iter()
            .map(|model| model.id)
            .partition(|id| !self.app.models[id.0].is_entity());

        for model in shared.into_iter().chain(entities) {
            self.build_model_fields(model)?;
        }

        Ok(())
    }

    fn build_model_fields(&mut self, model: ModelId) -> Result<()> {
        let builder = self.builder;
        let def = &builder.models[model.0];
        let mut fields: Vec<Field> = vec![];

        if def.kind == ModelDefKind::Entity {
            for (superclass, index) in self.inherited_fields(def)? {
                let id = model.field(fields.len());
                let inherited = &self.app.models[superclass.0].fields[index];

                fields.push(inherited.override_to(id, ColumnId::placeholder())?);
                self.field_defs
                    .insert(id, &builder.models[superclass.0].fields[index]);
            }
        }

        for field_def in &def.fields {
            let id = model.field(fields.len());
            fields.push(self.build_field(id, def, field_def)?);
            self.field_defs.insert(id, field_def);
        }

        for (i, field) in fields.iter().enumerate() {
            if fields[..i].iter().any(|other| other.name == field.name) {
                return Err(Error::invalid_mapping(format!(
                    "{}: property `{}` is mapped more than once",
                    def.name, field.name
                )));
            }
        }

        self.app.models[model.0].fields = fields;
        Ok(())
    }

    /// Fields contributed by the entity's mapped superclass chain, root-most
    /// superclass first.
    fn inherited_fields(&self, def: &ModelDef) -> Result<Vec<(ModelId, usize)>> {
        let mut chain = vec![];
        let mut next = def.extends.as_deref();

        while let Some(name) = next {
            let id = self.lookup(name)?;
            let superclass = &self.builder.models[id.0];

            if superclass.kind != ModelDefKind::MappedSuperclass {
                break;
            }

            chain.push(id);
            next = superclass.extends.as_deref();
        }

        Ok(chain
            .into_iter()
            .rev()
            .flat_map(|id| (0..self.app.models[id.0].fields.len()).map(move |index| (id, index)))
            .collect())
    }

    fn build_field(&self, id: FieldId, owner: &ModelDef, def: &FieldDef) -> Result<Field> {
        let accessor = Accessor::resolve(&owner.name, &def.property)?;
        let name = &def.property.name;
        let path = || format!("{}.{}", owner.name, name);

        let mut declared = def.property.ty.clone();
        let mut lazy = def.lazy.unwrap_or(false);

        let ty = match &def.mapping {
            Mapping::Basic => {
                if !declared.is_scalar() {
                    return Err(Error::invalid_mapping(format!(
                        "{}: type {declared:?} is not a basic type",
                        path()
                    )));
                }

                FieldTy::Property(Property {
                    column: ColumnId::placeholder(),
                    insertable: def.column.insertable,
                    updatable: def.column.updatable,
                    alias_key: None,
                })
            }
            Mapping::Id { .. } => {
                if !declared.is_scalar() {
                    return Err(Error::invalid_mapping(format!(
                        "{}: key type {declared:?} is not a basic type",
                        path()
                    )));
                }

                lazy = false;
                FieldTy::Key(Key {
                    column: ColumnId::placeholder(),
                    generator: None,
                })
            }
            Mapping::Version => {
                if !Version::supports(&declared) {
                    return Err(Error::invalid_configuration(format!(
                        "{}: version type {declared:?} is not an integer",
                        path()
                    )));
                }

                lazy = false;
                FieldTy::Version(Version {
                    column: ColumnId::placeholder(),
                })
            }
            Mapping::Embedded { target } | Mapping::EmbeddedId { target } => {
                let target = self.expect_kind(&owner.name, target, ModelDefKind::Embeddable)?;
                let embedded = Embedded {
                    target,
                    fields: vec![],
                    insertable: def.column.insertable,
                    updatable: def.column.updatable,
                };

                lazy = false;
                declared = Type::Embeddable(target);

                if matches!(def.mapping, Mapping::EmbeddedId { .. }) {
                    FieldTy::EmbeddedId(embedded)
                } else {
                    FieldTy::Embedded(embedded)
                }
            }
            Mapping::ManyToOne(to_one) => {
                let target = self.expect_kind(&owner.name, &to_one.target, ModelDefKind::Entity)?;

                if to_one.id {
                    lazy = false;
                }

                declared = Type::Model(target);
                FieldTy::ManyToOne(ManyToOne {
                    target,
                    link: LinkId::placeholder(),
                    cascade: to_one.cascade,
                    insertable: def.column.insertable,
                    updatable: def.column.updatable,
                    key: to_one.id,
                    one_to_one: to_one.one_to_one,
                    alias: None,
                    dependent: None,
                    target_load_group: None,
                })
            }
            Mapping::OneToMany(one_to_many) => {
                let target =
                    self.expect_kind(&owner.name, &one_to_many.target, ModelDefKind::Entity)?;

                lazy = def.lazy.unwrap_or(true);
                declared = Type::list(Type::Model(target));
                FieldTy::OneToMany(OneToMany {
                    target,
                    source: FieldId::placeholder(),
                    link: LinkId::placeholder(),
                    cascade: one_to_many.cascade,
                    order_by: vec![],
                    map_key: None,
                })
            }
            Mapping::ManyToMany(many_to_many) => {
                let target =
                    self.expect_kind(&owner.name, &many_to_many.target, ModelDefKind::Entity)?;

                lazy = def.lazy.unwrap_or(true);
                declared = Type::list(Type::Model(target));
                FieldTy::ManyToMany(ManyToMany {
                    target,
                    table: TableId::placeholder(),
                    source_link: LinkId::placeholder(),
                    target_link: LinkId::placeholder(),
                    cascade: many_to_many.cascade,
                    order_by: vec![],
                })
            }
            Mapping::ElementCollection(collection) => {
                if !collection.element.is_scalar() {
                    return Err(Error::invalid_mapping(format!(
                        "{}: element type {:?} is not a basic type",
                        path(),
                        collection.element
                    )));
                }

                lazy = def.lazy.unwrap_or(true);
                declared = Type::list(collection.element.clone());
                FieldTy::ElementCollection(ElementCollection {
                    element: collection.element.clone(),
                    table: TableId::placeholder(),
                    source_link: LinkId::placeholder(),
                    column: ColumnId::placeholder(),
                    ordered: collection.ordered,
                })
            }
            Mapping::OneToOneMappedBy {
                target, cascade, ..
            } => {
                let target = self.expect_kind(&owner.name, target, ModelDefKind::Entity)?;

                declared = Type::Model(target);
                FieldTy::DependentOneToOne(DependentOneToOne {
                    target,
                    target_field: FieldId::placeholder(),
                    link: LinkId::placeholder(),
                    cascade: *cascade,
                })
            }
        };

        if def.lazy == Some(true) && !lazy {
            tracing::debug!(
                field = %path(),
                kind = ty.kind_name(),
                "ignoring lazy fetch on a field that is always loaded eagerly"
            );
        }

        tracing::trace!(field = %path(), kind = ty.kind_name(), lazy, "built field");

        Ok(Field {
            id,
            name: name.clone(),
            accessor,
            ty,
            declared,
            primitive: def.property.primitive,
            lazy,
            overridden: false,
            load_group: None,
            update_index: None,
        })
    }
}
