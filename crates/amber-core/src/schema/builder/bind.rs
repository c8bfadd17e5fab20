use super::{BuildSchema, JoinColumnDef, Mapping};
use crate::{
    schema::{
        app::{CascadeType, FieldId, FieldTy, ModelId, SubField},
        db::{self, ColumnId, ForeignColumn, LinkOwner, TableId},
    },
    Error, Result,
};

/// A resolved join column: its name and the key column it references.
struct JoinColumn {
    name: String,
    target: ColumnId,
    nullable: Option<bool>,
    unique: bool,
}

impl BuildSchema<'_> {
    /// Binds columns and links of every non-key entity field. Inverse sides
    /// are resolved afterwards since they reference links bound here.
    pub(super) fn bind_fields(&mut self) -> Result<()> {
        for model in self.entities_in_hierarchy_order() {
            for index in 0..self.app.models[model.0].fields.len() {
                let id = model.field(index);
                let field = self.app.field(id);

                if field.is_key() {
                    continue;
                }

                match field.ty {
                    FieldTy::Property(_) => self.bind_property(id)?,
                    FieldTy::Version(_) => self.bind_version(id)?,
                    FieldTy::Embedded(_) => self.bind_embedded(id, false)?,
                    FieldTy::ManyToOne(_) => self.bind_many_to_one(id)?,
                    FieldTy::ManyToMany(_) => self.bind_many_to_many(id)?,
                    FieldTy::ElementCollection(_) => self.bind_element_collection(id)?,
                    _ => {}
                }
            }
        }

        Ok(())
    }

    fn bind_property(&mut self, id: FieldId) -> Result<()> {
        let def = self.field_def(id)?;
        let field = self.app.field(id);
        let table = self.entity(id.model).table;

        let ty = field.declared.clone();
        let storage_ty = db::Type::from_app(&ty, def.column.length)?;
        let nullable = def.column.nullable.unwrap_or(!field.primitive);

        let column = self.create_column(
            table,
            def.column_name(),
            ty,
            storage_ty,
            nullable,
            def.column.unique,
        );

        if let FieldTy::Property(property) = &mut self.field_mut(id).ty {
            property.column = column;
        }
        Ok(())
    }

    fn bind_version(&mut self, id: FieldId) -> Result<()> {
        let def = self.field_def(id)?;
        let table = self.entity(id.model).table;
        let ty = self.app.field(id).declared.clone();
        let storage_ty = db::Type::from_app(&ty, None)?;

        let column = self.create_column(table, def.column_name(), ty, storage_ty, false, false);

        if let FieldTy::Version(version) = &mut self.field_mut(id).ty {
            version.column = column;
        }
        Ok(())
    }

    /// Copies the embeddable's basic fields onto the owner's table.
    pub(super) fn bind_embedded(&mut self, id: FieldId, key: bool) -> Result<()> {
        let table = self.entity(id.model).table;
        let builder = self.builder;
        let target = self.app.field(id).ty.expect_embedded().target;
        let target_def = &builder.models[target.0];
        let mut fields = vec![];

        for (index, sub_def) in target_def.fields.iter().enumerate() {
            let sub = &self.app.models[target.0].fields[index];

            if !sub.ty.is_property() {
                return Err(Error::invalid_mapping(format!(
                    "{}.{}: embeddable fields must be basic properties",
                    target_def.name, sub.name
                )));
            }

            let name = sub.name.clone();
            let ty = sub.declared.clone();
            let storage_ty = db::Type::from_app(&ty, sub_def.column.length)?;
            let nullable = !key && sub_def.column.nullable.unwrap_or(!sub.primitive);

            let column = self.create_column(
                table,
                sub_def.column_name(),
                ty.clone(),
                storage_ty,
                nullable,
                sub_def.column.unique,
            );

            if key {
                self.db.tables[table.0].add_primary_key(column);
            }

            fields.push(SubField { name, column, ty });
        }

        if fields.is_empty() {
            return Err(Error::invalid_mapping(format!(
                "{}: embeddable `{}` has no fields",
                self.field_path(id),
                target_def.name
            )));
        }

        match &mut self.field_mut(id).ty {
            FieldTy::Embedded(embedded) | FieldTy::EmbeddedId(embedded) => {
                embedded.fields = fields;
            }
            _ => {}
        }
        Ok(())
    }

    /// Creates the foreign-key columns and the link owned by the field.
    pub(super) fn bind_many_to_one(&mut self, id: FieldId) -> Result<()> {
        let def = self.field_def(id)?;
        let Mapping::ManyToOne(to_one) = &def.mapping else {
            return Err(Error::invalid_state(format!(
                "{} is not mapped as a many-to-one",
                self.field_path(id)
            )));
        };

        let field = self.app.field(id);
        let rel = field.ty.expect_many_to_one();
        let (target, key, one_to_one) = (rel.target, rel.key, rel.one_to_one);

        let table = self.entity(id.model).table;
        let target_table = self.entity(target).table;
        let target_columns = self.key_columns(target);

        let join_columns =
            self.join_columns(id, &field.name, &to_one.join_columns, &target_columns)?;
        let single = join_columns.len() == 1;
        let mut columns = vec![];

        for join in join_columns {
            let target_column = self.db.column(join.target).clone();
            let source = &mut self.db.tables[table.0];
            let existing = source.column_by_name(&join.name).is_some();

            let column = source.create_foreign_column(&join.name, &target_column);

            if !existing {
                let column = source.column_mut(column);
                column.nullable = !key && join.nullable.unwrap_or(true);
                column.unique = join.unique || (one_to_one && single);
            }

            columns.push(ForeignColumn {
                column,
                target: join.target,
            });
        }

        let link = self.create_link(LinkOwner::Field(id), table, target_table, columns);

        if to_one.cascade.contains(CascadeType::Remove) {
            self.db.links[link.0].set_target_cascade_delete();
        }

        self.field_mut(id).ty.expect_many_to_one_mut().link = link;
        Ok(())
    }

    fn bind_many_to_many(&mut self, id: FieldId) -> Result<()> {
        let def = self.field_def(id)?;
        let Mapping::ManyToMany(many_to_many) = &def.mapping else {
            return Err(Error::invalid_state(format!(
                "{} is not mapped as a many-to-many",
                self.field_path(id)
            )));
        };

        let target = self.app.field(id).target().ok_or_else(|| {
            Error::invalid_state(format!("{} has no target", self.field_path(id)))
        })?;

        let name = match &many_to_many.join_table {
            Some(name) => name.clone(),
            None => format!(
                "{}_{}",
                self.base_table_name(id.model),
                self.base_table_name(target)
            ),
        };
        let table = self.create_table(&name)?;

        let owner_prefix = self.app.models[id.model.0].name.snake_case();
        let source_link = self.bind_join_link(
            id,
            table,
            id.model,
            &owner_prefix,
            &many_to_many.join_columns,
        )?;

        let target_prefix = self.app.field(id).name.clone();
        let target_link = self.bind_join_link(
            id,
            table,
            target,
            &target_prefix,
            &many_to_many.inverse_join_columns,
        )?;

        self.db.links[source_link.0].set_source_cascade_delete();

        if let FieldTy::ManyToMany(rel) = &mut self.field_mut(id).ty {
            rel.table = table;
            rel.source_link = source_link;
            rel.target_link = target_link;
        }
        Ok(())
    }

    fn bind_element_collection(&mut self, id: FieldId) -> Result<()> {
        let def = self.field_def(id)?;
        let Mapping::ElementCollection(collection) = &def.mapping else {
            return Err(Error::invalid_state(format!(
                "{} is not mapped as an element collection",
                self.field_path(id)
            )));
        };

        let field_name = self.app.field(id).name.clone();
        let name = match &collection.table {
            Some(name) => name.clone(),
            None => format!("{}_{}", self.base_table_name(id.model), field_name),
        };
        let table = self.create_table(&name)?;

        let owner_prefix = self.app.models[id.model.0].name.snake_case();
        let source_link = self.bind_join_link(
            id,
            table,
            id.model,
            &owner_prefix,
            &collection.join_columns,
        )?;
        self.db.links[source_link.0].set_source_cascade_delete();

        let element = collection.element.clone();
        let storage_ty = db::Type::from_app(&element, None)?;
        let column = self.create_column(
            table,
            collection.column.as_deref().unwrap_or(&field_name),
            element,
            storage_ty,
            true,
            false,
        );

        if let FieldTy::ElementCollection(rel) = &mut self.field_mut(id).ty {
            rel.table = table;
            rel.source_link = source_link;
            rel.column = column;
        }
        Ok(())
    }

    /// Creates not-null columns on `table` referencing `target`'s key and
    /// the link connecting them. Join and collection tables key their rows
    /// by these columns.
    fn bind_join_link(
        &mut self,
        owner: FieldId,
        table: TableId,
        target: ModelId,
        prefix: &str,
        defs: &[JoinColumnDef],
    ) -> Result<db::LinkId> {
        let target_table = self.entity(target).table;
        let target_columns = self.key_columns(target);
        let join_columns = self.join_columns(owner, prefix, defs, &target_columns)?;
        let join_table = self.db.tables[table.0].name.clone();
        let mut columns = vec![];

        for join in join_columns {
            let target_column = self.db.column(join.target).clone();

            if self.db.tables[table.0].column_by_name(&join.name).is_some() {
                return Err(Error::invalid_mapping(format!(
                    "{}: column `{}` appears twice in table `{join_table}`",
                    self.field_path(owner),
                    join.name
                )));
            }

            let column =
                self.db.tables[table.0].create_foreign_column(&join.name, &target_column);
            self.db.tables[table.0].column_mut(column).nullable = false;

            columns.push(ForeignColumn {
                column,
                target: join.target,
            });
        }

        Ok(self.create_link(LinkOwner::Field(owner), table, target_table, columns))
    }

    /// Resolves join columns against the referenced key columns. Without
    /// explicit definitions each column is named `<prefix>_<key column>`.
    fn join_columns(
        &self,
        owner: FieldId,
        prefix: &str,
        defs: &[JoinColumnDef],
        targets: &[ColumnId],
    ) -> Result<Vec<JoinColumn>> {
        if defs.is_empty() {
            return Ok(targets
                .iter()
                .map(|target| JoinColumn {
                    name: format!("{prefix}_{}", self.db.column(*target).name),
                    target: *target,
                    nullable: None,
                    unique: false,
                })
                .collect());
        }

        if defs.len() != targets.len() {
            return Err(Error::invalid_mapping(format!(
                "{}: expected {} join columns, found {}",
                self.field_path(owner),
                targets.len(),
                defs.len()
            )));
        }

        defs.iter()
            .enumerate()
            .map(|(position, def)| {
                let target = match &def.referenced {
                    Some(name) => targets
                        .iter()
                        .copied()
                        .find(|target| self.db.column(*target).name == *name)
                        .ok_or_else(|| {
                            Error::invalid_mapping(format!(
                                "{}: join column `{}` references unknown key column `{name}`",
                                self.field_path(owner),
                                def.name
                            ))
                        })?,
                    None => targets[position],
                };

                Ok(JoinColumn {
                    name: def.name.clone(),
                    target,
                    nullable: def.nullable,
                    unique: def.unique,
                })
            })
            .collect()
    }
}
