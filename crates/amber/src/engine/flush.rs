use crate::{EntityState, Session};
use amber_core::{
    plan,
    schema::app::{FieldId, FieldTy, Generator},
    stmt::{EntityRef, Statement, Value},
    Connection, Error, Mask, Result,
};

impl<C: Connection> Session<C> {
    /// Inserts the rows of a new instance and registers it as managed.
    ///
    /// Keys from sequences, generator tables and the max strategy are
    /// assigned before the first INSERT; identity keys are read back from
    /// the root table's INSERT.
    pub(crate) fn insert_entity(&mut self, entity: EntityRef) -> Result<()> {
        let schema = self.schema.clone();
        let model = self.entity(entity).model;
        let entity_model = schema.entity(model);
        let id = &entity_model.id;

        if let Some((field, generator)) = id.generator(&schema) {
            let current = self.entity(entity).value(field.id);
            let unassigned = current.is_null() || (field.primitive && current.to_i64() == Some(0));

            let next = match generator {
                _ if !unassigned => None,
                Generator::Sequence { name } | Generator::Table { name } => {
                    Some(self.conn.next_sequence(name)?)
                }
                Generator::Max => {
                    let select = plan::max_key(&schema, model)?;
                    let rows = self.query(&select, &[])?;
                    let max = rows
                        .first()
                        .and_then(|row| row.first())
                        .and_then(Value::to_i64)
                        .unwrap_or(0);
                    Some(max + 1)
                }
                Generator::Identity | Generator::Auto => None,
            };

            if let Some(next) = next {
                tracing::debug!(strategy = generator.strategy(), key = next, "generated key");
                let value = Value::from_i64(&field.declared, next)?;
                self.entity_mut(entity).set_value(field.id, value);
            }
        }

        if !id.is_identity_generator(&schema) {
            let key = self.compute_key(entity)?;

            if key.has_null() {
                return Err(Error::invalid_state(format!(
                    "primary key of `{}` must not be null on creation",
                    schema.model(model).name.upper_camel_case()
                )));
            }

            let root = schema.app.root(model);
            if self.identity.contains_key(&(root, key.clone())) {
                return Err(Error::invalid_state(format!(
                    "`{}` with key {key:?} is already managed",
                    schema.model(model).name.upper_camel_case()
                )));
            }
        }

        if let Some(version) = entity_model.version {
            let initial = Value::from_i64(&schema.field(version).declared, 0)?;
            self.entity_mut(entity).set_value(version, initial);
        }

        for insert in plan::insert(&schema, model) {
            let params = self.bind_params(entity, &insert.binds)?;
            let response = self.execute(&Statement::Insert(insert.stmt), &params)?;

            if let Some(field) = insert.generated {
                let Some(generated) = response.generated_key else {
                    return Err(Error::storage_failed(format!(
                        "INSERT into `{}` returned no generated key",
                        schema.db.table(insert.table).name
                    )));
                };

                let value = match generated.to_i64() {
                    Some(number) => Value::from_i64(&schema.field(field).declared, number)?,
                    None => generated,
                };
                self.entity_mut(entity).set_value(field, value);
            }
        }

        let key = self.compute_key(entity)?;
        self.register(entity, key)?;

        let mut loaded = Mask::full(entity_model.load_group_count);
        for field in schema.app.fields_of(model) {
            if !field.insertable() && !field.is_collection_like() {
                loaded.unset(field.load_group_index());
            }
        }

        let instance = self.entity_mut(entity);
        instance.state = EntityState::Managed;
        instance.loaded = loaded;
        instance.dirty.clear();

        Ok(())
    }

    /// Writes the dirty fields of a managed instance.
    ///
    /// A versioned UPDATE matching no row fails with a condition failed
    /// error and leaves the instance dirty.
    pub(crate) fn update_entity(&mut self, entity: EntityRef) -> Result<()> {
        let instance = self.entity(entity);

        if !instance.is_managed() || instance.dirty.is_empty() {
            return Ok(());
        }

        let schema = self.schema.clone();
        let model = instance.model;
        let dirty = instance.dirty.clone();

        for update in plan::update(&schema, model, &dirty) {
            let params = self.bind_params(entity, &update.binds)?;
            let table = update.stmt.table.clone();
            let response = self.execute(&Statement::Update(update.stmt), &params)?;

            if update.versioned && response.count == 0 {
                tracing::warn!(%table, entity = ?entity, "version check failed on update");
                return Err(Error::condition_failed(format!(
                    "`{table}` row was updated or deleted concurrently"
                )));
            }
        }

        for field in schema.app.fields_of(model) {
            let rewrite = matches!(
                field.ty,
                FieldTy::ManyToMany(_) | FieldTy::ElementCollection(_)
            ) && field.update_index.is_some_and(|index| dirty.get(index));

            if rewrite {
                self.delete_association(entity, field.id)?;
                self.insert_association(entity, field.id)?;
            }
        }

        if let Some(version) = schema.entity(model).version {
            if schema
                .field(version)
                .update_index
                .is_some_and(|index| dirty.get(index))
            {
                let (_, _, next) = self.version(entity)?;
                self.entity_mut(entity).set_value(version, next);
            }
        }

        self.entity_mut(entity).dirty.clear();
        self.updates.shift_remove(&entity);
        Ok(())
    }

    /// Deletes the rows of a managed instance, association rows first. A
    /// versioned DELETE matching no row fails with a condition failed error.
    pub(crate) fn delete_entity(&mut self, entity: EntityRef) -> Result<()> {
        let schema = self.schema.clone();
        let model = self.entity(entity).model;

        // The version check needs the version the row was read with.
        if let Some(version) = schema.entity(model).version {
            self.ensure_loaded(entity, schema.field(version).load_group_index())?;
        }

        for delete in plan::delete(&schema, model) {
            let params = self.bind_params(entity, &delete.binds)?;
            let table = delete.stmt.table.clone();
            let response = self.execute(&Statement::Delete(delete.stmt), &params)?;

            if delete.versioned && response.count == 0 {
                tracing::warn!(%table, entity = ?entity, "version check failed on delete");
                return Err(Error::condition_failed(format!(
                    "`{table}` row was updated or deleted concurrently"
                )));
            }
        }

        Ok(())
    }

    /// Writes the association or collection table rows of every
    /// many-to-many and element collection field.
    pub(crate) fn insert_associations(&mut self, entity: EntityRef) -> Result<()> {
        let schema = self.schema.clone();

        for field in schema.app.fields_of(self.entity(entity).model) {
            if matches!(
                field.ty,
                FieldTy::ManyToMany(_) | FieldTy::ElementCollection(_)
            ) {
                self.insert_association(entity, field.id)?;
            }
        }

        Ok(())
    }

    fn insert_association(&mut self, entity: EntityRef, field: FieldId) -> Result<()> {
        let plan = plan::association(&self.schema, field)?;
        let owner = self.key_columns(entity)?;

        let items = match self.entity(entity).value(field) {
            Value::List(items) => items.clone(),
            Value::Null => vec![],
            other => {
                return Err(Error::invalid_state(format!(
                    "collection `{}` holds {other:?}",
                    self.schema.field(field).name
                )))
            }
        };

        for item in items {
            let mut params = owner.clone();

            match item {
                Value::Entity(target) => {
                    let instance = self.entity(target);

                    let Some(key) = instance.key.as_ref().filter(|_| instance.is_managed()) else {
                        return Err(Error::invalid_state(format!(
                            "`{}` references an instance that is not persistent",
                            self.schema.field(field).name
                        )));
                    };

                    let id = &self.schema.entity(instance.model).id;
                    params.extend(id.column_values(&self.schema, key)?);
                }
                element => params.push(element),
            }

            self.execute(&Statement::Insert(plan.insert.clone()), &params)?;
        }

        Ok(())
    }

    fn delete_association(&mut self, entity: EntityRef, field: FieldId) -> Result<()> {
        let plan = plan::association(&self.schema, field)?;
        let owner = self.key_columns(entity)?;

        self.execute(&Statement::Delete(plan.delete), &owner)?;
        Ok(())
    }
}
