use super::{Cascade, Lifecycle};
use crate::{session::Entity, EntityState, Session};
use amber_core::{
    plan,
    schema::{
        app::{CascadeType, FieldId, ModelId, Phase},
        Schema,
    },
    stmt::{EntityRef, Value},
    Connection, Error, Result,
};

impl<C: Connection> Session<C> {
    /// Writes a field through its setter plan.
    ///
    /// Instances that are not managed take the value as is. On a managed
    /// instance the old value is loaded and compared first; a changing
    /// write sets the field's dirty bit and, with the first dirty bit, the
    /// version's dirty bit, and queues the instance for the next flush.
    pub(crate) fn set_field(&mut self, entity: EntityRef, field: FieldId, value: Value) -> Result<()> {
        let schema = self.schema.clone();
        let model = self.entity(entity).model;
        let setter = plan::setter(&schema, model, field)?;
        let declared = schema.field(field);

        if !self.entity(entity).is_managed() {
            let instance = self.entity_mut(entity);
            instance.set_value(field, value);
            instance.foreign.remove(&field);
            return Ok(());
        }

        if declared.is_key() {
            return Err(Error::invalid_state(format!(
                "cannot change key field `{}` of a managed `{}`",
                declared.name,
                schema.model(model).name.upper_camel_case()
            )));
        }

        let old = self.get_field(entity, field)?;
        if setter.equality.eq(&old, &value) {
            return Ok(());
        }

        if let Some((version, _)) = setter.version {
            self.ensure_loaded(entity, schema.field(version).load_group_index())?;
        }

        tracing::trace!(entity = ?entity, field = %declared.name, "set");

        let instance = self.entity_mut(entity);
        instance.set_value(field, value);

        if declared.ty.is_many_to_one() {
            instance.foreign.remove(&field);

            if let Some(group) = declared.target_load_group() {
                instance.loaded.set(group);
            }
        }

        if let Some(index) = setter.update_index {
            let first = instance.dirty.is_empty();
            instance.dirty.set(index);

            if first {
                if let Some((_, version_index)) = setter.version {
                    instance.dirty.set(version_index);
                }
                self.updates.insert(entity);
            }
        }

        Ok(())
    }

    pub(crate) fn persist_entity(&mut self, entity: EntityRef) -> Result<()> {
        let state = self.entity(entity).state;

        if state == EntityState::Detached {
            return Err(Error::invalid_state(format!(
                "cannot persist a detached `{}`; merge it instead",
                self.model_name(self.entity(entity).model)
            )));
        }

        if !self.active.insert((CascadeType::Persist, entity)) {
            return Ok(());
        }

        let result = self.persist_cascading(entity, state);
        self.active.remove(&(CascadeType::Persist, entity));
        result
    }

    fn persist_cascading(&mut self, entity: EntityRef, state: EntityState) -> Result<()> {
        let cascade = Cascade::collect(self, CascadeType::Persist, entity)?;
        cascade.apply(self, Phase::Pre, entity)?;

        let insert = state != EntityState::Managed;
        if insert {
            tracing::debug!(
                entity = ?entity,
                model = %self.model_name(self.entity(entity).model),
                "persist"
            );
            self.insert_entity(entity)?;
        }

        cascade.apply(self, Phase::Post, entity)?;

        if insert {
            self.insert_associations(entity)?;
        }

        Ok(())
    }

    pub(crate) fn merge_entity(&mut self, entity: EntityRef) -> Result<EntityRef> {
        if let Some(managed) = self.merged.get(&entity) {
            return Ok(*managed);
        }

        let managed = match self.entity(entity).state {
            EntityState::Managed => entity,
            EntityState::Transient | EntityState::Detached => self.counterpart(entity)?,
            EntityState::Removed => {
                return Err(Error::invalid_state(format!(
                    "cannot merge a removed `{}`",
                    self.model_name(self.entity(entity).model)
                )))
            }
        };

        self.merged.insert(entity, managed);
        tracing::debug!(entity = ?entity, managed = ?managed, "merge");

        let cascade = Cascade::collect(self, CascadeType::Merge, entity)?;
        cascade.apply(self, Phase::Pre, entity)?;

        if managed != entity {
            self.copy_state(entity, managed, None)?;

            if self.entity(managed).state == EntityState::Transient {
                self.persist_entity(managed)?;
            }
        }

        cascade.apply(self, Phase::Post, entity)?;

        // Targets merged after the parent are only known now.
        if managed != entity && !cascade.is_empty() {
            let fields: Vec<_> = cascade.fields(Phase::Post).collect();
            self.copy_state(entity, managed, Some(&fields))?;
        }

        Ok(managed)
    }

    /// The managed instance with the same key, or a new transient copy if
    /// no row exists.
    fn counterpart(&mut self, entity: EntityRef) -> Result<EntityRef> {
        let model = self.entity(entity).model;

        let key = match self.entity(entity).key.clone() {
            Some(key) => Some(key),
            None => Some(self.compute_key(entity)?).filter(|key| !key.has_null()),
        };

        if let Some(key) = key {
            match self.load_entity(model, key, true) {
                Ok(managed) => return Ok(managed),
                Err(err) if err.is_record_not_found() => {}
                Err(err) => return Err(err),
            }
        }

        let copy = Entity::new(&self.schema, model, EntityState::Transient);
        Ok(self.alloc(copy))
    }

    /// Copies field values from a merged instance onto its managed copy,
    /// replacing references with their managed counterparts. Fields of a
    /// detached source that were never loaded are left alone.
    fn copy_state(&mut self, source: EntityRef, target: EntityRef, only: Option<&[FieldId]>) -> Result<()> {
        let schema = self.schema.clone();
        let instance = self.entity(source);
        let detached = instance.state == EntityState::Detached;
        let target_is_new = !self.entity(target).is_managed();

        let mut writes = vec![];
        for field in schema.app.fields_of(instance.model) {
            if only.is_some_and(|only| !only.contains(&field.id)) {
                continue;
            }

            if (field.is_key() && !target_is_new)
                || field.is_aliased()
                || field.ty.is_version()
                || field.accessor.setter().is_none()
            {
                continue;
            }

            if detached {
                let loaded = instance.loaded.get(field.load_group_index())
                    && field
                        .target_load_group()
                        .map_or(true, |group| instance.loaded.get(group));

                if !loaded {
                    continue;
                }
            }

            writes.push((field.id, instance.value(field.id).clone()));
        }

        for (field, value) in writes {
            let value = self.remap(value)?;
            self.set_field(target, field, value)?;
        }

        Ok(())
    }

    fn remap(&mut self, value: Value) -> Result<Value> {
        Ok(match value {
            Value::Entity(target) => Value::Entity(self.managed_reference(target)?),
            Value::List(items) => Value::List(
                items
                    .into_iter()
                    .map(|item| self.remap(item))
                    .collect::<Result<_>>()?,
            ),
            Value::Map(entries) => Value::Map(
                entries
                    .into_iter()
                    .map(|(key, item)| Ok((key, self.remap(item)?)))
                    .collect::<Result<_>>()?,
            ),
            value => value,
        })
    }

    fn managed_reference(&mut self, target: EntityRef) -> Result<EntityRef> {
        if let Some(managed) = self.merged.get(&target) {
            return Ok(*managed);
        }

        let instance = self.entity(target);
        match (instance.state, &instance.key) {
            (EntityState::Detached, Some(key)) => {
                let (model, key) = (instance.model, key.clone());
                self.load_entity(model, key, false)
            }
            _ => Ok(target),
        }
    }

    pub(crate) fn remove_entity(&mut self, entity: EntityRef) -> Result<()> {
        match self.entity(entity).state {
            EntityState::Transient | EntityState::Removed => return Ok(()),
            EntityState::Detached => {
                return Err(Error::invalid_state(format!(
                    "cannot remove a detached `{}`",
                    self.model_name(self.entity(entity).model)
                )))
            }
            EntityState::Managed => {}
        }

        if !self.active.insert((CascadeType::Remove, entity)) {
            return Ok(());
        }

        let result = self.remove_cascading(entity);
        self.active.remove(&(CascadeType::Remove, entity));
        result
    }

    fn remove_cascading(&mut self, entity: EntityRef) -> Result<()> {
        let cascade = Cascade::collect(self, CascadeType::Remove, entity)?;
        cascade.apply(self, Phase::Pre, entity)?;

        tracing::debug!(
            entity = ?entity,
            model = %self.model_name(self.entity(entity).model),
            "remove"
        );
        self.delete_entity(entity)?;
        self.untrack(entity);
        self.entity_mut(entity).state = EntityState::Removed;

        cascade.apply(self, Phase::Post, entity)
    }

    pub(crate) fn refresh_entity(&mut self, entity: EntityRef) -> Result<()> {
        let state = self.entity(entity).state;

        if state != EntityState::Managed {
            return Err(Error::invalid_state(format!(
                "cannot refresh a {state:?} `{}`",
                self.model_name(self.entity(entity).model)
            )));
        }

        if !self.active.insert((CascadeType::Refresh, entity)) {
            return Ok(());
        }

        let result = self.refresh_cascading(entity);
        self.active.remove(&(CascadeType::Refresh, entity));
        result
    }

    fn refresh_cascading(&mut self, entity: EntityRef) -> Result<()> {
        let cascade = Cascade::collect(self, CascadeType::Refresh, entity)?;
        cascade.apply(self, Phase::Pre, entity)?;

        tracing::debug!(entity = ?entity, "refresh");

        let schema = self.schema.clone();
        self.entity_mut(entity).reset(&schema);
        self.updates.shift_remove(&entity);
        self.load_default_groups(entity)?;

        cascade.apply(self, Phase::Post, entity)
    }

    fn model_name(&self, model: ModelId) -> String {
        self.schema.model(model).name.upper_camel_case()
    }
}

impl<C: Connection> Lifecycle for Session<C> {
    fn schema(&self) -> &Schema {
        &self.schema
    }

    fn model_of(&self, entity: EntityRef) -> ModelId {
        self.entity(entity).model
    }

    fn is_managed(&self, entity: EntityRef) -> bool {
        self.entity(entity).is_managed()
    }

    fn targets(&mut self, entity: EntityRef, field: FieldId) -> Result<Vec<EntityRef>> {
        Ok(match self.get_field(entity, field)? {
            Value::Entity(target) => vec![target],
            Value::List(items) => items.iter().filter_map(Value::as_entity).collect(),
            Value::Map(entries) => entries.iter().filter_map(|(_, item)| item.as_entity()).collect(),
            _ => vec![],
        })
    }

    fn assign(&mut self, entity: EntityRef, field: FieldId, value: Value) -> Result<()> {
        self.set_field(entity, field, value)
    }

    fn persist(&mut self, entity: EntityRef) -> Result<()> {
        self.persist_entity(entity)
    }

    fn merge(&mut self, entity: EntityRef) -> Result<EntityRef> {
        self.merge_entity(entity)
    }

    fn remove(&mut self, entity: EntityRef) -> Result<()> {
        self.remove_entity(entity)
    }

    fn refresh(&mut self, entity: EntityRef) -> Result<()> {
        self.refresh_entity(entity)
    }

    fn flush_entity(&mut self, entity: EntityRef) -> Result<()> {
        self.update_entity(entity)
    }
}
