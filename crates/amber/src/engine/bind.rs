use crate::Session;
use amber_core::{
    plan::{Bind, ColumnTarget},
    schema::app::{FieldId, FieldTy, ModelId, Part},
    stmt::{EntityRef, Value},
    Connection, Error, Result,
};
use std::collections::HashMap;

impl<C: Connection> Session<C> {
    /// Statement parameters for `binds`, read from the instance.
    pub(crate) fn bind_params(&self, entity: EntityRef, binds: &[Bind]) -> Result<Vec<Value>> {
        let mut key_columns = None;
        let mut params = Vec::with_capacity(binds.len());

        for bind in binds {
            let param = match *bind {
                Bind::Field(target) => self.column_value(entity, target)?,
                Bind::Key(index) => {
                    if key_columns.is_none() {
                        key_columns = Some(self.key_columns(entity)?);
                    }

                    key_columns
                        .as_ref()
                        .and_then(|columns| columns.get(index))
                        .cloned()
                        .unwrap_or_default()
                }
                Bind::Version => self.version(entity)?.1,
                Bind::NextVersion => self.version(entity)?.2,
            };

            params.push(param);
        }

        Ok(params)
    }

    /// Value of one column owned by a field.
    fn column_value(&self, entity: EntityRef, target: ColumnTarget) -> Result<Value> {
        let value = self.entity(entity).value(target.field);

        Ok(match target.part {
            Part::Whole => value.clone(),
            Part::Sub(index) => value
                .as_record()
                .and_then(|fields| fields.get(index))
                .cloned()
                .unwrap_or_default(),
            Part::Foreign(index) => {
                let arity = self.schema.field(target.field).columns(&self.schema.db).len();
                let mut components = self.foreign_key(entity, target.field)?.components(arity)?;

                if index < components.len() {
                    components.swap_remove(index)
                } else {
                    Value::Null
                }
            }
        })
    }

    /// Foreign key written for a many-to-one field: the referenced
    /// instance's key columns, or the key read with the row if the target
    /// has not been resolved. References to instances that are not managed
    /// bind NULL.
    pub(crate) fn foreign_key(&self, entity: EntityRef, field: FieldId) -> Result<Value> {
        let instance = self.entity(entity);

        match instance.value(field) {
            Value::Entity(target) => {
                let target = self.entity(*target);

                match &target.key {
                    Some(key) if target.is_managed() => {
                        let id = &self.schema.entity(target.model).id;
                        Ok(Value::from_components(id.column_values(&self.schema, key)?))
                    }
                    _ => Ok(Value::Null),
                }
            }
            Value::Null => Ok(instance.foreign.get(&field).cloned().unwrap_or_default()),
            other => Err(Error::invalid_state(format!(
                "many-to-one `{}` holds {other:?}",
                self.schema.field(field).name
            ))),
        }
    }

    /// Builds the instance's key from its key fields.
    pub(crate) fn compute_key(&self, entity: EntityRef) -> Result<Value> {
        let instance = self.entity(entity);
        let id = &self.schema.entity(instance.model).id;

        let mut components = HashMap::new();
        for field in id.key_fields(&self.schema) {
            let component = match &field.ty {
                FieldTy::ManyToOne(_) => self.foreign_key(entity, field.id)?,
                _ => instance.value(field.id).clone(),
            };
            components.insert(field.id, component);
        }

        id.get(&self.schema, |field| {
            components.remove(&field.id).unwrap_or_default()
        })
    }

    /// Key of the instance flattened to one value per key column.
    pub(crate) fn key_columns(&self, entity: EntityRef) -> Result<Vec<Value>> {
        let instance = self.entity(entity);
        let id = &self.schema.entity(instance.model).id;

        match &instance.key {
            Some(key) => id.column_values(&self.schema, key),
            None => id.column_values(&self.schema, &self.compute_key(entity)?),
        }
    }

    /// Builds a key of `model` from its key column values, as read from a
    /// row or a foreign key.
    pub(crate) fn key_from_columns(&self, model: ModelId, columns: Vec<Value>) -> Result<Value> {
        let id = &self.schema.entity(model).id;
        let mut columns = columns.into_iter();
        let mut components = HashMap::new();

        for field in id.key_fields(&self.schema) {
            let arity = field.columns(&self.schema.db).len();
            let parts: Vec<_> = columns.by_ref().take(arity).collect();

            let component = match &field.ty {
                FieldTy::EmbeddedId(_) => Value::Record(parts),
                _ => Value::from_components(parts),
            };
            components.insert(field.id, component);
        }

        id.get(&self.schema, |field| {
            components.remove(&field.id).unwrap_or_default()
        })
    }

    /// The instance's version field with its current and next value.
    pub(crate) fn version(&self, entity: EntityRef) -> Result<(FieldId, Value, Value)> {
        let instance = self.entity(entity);

        let Some(field) = self.schema.entity(instance.model).version else {
            return Err(Error::invalid_state(format!(
                "`{}` has no version field",
                self.schema.model(instance.model).name.upper_camel_case()
            )));
        };

        let current = instance.value(field).clone();
        let ty = &self.schema.field(field).declared;
        let next = Value::from_i64(ty, current.to_i64().unwrap_or(0) + 1)?;

        Ok((field, current, next))
    }
}
