use crate::{session::initial_value, Session};
use amber_core::{
    plan::{self, CollectionRows, LoadGroupPlan},
    schema::app::{FieldId, FieldTy, OrderByColumn, Part},
    stmt::{EntityRef, Value},
    Connection, Error, Result,
};
use indexmap::IndexMap;
use std::cmp::Ordering;

impl<C: Connection> Session<C> {
    /// Reads a field, fetching its load group first if the load bit is
    /// unset. Association fields also resolve their target.
    pub(crate) fn get_field(&mut self, entity: EntityRef, field: FieldId) -> Result<Value> {
        let getter = plan::getter(&self.schema, field);

        if self.entity(entity).loaded.word(getter.word) & getter.bit == 0 {
            self.ensure_loaded(entity, getter.load_group)?;
        }

        if let Some(group) = getter.target_load_group {
            self.ensure_loaded(entity, group)?;
        }

        Ok(self.entity(entity).value(field).clone())
    }

    /// Fetches load group `group` of a managed instance unless its bit is
    /// already set. The bit is only set once the fetch succeeded.
    pub(crate) fn ensure_loaded(&mut self, entity: EntityRef, group: usize) -> Result<()> {
        let instance = self.entity(entity);

        if !instance.is_managed() || instance.loaded.get(group) {
            return Ok(());
        }

        let schema = self.schema.clone();
        let model = instance.model;

        tracing::trace!(entity = ?entity, group, "loading group");

        if let Some(plan) = plan::load_group(&schema, model, group) {
            self.load_columns(entity, &plan)?;
            self.entity_mut(entity).loaded.set(group);

            // Eager many-to-one targets are resolved with the group that
            // holds their foreign key.
            for field in schema.app.fields_of(model) {
                if field.load_group == Some(group) && !field.lazy {
                    if let Some(target_group) = field.target_load_group() {
                        self.ensure_loaded(entity, target_group)?;
                    }
                }
            }

            // Eager collections and dependents follow their declaring
            // table's default group.
            for declaring in schema.app.ancestry(model) {
                if declaring.expect_entity().default_load_group != group {
                    continue;
                }

                for field in &declaring.fields {
                    if !field.lazy && field.is_collection_like() {
                        self.ensure_loaded(entity, field.load_group_index())?;
                    }
                }
            }

            return Ok(());
        }

        let collection = schema
            .app
            .fields_of(model)
            .find(|field| field.load_group == Some(group) && field.is_collection_like());

        if let Some(field) = collection {
            self.load_collection(entity, field.id)?;
        } else if let Some(field) = schema
            .app
            .fields_of(model)
            .find(|field| field.target_load_group() == Some(group))
        {
            self.resolve_target(entity, field.id)?;
        }

        self.entity_mut(entity).loaded.set(group);
        Ok(())
    }

    /// Reads the default load group of every table in the instance's
    /// hierarchy.
    pub(crate) fn load_default_groups(&mut self, entity: EntityRef) -> Result<()> {
        let schema = self.schema.clone();

        for declaring in schema.app.ancestry(self.entity(entity).model) {
            self.ensure_loaded(entity, declaring.expect_entity().default_load_group)?;
        }

        Ok(())
    }

    fn load_columns(&mut self, entity: EntityRef, plan: &LoadGroupPlan) -> Result<()> {
        let params = self.key_columns(entity)?;
        let rows = self.query(&plan.select, &params)?;

        let Some(row) = rows.into_iter().next() else {
            let instance = self.entity(entity);
            return Err(Error::record_not_found(format!(
                "`{}` with key {:?}",
                self.schema.model(instance.model).name.upper_camel_case(),
                instance.key.as_ref().unwrap_or(&Value::Null)
            )));
        };

        let mut columns: IndexMap<FieldId, Vec<(Part, Value)>> = IndexMap::new();
        for (target, value) in plan.targets.iter().zip(row) {
            if let Some(target) = target {
                columns.entry(target.field).or_default().push((target.part, value));
            }
        }

        let schema = self.schema.clone();
        let instance = self.entity_mut(entity);

        for (field, parts) in columns {
            let field = schema.field(field);
            let mut values: Vec<_> = parts.into_iter().map(|(_, value)| value).collect();

            match &field.ty {
                FieldTy::Embedded(_) | FieldTy::EmbeddedId(_) => {
                    let value = if values.iter().all(Value::is_null) {
                        Value::Null
                    } else {
                        Value::Record(values)
                    };
                    instance.set_value(field.id, value);
                }
                FieldTy::ManyToOne(rel) => {
                    instance
                        .foreign
                        .insert(field.id, Value::from_components(values));
                    instance.set_value(field.id, Value::Null);

                    if let Some(group) = rel.target_load_group {
                        instance.loaded.unset(group);
                    }
                }
                _ => {
                    let value = values.pop().unwrap_or_default();

                    if value.is_null() && field.primitive {
                        instance.set_value(field.id, initial_value(field));
                    } else {
                        instance.set_value(field.id, value);
                    }
                }
            }
        }

        Ok(())
    }

    fn load_collection(&mut self, entity: EntityRef, field: FieldId) -> Result<()> {
        let plan = plan::collection(&self.schema, field)?;
        let params = self.key_columns(entity)?;
        let rows = self.query(&plan.select, &params)?;

        let mut items = Vec::with_capacity(rows.len());
        match plan.rows {
            CollectionRows::Keys { target } => {
                for row in rows {
                    let key = self.key_from_columns(target, row)?;
                    items.push(Value::Entity(self.load_entity(target, key, false)?));
                }
            }
            CollectionRows::Entries { target } => {
                let mut entries = Vec::with_capacity(rows.len());

                for mut row in rows {
                    let map_key = row.pop().unwrap_or_default();
                    let key = self.key_from_columns(target, row)?;
                    entries.push((map_key, Value::Entity(self.load_entity(target, key, false)?)));
                }

                self.entity_mut(entity).set_value(field, Value::Map(entries));
                return Ok(());
            }
            CollectionRows::Elements => {
                items.extend(rows.into_iter().map(|row| row.into_iter().next().unwrap_or_default()));
            }
        }

        if !plan.sort.is_empty() {
            items = self.sort_targets(items, &plan.sort)?;
        }

        let value = match self.schema.field(field).ty {
            FieldTy::DependentOneToOne(_) => items.into_iter().next().unwrap_or_default(),
            _ => Value::List(items),
        };

        self.entity_mut(entity).set_value(field, value);
        Ok(())
    }

    /// Resolves the target of a many-to-one from the foreign key read with
    /// the owner's row. The target is hollow until one of its fields is read.
    fn resolve_target(&mut self, entity: EntityRef, field: FieldId) -> Result<()> {
        let schema = self.schema.clone();
        let owner = schema.field(field);
        let rel = owner.ty.expect_many_to_one();

        self.ensure_loaded(entity, owner.load_group_index())?;

        let instance = self.entity(entity);
        if instance.value(field).is_null() {
            if let Some(foreign) = instance.foreign.get(&field).cloned() {
                if !foreign.has_null() {
                    let arity = owner.columns(&schema.db).len();
                    let key = self.key_from_columns(rel.target, foreign.components(arity)?)?;
                    let target = self.load_entity(rel.target, key, false)?;
                    self.entity_mut(entity).set_value(field, Value::Entity(target));
                }
            }
        }

        if let Some(group) = rel.target_load_group {
            self.entity_mut(entity).loaded.set(group);
        }

        Ok(())
    }

    /// Orders loaded targets by their order-by fields.
    fn sort_targets(&mut self, items: Vec<Value>, order_by: &[OrderByColumn]) -> Result<Vec<Value>> {
        let mut keyed = Vec::with_capacity(items.len());

        for item in items {
            let mut sort_key = Vec::with_capacity(order_by.len());

            if let Some(target) = item.as_entity() {
                for order in order_by {
                    sort_key.push(self.get_field(target, order.field)?);
                }
            }

            keyed.push((sort_key, item));
        }

        keyed.sort_by(|(a, _), (b, _)| {
            order_by
                .iter()
                .zip(a.iter().zip(b))
                .map(|(order, (a, b))| {
                    let ordering = compare(a, b);
                    if order.descending {
                        ordering.reverse()
                    } else {
                        ordering
                    }
                })
                .find(|ordering| ordering.is_ne())
                .unwrap_or(Ordering::Equal)
        });

        Ok(keyed.into_iter().map(|(_, item)| item).collect())
    }
}

/// Orders nulls first, then by value. Values of unrelated types are equal.
fn compare(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Null, Value::Null) => Ordering::Equal,
        (Value::Null, _) => Ordering::Less,
        (_, Value::Null) => Ordering::Greater,
        (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
        (Value::F64(a), Value::F64(b)) => a.total_cmp(b),
        (Value::String(a), Value::String(b)) => a.cmp(b),
        (Value::Bytes(a), Value::Bytes(b)) => a.cmp(b),
        _ => match (a.to_i64(), b.to_i64()) {
            (Some(a), Some(b)) => a.cmp(&b),
            _ => Ordering::Equal,
        },
    }
}
