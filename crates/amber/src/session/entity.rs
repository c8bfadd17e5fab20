use amber_core::{
    schema::{
        app::{Field, FieldId, ModelId},
        Schema,
    },
    stmt::{Type, Value},
    Mask,
};
use indexmap::IndexMap;
use std::collections::HashMap;

/// Lifecycle state of an entity instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityState {
    /// Created by the application and not yet persisted.
    Transient,

    /// Backed by a row and tracked by the session.
    Managed,

    /// Its rows have been deleted.
    Removed,

    /// No longer tracked by the session.
    Detached,
}

/// One entity instance owned by a session.
#[derive(Debug, Clone)]
pub(crate) struct Entity {
    pub(crate) model: ModelId,
    pub(crate) state: EntityState,

    /// Current value of every field, inherited ones included.
    pub(crate) values: IndexMap<FieldId, Value>,

    /// Foreign keys read for many-to-one fields. Cleared when the field is
    /// assigned.
    pub(crate) foreign: HashMap<FieldId, Value>,

    pub(crate) loaded: Mask,
    pub(crate) dirty: Mask,

    /// Identity map key, set once the instance is managed.
    pub(crate) key: Option<Value>,
}

static NULL: Value = Value::Null;

impl Entity {
    pub(crate) fn new(schema: &Schema, model: ModelId, state: EntityState) -> Entity {
        let entity = schema.entity(model);

        Entity {
            model,
            state,
            values: schema
                .app
                .fields_of(model)
                .map(|field| (field.id, initial_value(field)))
                .collect(),
            foreign: HashMap::new(),
            loaded: Mask::new(entity.load_group_count),
            dirty: Mask::new(entity.dirty_count),
            key: None,
        }
    }

    pub(crate) fn value(&self, field: FieldId) -> &Value {
        self.values.get(&field).unwrap_or(&NULL)
    }

    pub(crate) fn set_value(&mut self, field: FieldId, value: Value) {
        self.values.insert(field, value);
    }

    pub(crate) fn is_managed(&self) -> bool {
        self.state == EntityState::Managed
    }

    /// Drops loaded state so every group is read again on access.
    pub(crate) fn reset(&mut self, schema: &Schema) {
        for field in schema.app.fields_of(self.model) {
            if !field.is_key() {
                self.values.insert(field.id, initial_value(field));
            }
        }

        self.foreign.clear();
        self.loaded.clear();
        self.dirty.clear();
    }
}

/// Value of a field on a new instance.
pub(crate) fn initial_value(field: &Field) -> Value {
    if field.is_map() {
        return Value::Map(vec![]);
    }

    if field.is_collection_like() {
        return Value::List(vec![]);
    }

    if !field.primitive {
        return Value::Null;
    }

    match field.declared {
        Type::Bool => Value::Bool(false),
        Type::I16 => Value::I16(0),
        Type::I32 => Value::I32(0),
        Type::I64 => Value::I64(0),
        Type::F64 => Value::F64(0.0),
        _ => Value::Null,
    }
}
