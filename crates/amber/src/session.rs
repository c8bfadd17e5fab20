mod entity;
pub(crate) use entity::{initial_value, Entity};
pub use entity::EntityState;

use amber_core::{
    schema::app::{CascadeType, FieldId, ModelId},
    stmt::{EntityRef, Value},
    Connection, Error, Mask, Result, Schema,
};
use indexmap::{IndexMap, IndexSet};
use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
};

/// Unit of work over one storage connection.
///
/// The session owns every entity instance it hands out; callers refer to
/// them through [`EntityRef`] handles. Managed instances are tracked in an
/// identity map keyed by root model and primary key, so a key resolves to
/// at most one instance per session.
///
/// Lifecycle operations write immediately: `persist` issues the INSERTs,
/// `remove` the DELETEs. Field writes on managed instances are collected in
/// the update queue and written by [`Session::flush`].
pub struct Session<C> {
    pub(crate) schema: Arc<Schema>,
    pub(crate) conn: C,

    /// Entity arena, indexed by `EntityRef`
    pub(crate) entities: Vec<Entity>,

    /// Managed instances by root model and key
    pub(crate) identity: IndexMap<(ModelId, Value), EntityRef>,

    /// Managed instances with dirty fields, in the order they became dirty
    pub(crate) updates: IndexSet<EntityRef>,

    /// Lifecycle operations in progress. Stops cascades from revisiting an
    /// instance through a cycle.
    pub(crate) active: HashSet<(CascadeType, EntityRef)>,

    /// Managed copies produced by the merge in progress
    pub(crate) merged: HashMap<EntityRef, EntityRef>,
}

impl<C: Connection> Session<C> {
    pub fn new(schema: Arc<Schema>, conn: C) -> Session<C> {
        Session {
            schema,
            conn,
            entities: vec![],
            identity: IndexMap::new(),
            updates: IndexSet::new(),
            active: HashSet::new(),
            merged: HashMap::new(),
        }
    }

    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    pub fn connection(&self) -> &C {
        &self.conn
    }

    pub fn connection_mut(&mut self) -> &mut C {
        &mut self.conn
    }

    pub fn into_connection(self) -> C {
        self.conn
    }

    /// Looks up an entity model by name.
    pub fn model(&self, name: &str) -> Result<ModelId> {
        match self.schema.app.model_by_name(name) {
            Some(model) if model.is_entity() => Ok(model.id),
            Some(_) => Err(Error::invalid_state(format!("`{name}` is not an entity"))),
            None => Err(Error::invalid_state(format!("unknown entity `{name}`"))),
        }
    }

    /// Creates a transient instance of `model`.
    pub fn create(&mut self, model: ModelId) -> EntityRef {
        self.alloc(Entity::new(&self.schema, model, EntityState::Transient))
    }

    pub fn model_of(&self, entity: EntityRef) -> ModelId {
        self.entity(entity).model
    }

    pub fn state(&self, entity: EntityRef) -> EntityState {
        self.entity(entity).state
    }

    /// Primary key of a managed instance.
    pub fn key(&self, entity: EntityRef) -> Option<&Value> {
        self.entity(entity).key.as_ref()
    }

    pub fn load_mask(&self, entity: EntityRef) -> &Mask {
        &self.entity(entity).loaded
    }

    pub fn dirty_mask(&self, entity: EntityRef) -> &Mask {
        &self.entity(entity).dirty
    }

    /// True if the field's load group has been read.
    pub fn is_loaded(&self, entity: EntityRef, field: &str) -> Result<bool> {
        let field = self.schema.field(self.field_id(entity, field)?);
        Ok(self.entity(entity).loaded.get(field.load_group_index()))
    }

    /// True if the field has been written since the last flush.
    pub fn is_dirty(&self, entity: EntityRef, field: &str) -> Result<bool> {
        let field = self.schema.field(self.field_id(entity, field)?);
        Ok(field
            .update_index
            .is_some_and(|index| self.entity(entity).dirty.get(index)))
    }

    /// Instances waiting to be written by the next flush.
    pub fn pending_updates(&self) -> impl ExactSizeIterator<Item = EntityRef> + '_ {
        self.updates.iter().copied()
    }

    /// Finds the instance of `model` with primary key `key`, reading its
    /// default load groups. Returns `None` if no row exists.
    pub fn find(&mut self, model: ModelId, key: impl Into<Value>) -> Result<Option<EntityRef>> {
        match self.load_entity(model, key.into(), true) {
            Ok(entity) => Ok(Some(entity)),
            Err(err) if err.is_record_not_found() => Ok(None),
            Err(err) => Err(err),
        }
    }

    /// Returns the managed instance of `model` with primary key `key`.
    ///
    /// Without `force_eager` a new instance is hollow: only its key is known
    /// and every other field is read on first access. With `force_eager`
    /// the default load groups are read now, failing with a record not found
    /// error if the row does not exist.
    pub fn load_entity(&mut self, model: ModelId, key: Value, force_eager: bool) -> Result<EntityRef> {
        if !self.schema.model(model).is_entity() {
            return Err(Error::invalid_state(format!(
                "`{}` is not an entity",
                self.schema.model(model).name.upper_camel_case()
            )));
        }

        if key.has_null() {
            return Err(Error::invalid_state(format!(
                "cannot load `{}` with a null key",
                self.schema.model(model).name.upper_camel_case()
            )));
        }

        let root = self.schema.app.root(model);
        let (entity, created) = match self.identity.get(&(root, key.clone())) {
            Some(entity) => (*entity, false),
            None => (self.hollow(model, key)?, true),
        };

        if force_eager {
            if let Err(err) = self.load_default_groups(entity) {
                if created && err.is_record_not_found() {
                    self.detach(entity);
                }
                return Err(err);
            }
        }

        Ok(entity)
    }

    /// Reads a field by name, loading its group first if needed.
    pub fn get(&mut self, entity: EntityRef, field: &str) -> Result<Value> {
        let field = self.field_id(entity, field)?;
        self.get_field(entity, field)
    }

    /// Writes a field by name.
    pub fn set(&mut self, entity: EntityRef, field: &str, value: impl Into<Value>) -> Result<()> {
        let field = self.field_id(entity, field)?;
        self.set_field(entity, field, value.into())
    }

    /// Makes a transient instance persistent, inserting its rows and
    /// cascading to associations configured with persist.
    pub fn persist(&mut self, entity: EntityRef) -> Result<()> {
        self.persist_entity(entity)
    }

    /// Copies the state of a detached or transient instance onto its managed
    /// counterpart, returning the managed instance.
    pub fn merge(&mut self, entity: EntityRef) -> Result<EntityRef> {
        let outermost = self.merged.is_empty();
        let result = self.merge_entity(entity);

        if outermost {
            self.merged.clear();
        }

        result
    }

    /// Deletes the rows of a managed instance.
    pub fn remove(&mut self, entity: EntityRef) -> Result<()> {
        self.remove_entity(entity)
    }

    /// Discards unflushed changes and re-reads the default load groups.
    pub fn refresh(&mut self, entity: EntityRef) -> Result<()> {
        self.refresh_entity(entity)
    }

    /// Queues a managed instance for the next flush.
    pub fn update(&mut self, entity: EntityRef) -> Result<()> {
        if !self.entity(entity).is_managed() {
            return Err(Error::invalid_state(format!(
                "cannot queue a {:?} instance for update",
                self.entity(entity).state
            )));
        }

        self.updates.insert(entity);
        Ok(())
    }

    /// Writes every queued update, in queue order.
    ///
    /// An instance stays queued and dirty if its update fails; the error is
    /// returned and later instances are not written.
    pub fn flush(&mut self) -> Result<()> {
        tracing::debug!(pending = self.updates.len(), "flush");

        while let Some(entity) = self.updates.first().copied() {
            // Clean instances are dequeued without writing.
            self.update_entity(entity)?;
            self.updates.shift_remove(&entity);
        }

        Ok(())
    }

    /// Stops tracking an instance. Later accesses read and write its
    /// in-memory state only.
    pub fn detach(&mut self, entity: EntityRef) {
        self.untrack(entity);

        let instance = self.entity_mut(entity);
        if instance.state == EntityState::Managed {
            instance.state = EntityState::Detached;
        }
    }

    /// Detaches every managed instance.
    pub fn clear(&mut self) {
        let managed: Vec<_> = self.identity.values().copied().collect();

        for entity in managed {
            self.detach(entity);
        }

        self.updates.clear();
    }

    #[track_caller]
    pub(crate) fn entity(&self, entity: EntityRef) -> &Entity {
        match self.entities.get(entity.0) {
            Some(instance) => instance,
            None => panic!("{entity:?} does not belong to this session"),
        }
    }

    #[track_caller]
    pub(crate) fn entity_mut(&mut self, entity: EntityRef) -> &mut Entity {
        match self.entities.get_mut(entity.0) {
            Some(instance) => instance,
            None => panic!("{entity:?} does not belong to this session"),
        }
    }

    pub(crate) fn alloc(&mut self, entity: Entity) -> EntityRef {
        self.entities.push(entity);
        EntityRef(self.entities.len() - 1)
    }

    /// Registers a managed instance under its key.
    pub(crate) fn register(&mut self, entity: EntityRef, key: Value) -> Result<()> {
        let model = self.entity(entity).model;
        let root = self.schema.app.root(model);

        if let Some(existing) = self.identity.get(&(root, key.clone())) {
            if *existing != entity {
                return Err(Error::invalid_state(format!(
                    "`{}` with key {key:?} is already managed",
                    self.schema.model(model).name.upper_camel_case()
                )));
            }
        }

        self.identity.insert((root, key.clone()), entity);
        self.entity_mut(entity).key = Some(key);
        Ok(())
    }

    /// Drops an instance from the identity map and the update queue.
    pub(crate) fn untrack(&mut self, entity: EntityRef) {
        let instance = self.entity(entity);

        if let Some(key) = instance.key.clone() {
            let root = self.schema.app.root(instance.model);
            if self.identity.get(&(root, key.clone())) == Some(&entity) {
                self.identity.shift_remove(&(root, key));
            }
        }

        self.updates.shift_remove(&entity);
    }

    /// Managed instance with only its key fields set.
    fn hollow(&mut self, model: ModelId, key: Value) -> Result<EntityRef> {
        let schema = self.schema.clone();
        let mut instance = Entity::new(&schema, model, EntityState::Managed);

        for (field, value) in schema.entity(model).id.set(&schema, &key)? {
            if schema.field(field).ty.is_many_to_one() {
                instance.foreign.insert(field, value);
            } else {
                instance.set_value(field, value);
            }
        }

        let entity = self.alloc(instance);
        self.register(entity, key)?;

        tracing::trace!(
            model = %schema.model(model).name.upper_camel_case(),
            entity = ?entity,
            "hollow instance"
        );
        Ok(entity)
    }

    pub(crate) fn field_id(&self, entity: EntityRef, name: &str) -> Result<FieldId> {
        let model = self.entity(entity).model;

        self.schema
            .app
            .field_by_name(model, name)
            .map(|field| field.id)
            .ok_or_else(|| {
                Error::invalid_state(format!(
                    "`{}` has no field `{name}`",
                    self.schema.model(model).name.upper_camel_case()
                ))
            })
    }
}
