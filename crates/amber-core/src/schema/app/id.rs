mod generator;
pub use generator::Generator;

mod key_factory;
pub use key_factory::{KeyFactories, KeyFactory, KeyParam};

use super::{Field, FieldId, FieldTy, ModelId};
use crate::{
    schema::{db::ColumnId, db::LinkId, Schema},
    stmt::{ColumnList, ColumnRef, Predicate, Value},
    Error, Result,
};

/// Primary key of an entity.
#[derive(Debug, Clone, PartialEq)]
pub enum Id {
    /// A single key field.
    Simple(FieldId),

    /// Two or more key fields. Key values are records built by the factory.
    Composite { keys: Vec<FieldId>, factory: String },

    /// A single embedded id. Key values are records of the embeddable's
    /// fields.
    Embedded { field: FieldId, factory: String },

    /// Joined-inheritance subtype. Every key operation delegates to the
    /// parent's key; column references go through `link`.
    Sub { parent: ModelId, link: LinkId },
}

impl Id {
    /// The key this one delegates to; `self` unless this is a subtype key.
    pub fn root<'a>(&'a self, schema: &'a Schema) -> &'a Id {
        let mut id = self;
        while let Id::Sub { parent, .. } = id {
            id = &schema.app.model(*parent).expect_entity().id;
        }
        id
    }

    pub fn is_sub(&self) -> bool {
        matches!(self, Id::Sub { .. })
    }

    /// Key fields in declaration order.
    pub fn key_fields<'a>(&self, schema: &'a Schema) -> Vec<&'a Field> {
        match self.root(schema) {
            Id::Simple(field) => vec![schema.app.field(*field)],
            Id::Composite { keys, .. } => keys.iter().map(|key| schema.app.field(*key)).collect(),
            Id::Embedded { field, .. } => vec![schema.app.field(*field)],
            Id::Sub { .. } => unreachable!("root id is never a subtype id"),
        }
    }

    /// Number of key components, which is the make-key factory's arity.
    pub fn arity(&self, schema: &Schema) -> usize {
        match self.root(schema) {
            Id::Simple(_) => 1,
            Id::Composite { keys, .. } => keys.len(),
            Id::Embedded { field, .. } => schema.app.field(*field).ty.expect_embedded().fields.len(),
            Id::Sub { .. } => unreachable!("root id is never a subtype id"),
        }
    }

    /// The make-key factory of composite and embedded keys.
    pub fn factory<'a>(&self, schema: &'a Schema) -> Option<&'a KeyFactory> {
        match self.root(schema) {
            Id::Composite { factory, .. } | Id::Embedded { factory, .. } => {
                schema.app.key_factories.get(factory)
            }
            _ => None,
        }
    }

    /// Key columns on the owning model's own table, in key order.
    pub fn columns(&self, schema: &Schema) -> Vec<ColumnId> {
        match self {
            Id::Sub { parent, link } => {
                let link = schema.db.link(*link);
                schema
                    .app
                    .model(*parent)
                    .expect_entity()
                    .id
                    .columns(schema)
                    .into_iter()
                    .filter_map(|target| link.source_column(target))
                    .collect()
            }
            _ => self
                .key_fields(schema)
                .into_iter()
                .flat_map(|field| field.columns(&schema.db))
                .map(|fc| fc.column)
                .collect(),
        }
    }

    /// `o.k1, o.k2`
    pub fn select(&self, schema: &Schema, alias: Option<&str>) -> ColumnList {
        self.columns(schema)
            .into_iter()
            .map(|column| ColumnRef::new(alias, &schema.db.column(column).name))
            .collect()
    }

    /// `o.k1=? and o.k2=?`
    ///
    /// For a subtype key the columns are the subtype table's link columns,
    /// not the root's key columns.
    pub fn where_clause(&self, schema: &Schema, alias: Option<&str>) -> Predicate {
        self.columns(schema)
            .into_iter()
            .map(|column| ColumnRef::new(alias, &schema.db.column(column).name).eq_param())
            .collect()
    }

    /// Predicate over key property names rather than columns, as used by
    /// queries written against the object model.
    pub fn raw_where(&self, schema: &Schema, alias: Option<&str>) -> Predicate {
        self.key_fields(schema)
            .into_iter()
            .flat_map(|field| match &field.ty {
                FieldTy::EmbeddedId(embedded) => embedded
                    .fields
                    .iter()
                    .map(|sub| format!("{}.{}", field.name, sub.name))
                    .collect(),
                _ => vec![field.name.clone()],
            })
            .map(|name| ColumnRef::new(alias, name).eq_param())
            .collect()
    }

    /// Builds the key value from per-field component values.
    pub fn get(&self, schema: &Schema, mut component: impl FnMut(&Field) -> Value) -> Result<Value> {
        match self.root(schema) {
            Id::Simple(field) => Ok(component(schema.app.field(*field))),
            Id::Composite { keys, .. } => {
                let args = keys
                    .iter()
                    .map(|key| component(schema.app.field(*key)))
                    .collect();
                self.expect_factory(schema)?.make(args)
            }
            Id::Embedded { field, .. } => {
                let factory = self.expect_factory(schema)?;
                let value = component(schema.app.field(*field));
                factory.make(value.components(factory.arity())?)
            }
            Id::Sub { .. } => unreachable!("root id is never a subtype id"),
        }
    }

    /// Splits a key value into values for the key fields.
    pub fn set(&self, schema: &Schema, key: &Value) -> Result<Vec<(FieldId, Value)>> {
        match self.root(schema) {
            Id::Simple(field) => Ok(vec![(*field, key.clone())]),
            Id::Composite { keys, .. } => {
                let parts = self.expect_factory(schema)?.decompose(key)?;
                Ok(keys.iter().copied().zip(parts).collect())
            }
            Id::Embedded { field, .. } => {
                let parts = self.expect_factory(schema)?.decompose(key)?;
                Ok(vec![(*field, Value::Record(parts))])
            }
            Id::Sub { .. } => unreachable!("root id is never a subtype id"),
        }
    }

    /// Flattens a key value to one value per key column, in column order.
    pub fn column_values(&self, schema: &Schema, key: &Value) -> Result<Vec<Value>> {
        let mut values = vec![];

        for (field, value) in self.set(schema, key)? {
            let field = schema.app.field(field);
            let arity = field.columns(&schema.db).len();
            values.extend(value.components(arity)?);
        }

        Ok(values)
    }

    /// The key field declaring a generator, with its generator.
    pub fn generator<'a>(&self, schema: &'a Schema) -> Option<(&'a Field, &'a Generator)> {
        self.key_fields(schema)
            .into_iter()
            .find_map(|field| field.generator().ok().map(|generator| (field, generator)))
    }

    /// The key field whose value is generated.
    pub fn generated_field<'a>(&self, schema: &'a Schema) -> Result<&'a Field> {
        match self.generator(schema) {
            Some((field, _)) => Ok(field),
            None => {
                let names: Vec<_> = self
                    .key_fields(schema)
                    .into_iter()
                    .map(|field| field.name.as_str())
                    .collect();
                Err(Error::invalid_state(format!(
                    "key [{}] has no generated field",
                    names.join(", ")
                )))
            }
        }
    }

    /// True if the key is assigned by the database during INSERT.
    pub fn is_identity_generator(&self, schema: &Schema) -> bool {
        self.generator(schema)
            .is_some_and(|(_, generator)| generator.is_identity())
    }

    fn expect_factory<'a>(&self, schema: &'a Schema) -> Result<&'a KeyFactory> {
        self.factory(schema)
            .ok_or_else(|| Error::invalid_state("composite key has no make-key factory"))
    }
}
