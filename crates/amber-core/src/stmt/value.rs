use super::Type;
use crate::{Error, Result};
use std::{
    fmt,
    hash::{Hash, Hasher},
    sync::Arc,
};

/// A runtime value held by an entity instance or bound to a statement.
#[derive(Clone, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    I16(i16),
    I32(i32),
    I64(i64),
    F64(f64),
    String(String),
    Bytes(Arc<[u8]>),

    /// Microseconds since the Unix epoch.
    Timestamp(i64),

    /// Ordered field values of a composite key or embeddable.
    Record(Vec<Value>),

    /// Handle to an entity owned by a session.
    Entity(EntityRef),

    List(Vec<Value>),

    /// Entries of a keyed collection, in load order.
    Map(Vec<(Value, Value)>),
}

/// Handle to an entity instance within a session.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityRef(pub usize);

impl Value {
    pub fn null() -> Value {
        Value::Null
    }

    pub fn record(fields: impl IntoIterator<Item = Value>) -> Value {
        Value::Record(fields.into_iter().collect())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// True when the value is null or a record with a null field.
    pub fn has_null(&self) -> bool {
        match self {
            Value::Null => true,
            Value::Record(fields) => fields.iter().any(Value::has_null),
            _ => false,
        }
    }

    pub fn to_i64(&self) -> Option<i64> {
        match self {
            Value::I16(v) => Some(i64::from(*v)),
            Value::I32(v) => Some(i64::from(*v)),
            Value::I64(v) => Some(*v),
            Value::Timestamp(v) => Some(*v),
            _ => None,
        }
    }

    /// Builds an integer value of type `ty` from a generated number.
    pub fn from_i64(ty: &Type, value: i64) -> Result<Value> {
        Ok(match ty {
            Type::I16 => Value::I16(i16::try_from(value)?),
            Type::I32 => Value::I32(i32::try_from(value)?),
            Type::I64 => Value::I64(value),
            Type::Timestamp => Value::Timestamp(value),
            _ => {
                return Err(Error::invalid_state(format!(
                    "cannot assign generated value {value} to a field of type {ty:?}"
                )))
            }
        })
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_entity(&self) -> Option<EntityRef> {
        match self {
            Value::Entity(e) => Some(*e),
            _ => None,
        }
    }

    #[track_caller]
    pub fn expect_entity(&self) -> EntityRef {
        match self {
            Value::Entity(e) => *e,
            _ => panic!("expected entity, but was {self:?}"),
        }
    }

    pub fn as_record(&self) -> Option<&[Value]> {
        match self {
            Value::Record(fields) => Some(fields),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&[(Value, Value)]> {
        match self {
            Value::Map(entries) => Some(entries),
            _ => None,
        }
    }

    /// Value stored under `key` in a keyed collection.
    pub fn get_entry(&self, key: &Value) -> Option<&Value> {
        self.as_map()?
            .iter()
            .find_map(|(k, v)| (k == key).then_some(v))
    }

    /// Splits the value into `arity` components. A scalar is its own single
    /// component; a record is split into its fields.
    pub fn components(&self, arity: usize) -> Result<Vec<Value>> {
        match self {
            Value::Null => Ok(vec![Value::Null; arity]),
            Value::Record(fields) if fields.len() == arity => Ok(fields.clone()),
            value if arity == 1 => Ok(vec![value.clone()]),
            value => Err(Error::invalid_state(format!(
                "expected {arity} key components, but was {value:?}"
            ))),
        }
    }

    /// Reassembles components produced by [`Value::components`].
    pub fn from_components(mut components: Vec<Value>) -> Value {
        if components.len() == 1 {
            components.pop().unwrap_or_default()
        } else if components.iter().all(Value::is_null) {
            Value::Null
        } else {
            Value::Record(components)
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Value) -> bool {
        use Value::*;

        match (self, other) {
            (Null, Null) => true,
            (Bool(a), Bool(b)) => a == b,
            (I16(a), I16(b)) => a == b,
            (I32(a), I32(b)) => a == b,
            (I64(a), I64(b)) => a == b,
            (F64(a), F64(b)) => a.to_bits() == b.to_bits(),
            (String(a), String(b)) => a == b,
            (Bytes(a), Bytes(b)) => a == b,
            (Timestamp(a), Timestamp(b)) => a == b,
            (Record(a), Record(b)) => a == b,
            (Entity(a), Entity(b)) => a == b,
            (List(a), List(b)) => a == b,
            (Map(a), Map(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        core::mem::discriminant(self).hash(state);

        match self {
            Value::Null => {}
            Value::Bool(v) => v.hash(state),
            Value::I16(v) => v.hash(state),
            Value::I32(v) => v.hash(state),
            Value::I64(v) => v.hash(state),
            Value::F64(v) => v.to_bits().hash(state),
            Value::String(v) => v.hash(state),
            Value::Bytes(v) => v.hash(state),
            Value::Timestamp(v) => v.hash(state),
            Value::Record(v) => v.hash(state),
            Value::Entity(v) => v.hash(state),
            Value::List(v) => v.hash(state),
            Value::Map(v) => v.hash(state),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("Null"),
            Value::Bool(v) => write!(f, "Bool({v})"),
            Value::I16(v) => write!(f, "I16({v})"),
            Value::I32(v) => write!(f, "I32({v})"),
            Value::I64(v) => write!(f, "I64({v})"),
            Value::F64(v) => write!(f, "F64({v})"),
            Value::String(v) => write!(f, "String({v:?})"),
            Value::Bytes(v) => write!(f, "Bytes(len={})", v.len()),
            Value::Timestamp(v) => write!(f, "Timestamp({v})"),
            Value::Record(v) => f.debug_tuple("Record").field(v).finish(),
            Value::Entity(v) => write!(f, "Entity({})", v.0),
            Value::List(v) => f.debug_tuple("List").field(v).finish(),
            Value::Map(v) => f.debug_map().entries(v.iter().map(|(k, v)| (k, v))).finish(),
        }
    }
}

impl fmt::Debug for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EntityRef({})", self.0)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Value {
        Value::Bool(value)
    }
}

impl From<i16> for Value {
    fn from(value: i16) -> Value {
        Value::I16(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Value {
        Value::I32(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Value {
        Value::I64(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Value {
        Value::F64(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Value {
        Value::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Value {
        Value::String(value)
    }
}

impl From<Vec<u8>> for Value {
    fn from(value: Vec<u8>) -> Value {
        Value::Bytes(value.into())
    }
}

impl From<Arc<[u8]>> for Value {
    fn from(value: Arc<[u8]>) -> Value {
        Value::Bytes(value)
    }
}

impl From<EntityRef> for Value {
    fn from(value: EntityRef) -> Value {
        Value::Entity(value)
    }
}

impl From<Option<EntityRef>> for Value {
    fn from(value: Option<EntityRef>) -> Value {
        value.map(Value::Entity).unwrap_or(Value::Null)
    }
}

impl From<Vec<EntityRef>> for Value {
    fn from(value: Vec<EntityRef>) -> Value {
        Value::List(value.into_iter().map(Value::Entity).collect())
    }
}

impl From<Vec<(Value, EntityRef)>> for Value {
    fn from(value: Vec<(Value, EntityRef)>) -> Value {
        Value::Map(
            value
                .into_iter()
                .map(|(key, entity)| (key, Value::Entity(entity)))
                .collect(),
        )
    }
}
