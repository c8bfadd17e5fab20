use crate::schema::app::ModelId;

/// Declared type of a mapped property, as reported by the type introspector
/// and refined while the schema is built.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Type {
    Bool,
    I16,
    I32,
    I64,
    F64,
    String,
    Bytes,
    Timestamp,

    /// Reference to an entity.
    Model(ModelId),

    /// Value object stored in the owner's columns.
    Embeddable(ModelId),

    /// Composite primary key wrapper (id class) of an entity.
    Key(ModelId),

    /// Collection of elements.
    List(Box<Type>),

    /// Collection of values keyed by a property of each value.
    Map(Box<Type>, Box<Type>),

    /// Not yet known. Association descriptors carry this until the target
    /// type is resolved.
    Unknown,
}

impl Type {
    pub fn list(ty: impl Into<Type>) -> Type {
        Type::List(Box::new(ty.into()))
    }

    pub fn map(key: impl Into<Type>, value: impl Into<Type>) -> Type {
        Type::Map(Box::new(key.into()), Box::new(value.into()))
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Type::I16 | Type::I32 | Type::I64 | Type::F64)
    }

    pub fn is_integer(&self) -> bool {
        matches!(self, Type::I16 | Type::I32 | Type::I64)
    }

    pub fn is_string(&self) -> bool {
        matches!(self, Type::String)
    }

    pub fn is_scalar(&self) -> bool {
        matches!(
            self,
            Type::Bool
                | Type::I16
                | Type::I32
                | Type::I64
                | Type::F64
                | Type::String
                | Type::Bytes
                | Type::Timestamp
        )
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Type::Unknown)
    }

    pub fn as_model(&self) -> Option<ModelId> {
        match self {
            Type::Model(id) => Some(*id),
            _ => None,
        }
    }
}
