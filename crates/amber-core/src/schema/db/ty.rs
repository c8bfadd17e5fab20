use crate::{stmt, Error, Result};

/// Storage type of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Type {
    Boolean,
    SmallInt,
    Integer,
    BigInt,
    Double,
    VarChar(u64),
    Text,
    Blob,
    Timestamp,
}

impl Type {
    pub const DEFAULT_VARCHAR_LENGTH: u64 = 255;

    /// Storage type used for a value of type `ty`. `length` only applies to
    /// strings.
    pub fn from_app(ty: &stmt::Type, length: Option<u64>) -> Result<Type> {
        Ok(match ty {
            stmt::Type::Bool => Type::Boolean,
            stmt::Type::I16 => Type::SmallInt,
            stmt::Type::I32 => Type::Integer,
            stmt::Type::I64 => Type::BigInt,
            stmt::Type::F64 => Type::Double,
            stmt::Type::String => Type::VarChar(length.unwrap_or(Self::DEFAULT_VARCHAR_LENGTH)),
            stmt::Type::Bytes => Type::Blob,
            stmt::Type::Timestamp => Type::Timestamp,
            _ => {
                return Err(Error::invalid_mapping(format!(
                    "type {ty:?} cannot be stored in a single column"
                )))
            }
        })
    }
}
