use crate::{schema::db::ColumnId, stmt, Error, Result};

/// Optimistic locking counter.
#[derive(Debug, Clone)]
pub struct Version {
    pub column: ColumnId,
}

impl Version {
    /// Returns true if a version counter can have type `ty`.
    pub fn supports(ty: &stmt::Type) -> bool {
        ty.is_integer()
    }

    /// Value stored on insert when the application left the version unset.
    pub fn initial(ty: &stmt::Type) -> Result<stmt::Value> {
        stmt::Value::from_i64(ty, 0)
    }

    /// The value following `current`.
    pub fn next(current: &stmt::Value) -> Result<stmt::Value> {
        use stmt::Value::*;

        Ok(match current {
            I16(v) => I16(v.wrapping_add(1)),
            I32(v) => I32(v.wrapping_add(1)),
            I64(v) => I64(v.wrapping_add(1)),
            _ => {
                return Err(Error::invalid_state(format!(
                    "version value {current:?} cannot be incremented"
                )))
            }
        })
    }
}
