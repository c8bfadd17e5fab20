use super::{Field, FieldTy};
use crate::{
    schema::{app::Generator, db::ColumnId},
    Error, Result,
};

/// A scalar primary key field.
#[derive(Debug, Clone)]
pub struct Key {
    pub column: ColumnId,

    /// How new values are produced, if the application does not assign them.
    pub generator: Option<Generator>,
}

impl Field {
    /// Returns the field's key generator.
    ///
    /// Asking a field that declares no generator is an invalid state.
    pub fn generator(&self) -> Result<&Generator> {
        match &self.ty {
            FieldTy::Key(Key {
                generator: Some(generator),
                ..
            }) => Ok(generator),
            _ => Err(Error::invalid_state(format!(
                "field `{}` has no key generator",
                self.name
            ))),
        }
    }

    pub fn has_generator(&self) -> bool {
        self.generator().is_ok()
    }
}
