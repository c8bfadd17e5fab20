use super::{AccessMode, PropertyDescriptor};
use crate::{Error, Result};

/// Resolved way of reading and writing a property.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Accessor {
    /// Direct access to the declared field.
    Field { name: String },

    /// Getter/setter pair. A property without a setter is read-only to the
    /// application.
    Property {
        getter: String,
        setter: Option<String>,
    },
}

impl Accessor {
    /// Resolves the accessor for `descriptor` on the type named `owner`.
    ///
    /// Field access requires a declared field. Property access uses the
    /// getter and falls back to the declared field.
    pub fn resolve(owner: &str, descriptor: &PropertyDescriptor) -> Result<Accessor> {
        let field = || Accessor::Field {
            name: descriptor.name.clone(),
        };

        match descriptor.access {
            AccessMode::Field if descriptor.declared_field => Ok(field()),
            AccessMode::Property => match &descriptor.getter {
                Some(getter) => Ok(Accessor::Property {
                    getter: getter.clone(),
                    setter: descriptor.setter.clone(),
                }),
                None if descriptor.declared_field => Ok(field()),
                None => Err(no_matching_field(owner, &descriptor.name)),
            },
            AccessMode::Field => Err(no_matching_field(owner, &descriptor.name)),
        }
    }

    pub fn is_field(&self) -> bool {
        matches!(self, Accessor::Field { .. })
    }

    /// Name used to read the value.
    pub fn getter(&self) -> &str {
        match self {
            Accessor::Field { name } => name,
            Accessor::Property { getter, .. } => getter,
        }
    }

    /// Name used to write the value, if writable.
    pub fn setter(&self) -> Option<&str> {
        match self {
            Accessor::Field { name } => Some(name),
            Accessor::Property { setter, .. } => setter.as_deref(),
        }
    }
}

fn no_matching_field(owner: &str, name: &str) -> Error {
    Error::invalid_configuration(format!("{owner}: {name} has no matching field."))
}
