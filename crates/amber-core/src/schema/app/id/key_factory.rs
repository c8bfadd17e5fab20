use crate::{
    schema::{app::ModelId, Name},
    stmt::{Type, Value},
    Error, Result,
};
use indexmap::IndexMap;

/// Builds the key value of a composite or embedded primary key from one
/// argument per key component.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyFactory {
    /// Factory name, derived from the owning type.
    pub name: String,

    /// Entity whose key the factory builds
    pub owner: ModelId,

    /// One parameter per key component, in key order
    pub params: Vec<KeyParam>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct KeyParam {
    pub name: String,
    pub ty: Type,
}

/// Registry of key factories, memoized by owning type.
#[derive(Debug, Clone, Default)]
pub struct KeyFactories {
    factories: IndexMap<String, KeyFactory>,
}

impl KeyFactory {
    pub fn arity(&self) -> usize {
        self.params.len()
    }

    /// Builds a key from its components.
    pub fn make(&self, args: Vec<Value>) -> Result<Value> {
        if args.len() != self.arity() {
            return Err(Error::invalid_state(format!(
                "{} expects {} arguments, got {}",
                self.name,
                self.arity(),
                args.len()
            )));
        }

        Ok(Value::Record(args))
    }

    /// Splits a key built by [`KeyFactory::make`] back into its components.
    pub fn decompose(&self, key: &Value) -> Result<Vec<Value>> {
        key.components(self.arity())
    }
}

impl KeyFactories {
    /// Name of the factory generated for `owner`.
    pub fn name_for(owner: &Name) -> String {
        format!("make_key_{}", owner.snake_case())
    }

    /// Registers the factory for `owner`, or returns the name of the one
    /// already registered.
    pub fn register(&mut self, owner: ModelId, owner_name: &Name, params: Vec<KeyParam>) -> String {
        let name = Self::name_for(owner_name);

        if self.factories.contains_key(&name) {
            tracing::trace!(factory = %name, "key factory already generated");
            return name;
        }

        self.factories.insert(
            name.clone(),
            KeyFactory {
                name: name.clone(),
                owner,
                params,
            },
        );
        name
    }

    pub fn get(&self, name: &str) -> Option<&KeyFactory> {
        self.factories.get(name)
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &KeyFactory> {
        self.factories.values()
    }
}
