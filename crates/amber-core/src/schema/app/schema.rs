use super::{Field, FieldId, KeyFactories, Model, ModelId};
use crate::schema::Name;

/// Application-level schema
#[derive(Debug, Clone, Default)]
pub struct Schema {
    /// Models, indexed by `ModelId`
    pub models: Vec<Model>,

    /// Make-key factories of composite and embedded keys
    pub key_factories: KeyFactories,
}

impl Schema {
    /// Get a field by ID
    pub fn field(&self, id: FieldId) -> &Field {
        self.model(id.model).field(id.index)
    }

    pub fn models(&self) -> impl ExactSizeIterator<Item = &Model> {
        self.models.iter()
    }

    pub fn entities(&self) -> impl Iterator<Item = &Model> {
        self.models.iter().filter(|model| model.is_entity())
    }

    /// Get a model by ID
    pub fn model(&self, id: impl Into<ModelId>) -> &Model {
        &self.models[id.into().0]
    }

    pub fn model_by_name(&self, name: &str) -> Option<&Model> {
        let name = Name::new(name);
        self.models.iter().find(|model| model.name == name)
    }

    /// The model and its joined-inheritance ancestors, root first.
    pub fn ancestry(&self, id: impl Into<ModelId>) -> Vec<&Model> {
        let mut chain = vec![];
        let mut next = Some(id.into());

        while let Some(id) = next {
            let model = self.model(id);
            chain.push(model);
            next = model.parent();
        }

        chain.reverse();
        chain
    }

    /// Root of the model's inheritance chain.
    pub fn root(&self, id: impl Into<ModelId>) -> ModelId {
        let mut id = id.into();
        while let Some(parent) = self.model(id).parent() {
            id = parent;
        }
        id
    }

    /// Fields of the model including inherited ones, root first.
    pub fn fields_of(&self, id: impl Into<ModelId>) -> impl Iterator<Item = &Field> {
        self.ancestry(id)
            .into_iter()
            .flat_map(|model| model.fields.iter())
    }

    /// Finds a field, including inherited ones, by name.
    pub fn field_by_name(&self, id: impl Into<ModelId>, name: &str) -> Option<&Field> {
        self.ancestry(id)
            .into_iter()
            .rev()
            .find_map(|model| model.field_by_name(name))
    }

    /// True if `id` is `ancestor` or one of its subtypes.
    pub fn is_subtype_of(&self, id: ModelId, ancestor: ModelId) -> bool {
        self.ancestry(id).iter().any(|model| model.id == ancestor)
    }
}
