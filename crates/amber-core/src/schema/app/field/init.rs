use super::{Field, FieldTy};
use crate::{schema::app::TypeBuilder, Error, Result};

impl Field {
    /// Assigns the field's load group and update index from the owning
    /// type's allocators.
    ///
    /// Eager scalar fields share the type's default load group; lazy scalars
    /// and collections each get a fresh group. A many-to-one loads its
    /// foreign key with the default group and gets a fresh group tracking
    /// resolution of its target.
    ///
    /// Calling `init` again on an initialized field is a no-op. A field with
    /// only part of its indices assigned is rejected.
    pub fn init(&mut self, types: &mut TypeBuilder) -> Result<()> {
        let tracked = self.is_dirty_tracked();
        let has_load = self.load_group.is_some();
        let has_update = self.update_index.is_some();

        if has_load && (has_update || !tracked) {
            return Ok(());
        }

        if has_load || has_update {
            return Err(Error::invalid_state(format!(
                "field `{}` is partially initialized (load group {:?}, update index {:?})",
                self.name, self.load_group, self.update_index
            )));
        }

        if tracked {
            self.update_index = Some(types.next_dirty_index());
        }

        let load_group = match &self.ty {
            FieldTy::Property(_) if self.lazy => types.next_load_group_index(),
            FieldTy::Property(_)
            | FieldTy::Key(_)
            | FieldTy::Version(_)
            | FieldTy::Embedded(_)
            | FieldTy::EmbeddedId(_)
            | FieldTy::ManyToOne(_) => types.default_load_group_index(),
            FieldTy::OneToMany(_)
            | FieldTy::ManyToMany(_)
            | FieldTy::ElementCollection(_)
            | FieldTy::DependentOneToOne(_) => types.next_load_group_index(),
        };
        self.load_group = Some(load_group);

        if let FieldTy::ManyToOne(rel) = &mut self.ty {
            rel.target_load_group = Some(types.next_load_group_index());
        }

        tracing::trace!(
            field = %self.name,
            load_group,
            update_index = ?self.update_index,
            "initialized field"
        );

        Ok(())
    }
}
