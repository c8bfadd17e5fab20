use super::{
    app::{FieldTy, Id, Model},
    db::{LinkId, LinkOwner},
    Schema,
};
use crate::{Error, Result};

use std::collections::HashSet;

struct Verify<'a> {
    schema: &'a Schema,
}

impl Schema {
    pub(super) fn verify(&self) -> Result<()> {
        Verify { schema: self }.verify()
    }
}

impl Verify<'_> {
    fn verify(&self) -> Result<()> {
        debug_assert!(self.verify_ids_populated());

        for model in self.schema.app.entities() {
            self.verify_primary_key(model)?;
            self.verify_load_groups(model)?;
            self.verify_update_indices(model)?;
        }

        self.verify_link_ownership()?;
        Ok(())
    }

    fn verify_ids_populated(&self) -> bool {
        for model in self.schema.app.entities() {
            let entity = model.expect_entity();
            assert!(entity.table.0 < self.schema.db.tables.len());

            for field in &model.fields {
                for fc in field.columns(&self.schema.db) {
                    assert!(!fc.column.is_placeholder(), "{}: unbound column", field.name);
                }

                match &field.ty {
                    FieldTy::OneToMany(rel) => {
                        assert!(rel.link.0 < self.schema.db.links.len());
                    }
                    FieldTy::ManyToMany(rel) => {
                        assert!(rel.source_link.0 < self.schema.db.links.len());
                        assert!(rel.target_link.0 < self.schema.db.links.len());
                    }
                    FieldTy::ElementCollection(rel) => {
                        assert!(!rel.column.is_placeholder());
                    }
                    FieldTy::DependentOneToOne(rel) => {
                        assert!(rel.link.0 < self.schema.db.links.len());
                    }
                    _ => {}
                }
            }
        }

        true
    }

    fn verify_primary_key(&self, model: &Model) -> Result<()> {
        let entity = model.expect_entity();
        let table = self.schema.db.table(entity.table);
        let columns = entity.id.columns(self.schema);

        if columns.is_empty() || columns.len() != table.primary_key.len() {
            return Err(self.error(
                model,
                format!(
                    "key columns {columns:?} do not match the primary key of `{}`",
                    table.name
                ),
            ));
        }

        if let Id::Composite { keys, .. } = &entity.id {
            if keys.len() < 2 {
                return Err(self.error(model, "a composite key needs at least two key fields"));
            }
        }

        let generators = entity
            .id
            .key_fields(self.schema)
            .into_iter()
            .filter(|field| field.has_generator())
            .count();

        if generators > 1 {
            return Err(self.error(model, "more than one key generator"));
        }

        Ok(())
    }

    /// Eager scalars share the default group; every other group belongs to
    /// exactly one field of the hierarchy.
    fn verify_load_groups(&self, model: &Model) -> Result<()> {
        let entity = model.expect_entity();
        let mut exclusive = HashSet::new();

        for ancestor in self.schema.app.ancestry(model.id) {
            exclusive.insert(ancestor.expect_entity().default_load_group);
        }

        for field in self.schema.app.fields_of(model.id) {
            let group = field.load_group_index();

            if group >= entity.load_group_count {
                return Err(self.error(model, format!("`{}` load group out of range", field.name)));
            }

            let shares_default = match field.ty {
                FieldTy::Property(_) => !field.lazy,
                FieldTy::Key(_)
                | FieldTy::Version(_)
                | FieldTy::Embedded(_)
                | FieldTy::EmbeddedId(_)
                | FieldTy::ManyToOne(_) => true,
                _ => false,
            };

            if shares_default {
                let owner = self.schema.app.model(field.id.model).expect_entity();
                if group != owner.default_load_group {
                    return Err(self.error(
                        model,
                        format!("`{}` is eager but not in the default load group", field.name),
                    ));
                }
            } else if !exclusive.insert(group) {
                return Err(self.error(
                    model,
                    format!("`{}` shares load group {group}", field.name),
                ));
            }

            if let Some(target) = field.target_load_group() {
                if !exclusive.insert(target) {
                    return Err(self.error(
                        model,
                        format!("`{}` shares target load group {target}", field.name),
                    ));
                }
            }
        }

        Ok(())
    }

    fn verify_update_indices(&self, model: &Model) -> Result<()> {
        let entity = model.expect_entity();
        let mut seen = HashSet::new();

        for field in self.schema.app.fields_of(model.id) {
            let Some(index) = field.update_index else {
                if field.is_dirty_tracked() {
                    return Err(self.error(model, format!("`{}` has no update index", field.name)));
                }
                continue;
            };

            if index >= entity.dirty_count || !seen.insert(index) {
                return Err(self.error(
                    model,
                    format!("`{}` has invalid update index {index}", field.name),
                ));
            }
        }

        for field in &model.fields {
            if field.update_index.is_some_and(|index| index < entity.min_dirty_index) {
                return Err(self.error(
                    model,
                    format!("`{}` update index belongs to a parent", field.name),
                ));
            }
        }

        Ok(())
    }

    /// Every link has a single owner, and the owner references it.
    fn verify_link_ownership(&self) -> Result<()> {
        let mut owned: HashSet<LinkId> = HashSet::new();

        for model in self.schema.app.entities() {
            if let Id::Sub { link, .. } = &model.expect_entity().id {
                self.claim(&mut owned, *link, LinkOwner::SubId(model.id))?;
            }

            for field in &model.fields {
                let links = match &field.ty {
                    FieldTy::ManyToOne(rel) => vec![rel.link],
                    FieldTy::ManyToMany(rel) => vec![rel.source_link, rel.target_link],
                    FieldTy::ElementCollection(rel) => vec![rel.source_link],
                    _ => continue,
                };

                for link in links {
                    self.claim(&mut owned, link, LinkOwner::Field(field.id))?;
                }
            }
        }

        if owned.len() != self.schema.db.links.len() {
            return Err(Error::invalid_mapping(format!(
                "{} links have no owner",
                self.schema.db.links.len() - owned.len()
            )));
        }

        Ok(())
    }

    fn claim(&self, owned: &mut HashSet<LinkId>, link: LinkId, owner: LinkOwner) -> Result<()> {
        if self.schema.db.link(link).owner != owner || !owned.insert(link) {
            return Err(Error::invalid_mapping(format!(
                "{link:?} is claimed by {owner:?} but owned by {:?}",
                self.schema.db.link(link).owner
            )));
        }

        Ok(())
    }

    fn error(&self, model: &Model, message: impl std::fmt::Display) -> Error {
        Error::invalid_mapping(format!("{}: {message}", model.name.upper_camel_case()))
    }
}
