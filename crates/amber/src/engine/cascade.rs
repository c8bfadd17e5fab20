use amber_core::{
    schema::{
        app::{AssociationKind, CascadeType, FieldId, FieldTy, ModelId, Phase},
        Schema,
    },
    stmt::{EntityRef, Value},
    Result,
};

/// Lifecycle operations a cascade drives on associated instances.
pub(crate) trait Lifecycle {
    fn schema(&self) -> &Schema;

    fn model_of(&self, entity: EntityRef) -> ModelId;

    /// True if the instance is managed by the session.
    fn is_managed(&self, entity: EntityRef) -> bool;

    /// Instances currently referenced by an association field, loading the
    /// field if needed. Null entries are left out.
    fn targets(&mut self, entity: EntityRef, field: FieldId) -> Result<Vec<EntityRef>>;

    /// Writes an association field through its setter.
    fn assign(&mut self, entity: EntityRef, field: FieldId, value: Value) -> Result<()>;

    fn persist(&mut self, entity: EntityRef) -> Result<()>;

    fn merge(&mut self, entity: EntityRef) -> Result<EntityRef>;

    fn remove(&mut self, entity: EntityRef) -> Result<()>;

    fn refresh(&mut self, entity: EntityRef) -> Result<()>;

    /// Writes pending updates of one instance.
    fn flush_entity(&mut self, entity: EntityRef) -> Result<()>;
}

/// One lifecycle operation propagated from a parent to its associations.
///
/// Targets are captured when the cascade is collected, before the parent's
/// own statement runs, so a REMOVE still reaches instances whose foreign
/// keys the parent's DELETE invalidates.
#[derive(Debug)]
pub(crate) struct Cascade {
    op: CascadeType,
    steps: Vec<Step>,
}

#[derive(Debug)]
struct Step {
    field: FieldId,
    phase: Phase,
    kind: AssociationKind,

    /// Many-to-one on each target that points back at the parent.
    back_reference: Option<FieldId>,

    targets: Vec<EntityRef>,
}

impl Cascade {
    /// Captures the targets of every association of `parent` that cascades
    /// `op`.
    pub(crate) fn collect<L: Lifecycle>(lc: &mut L, op: CascadeType, parent: EntityRef) -> Result<Cascade> {
        let model = lc.model_of(parent);

        let fields: Vec<_> = lc
            .schema()
            .app
            .fields_of(model)
            .filter_map(|field| {
                let phase = field.cascade_phase(op)?;
                let kind = field.association_kind()?;

                let back_reference = match &field.ty {
                    FieldTy::OneToMany(rel) => Some(rel.source),
                    FieldTy::DependentOneToOne(rel) => Some(rel.target_field),
                    _ => None,
                };

                Some((field.id, phase, kind, back_reference))
            })
            .collect();

        let mut steps = Vec::with_capacity(fields.len());
        for (field, phase, kind, back_reference) in fields {
            let targets = lc.targets(parent, field)?;

            steps.push(Step {
                field,
                phase,
                kind,
                back_reference,
                targets,
            });
        }

        Ok(Cascade { op, steps })
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.steps.iter().all(|step| step.targets.is_empty())
    }

    /// Association fields cascading in `phase`.
    pub(crate) fn fields(&self, phase: Phase) -> impl Iterator<Item = FieldId> + '_ {
        self.steps
            .iter()
            .filter(move |step| step.phase == phase)
            .map(|step| step.field)
    }

    /// Runs the steps of `phase` in field order. The first error aborts the
    /// cascade; operations already applied are not undone.
    pub(crate) fn apply<L: Lifecycle>(&self, lc: &mut L, phase: Phase, parent: EntityRef) -> Result<()> {
        for step in self.steps.iter().filter(|step| step.phase == phase) {
            if !step.targets.is_empty() {
                tracing::debug!(
                    op = ?self.op,
                    ?phase,
                    field = ?step.field,
                    kind = ?step.kind,
                    targets = step.targets.len(),
                    "cascade"
                );
            }

            for &target in &step.targets {
                match self.op {
                    CascadeType::Persist => {
                        if let Some(back_reference) = step.back_reference {
                            lc.assign(target, back_reference, Value::Entity(parent))?;
                        }

                        lc.persist(target)?;
                        lc.flush_entity(target)?;
                    }
                    CascadeType::Merge => {
                        lc.merge(target)?;
                    }
                    CascadeType::Remove => {
                        if lc.is_managed(target) {
                            lc.remove(target)?;
                        }
                    }
                    CascadeType::Refresh => {
                        if lc.is_managed(target) {
                            lc.refresh(target)?;
                        }
                    }
                }
            }
        }

        Ok(())
    }
}
