use std::fmt;

/// Lifecycle operation propagated across associations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CascadeType {
    Persist,
    Merge,
    Remove,
    Refresh,
}

/// Set of cascaded operations attached to an association.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CascadeSet(u8);

/// When a cascade runs relative to the parent's own statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Pre,
    Post,
}

/// Association kinds with distinct default cascade phases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssociationKind {
    /// Many-to-one, or the owning side of a one-to-one.
    ToOne,

    /// One-to-many and many-to-many collections.
    Collection,

    /// Dependent (mapped-by) side of a one-to-one.
    Dependent,
}

impl CascadeType {
    pub const ALL: [CascadeType; 4] = [
        CascadeType::Persist,
        CascadeType::Merge,
        CascadeType::Remove,
        CascadeType::Refresh,
    ];

    fn bit(self) -> u8 {
        match self {
            CascadeType::Persist => 1,
            CascadeType::Merge => 1 << 1,
            CascadeType::Remove => 1 << 2,
            CascadeType::Refresh => 1 << 3,
        }
    }
}

impl CascadeSet {
    pub const NONE: CascadeSet = CascadeSet(0);
    pub const ALL: CascadeSet = CascadeSet(0b1111);

    pub fn of(ops: impl IntoIterator<Item = CascadeType>) -> CascadeSet {
        ops.into_iter().fold(CascadeSet::NONE, CascadeSet::with)
    }

    pub fn with(self, op: CascadeType) -> CascadeSet {
        CascadeSet(self.0 | op.bit())
    }

    pub fn contains(self, op: CascadeType) -> bool {
        self.0 & op.bit() != 0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn iter(self) -> impl Iterator<Item = CascadeType> {
        CascadeType::ALL.into_iter().filter(move |op| self.contains(*op))
    }
}

impl From<CascadeType> for CascadeSet {
    fn from(value: CascadeType) -> Self {
        CascadeSet::NONE.with(value)
    }
}

impl fmt::Debug for CascadeSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl Phase {
    /// Default phase of `op` for an association of `kind`.
    ///
    /// To-one targets are persisted before the parent so its foreign key can
    /// reference them; collection children are removed before the parent for
    /// the same reason. The dependent side of a one-to-one inverts the to-one
    /// defaults.
    pub fn default_for(kind: AssociationKind, op: CascadeType) -> Phase {
        use AssociationKind::*;
        use CascadeType::*;

        match (kind, op) {
            (ToOne, Persist) => Phase::Pre,
            (ToOne, _) => Phase::Post,
            (Collection, Remove) => Phase::Pre,
            (Collection, _) => Phase::Post,
            (Dependent, Persist) => Phase::Post,
            (Dependent, _) => Phase::Pre,
        }
    }
}
