use super::{ColumnId, Schema, TableId};
use crate::{
    schema::app::{FieldId, ModelId},
    stmt::{Assignments, ColumnList, ColumnRef, Predicate},
};

use std::fmt;

/// Foreign-key column set mapping rows of `source` to rows of `target`.
#[derive(Debug, Clone, PartialEq)]
pub struct LinkColumns {
    pub id: LinkId,

    /// The single owner of the link.
    pub owner: LinkOwner,

    /// Table holding the foreign-key columns.
    pub source: TableId,

    /// Table holding the referenced key columns.
    pub target: TableId,

    /// Source columns paired with the target columns they reference, in the
    /// target's key order.
    pub columns: Vec<ForeignColumn>,

    pub cascade_delete: CascadeDelete,
}

#[derive(PartialEq, Eq, Clone, Copy, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LinkId(pub usize);

/// What owns a link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LinkOwner {
    /// An association or collection field.
    Field(FieldId),

    /// The key of a joined-inheritance subtype, linking its table to the
    /// parent's table.
    SubId(ModelId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForeignColumn {
    pub column: ColumnId,
    pub target: ColumnId,
}

/// Which side of the link is removed when the other side is removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CascadeDelete {
    #[default]
    None,

    /// Removing the target removes the source row.
    Source,

    /// Removing the source removes the target row.
    Target,
}

impl LinkColumns {
    /// The source column referencing `target`.
    pub fn source_column(&self, target: ColumnId) -> Option<ColumnId> {
        self.columns
            .iter()
            .find(|fk| fk.target == target)
            .map(|fk| fk.column)
    }

    pub fn source_columns(&self) -> impl ExactSizeIterator<Item = ColumnId> + '_ {
        self.columns.iter().map(|fk| fk.column)
    }

    pub fn target_columns(&self) -> impl ExactSizeIterator<Item = ColumnId> + '_ {
        self.columns.iter().map(|fk| fk.target)
    }

    pub fn contains_source(&self, column: ColumnId) -> bool {
        self.columns.iter().any(|fk| fk.column == column)
    }

    /// `t.c1, t.c2`
    pub fn select(&self, schema: &Schema, alias: Option<&str>) -> ColumnList {
        self.source_columns()
            .map(|column| ColumnRef::new(alias, &schema.column(column).name))
            .collect()
    }

    /// `c1=?, c2=?`
    pub fn update_set(&self, schema: &Schema) -> Assignments {
        self.source_columns()
            .map(|column| ColumnRef::unqualified(&schema.column(column).name))
            .collect()
    }

    /// `t.c1=? and t.c2=?` over the source columns.
    pub fn match_args(&self, schema: &Schema, alias: Option<&str>) -> Predicate {
        self.source_columns()
            .map(|column| ColumnRef::new(alias, &schema.column(column).name).eq_param())
            .collect()
    }

    /// `s.c1=t.k1 and s.c2=t.k2`
    pub fn join(&self, schema: &Schema, source: &str, target: &str) -> Predicate {
        self.columns
            .iter()
            .map(|fk| {
                ColumnRef::new(Some(source), &schema.column(fk.column).name)
                    .eq_column(ColumnRef::new(Some(target), &schema.column(fk.target).name))
            })
            .collect()
    }

    pub fn set_source_cascade_delete(&mut self) {
        self.cascade_delete = CascadeDelete::Source;
    }

    pub fn set_target_cascade_delete(&mut self) {
        self.cascade_delete = CascadeDelete::Target;
    }

    pub fn is_source_cascade_delete(&self) -> bool {
        self.cascade_delete == CascadeDelete::Source
    }

    pub fn is_target_cascade_delete(&self) -> bool {
        self.cascade_delete == CascadeDelete::Target
    }
}

impl LinkId {
    pub fn placeholder() -> Self {
        Self(usize::MAX)
    }
}

impl fmt::Debug for LinkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LinkId({})", self.0)
    }
}
