/// A column reference, optionally qualified by a table alias (`o.name`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ColumnRef {
    pub alias: Option<String>,
    pub name: String,
}

/// Comma separated column list of a SELECT.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnList {
    pub columns: Vec<ColumnRef>,
}

/// Right-hand side of an equality condition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operand {
    /// A positional `?` parameter.
    Param,

    /// Another column, used by join conditions.
    Column(ColumnRef),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Condition {
    Eq { column: ColumnRef, rhs: Operand },
    IsNull(ColumnRef),
    IsNotNull(ColumnRef),
}

/// Conjunction of conditions, rendered with ` and `.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Predicate {
    pub conditions: Vec<Condition>,
}

/// `col=?` assignments of an UPDATE, rendered with `, `.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Assignments {
    pub columns: Vec<ColumnRef>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBy {
    pub column: ColumnRef,
    pub descending: bool,
}

impl ColumnRef {
    pub fn new(alias: Option<&str>, name: impl Into<String>) -> ColumnRef {
        ColumnRef {
            alias: alias.map(str::to_string),
            name: name.into(),
        }
    }

    pub fn unqualified(name: impl Into<String>) -> ColumnRef {
        ColumnRef::new(None, name)
    }

    /// `self=?`
    pub fn eq_param(self) -> Condition {
        Condition::Eq {
            column: self,
            rhs: Operand::Param,
        }
    }

    /// `self=other`
    pub fn eq_column(self, other: ColumnRef) -> Condition {
        Condition::Eq {
            column: self,
            rhs: Operand::Column(other),
        }
    }
}

impl ColumnList {
    pub fn new() -> ColumnList {
        ColumnList::default()
    }

    pub fn push(&mut self, column: ColumnRef) {
        self.columns.push(column);
    }

    pub fn extend(&mut self, other: ColumnList) {
        self.columns.extend(other.columns);
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn iter(&self) -> impl ExactSizeIterator<Item = &ColumnRef> {
        self.columns.iter()
    }
}

impl FromIterator<ColumnRef> for ColumnList {
    fn from_iter<T: IntoIterator<Item = ColumnRef>>(iter: T) -> Self {
        ColumnList {
            columns: iter.into_iter().collect(),
        }
    }
}

impl Predicate {
    pub fn new() -> Predicate {
        Predicate::default()
    }

    pub fn push(&mut self, condition: Condition) {
        self.conditions.push(condition);
    }

    /// Appends every condition of `other`.
    pub fn and(&mut self, other: Predicate) {
        self.conditions.extend(other.conditions);
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    /// Number of `?` parameters the predicate binds.
    pub fn param_count(&self) -> usize {
        self.conditions
            .iter()
            .filter(|condition| {
                matches!(
                    condition,
                    Condition::Eq {
                        rhs: Operand::Param,
                        ..
                    }
                )
            })
            .count()
    }
}

impl FromIterator<Condition> for Predicate {
    fn from_iter<T: IntoIterator<Item = Condition>>(iter: T) -> Self {
        Predicate {
            conditions: iter.into_iter().collect(),
        }
    }
}

impl Assignments {
    pub fn new() -> Assignments {
        Assignments::default()
    }

    pub fn push(&mut self, column: ColumnRef) {
        self.columns.push(column);
    }

    pub fn extend(&mut self, other: Assignments) {
        self.columns.extend(other.columns);
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

impl FromIterator<ColumnRef> for Assignments {
    fn from_iter<T: IntoIterator<Item = ColumnRef>>(iter: T) -> Self {
        Assignments {
            columns: iter.into_iter().collect(),
        }
    }
}
