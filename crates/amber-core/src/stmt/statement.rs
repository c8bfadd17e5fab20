use super::{Assignments, ColumnList, ColumnRef, OrderBy, Predicate};

/// A complete statement handed to the storage connection. Parameters are
/// bound positionally, in the order the `?` placeholders appear.
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Select(Select),
    Insert(Insert),
    Update(Update),
    Delete(Delete),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRef {
    pub name: String,
    pub alias: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Aggregate {
    /// `max(col)` over the single selected column.
    Max,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Select {
    pub table: TableRef,
    pub columns: ColumnList,
    pub aggregate: Option<Aggregate>,
    pub filter: Predicate,
    pub order_by: Vec<OrderBy>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Insert {
    pub table: String,
    pub columns: Vec<String>,

    /// Identity column whose generated value is returned by the connection.
    pub generated: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Update {
    pub table: String,
    pub assignments: Assignments,
    pub filter: Predicate,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Delete {
    pub table: String,
    pub filter: Predicate,
}

impl Statement {
    pub fn table(&self) -> &str {
        match self {
            Statement::Select(stmt) => &stmt.table.name,
            Statement::Insert(stmt) => &stmt.table,
            Statement::Update(stmt) => &stmt.table,
            Statement::Delete(stmt) => &stmt.table,
        }
    }

    /// Number of positional parameters the statement expects.
    pub fn param_count(&self) -> usize {
        match self {
            Statement::Select(stmt) => stmt.filter.param_count(),
            Statement::Insert(stmt) => stmt.columns.len(),
            Statement::Update(stmt) => stmt.assignments.len() + stmt.filter.param_count(),
            Statement::Delete(stmt) => stmt.filter.param_count(),
        }
    }

    pub fn is_select(&self) -> bool {
        matches!(self, Statement::Select(_))
    }

    pub fn is_insert(&self) -> bool {
        matches!(self, Statement::Insert(_))
    }

    pub fn is_update(&self) -> bool {
        matches!(self, Statement::Update(_))
    }

    pub fn is_delete(&self) -> bool {
        matches!(self, Statement::Delete(_))
    }
}

impl TableRef {
    pub fn new(name: impl Into<String>, alias: Option<&str>) -> TableRef {
        TableRef {
            name: name.into(),
            alias: alias.map(str::to_string),
        }
    }
}

impl Select {
    pub fn new(table: TableRef, columns: ColumnList, filter: Predicate) -> Select {
        Select {
            table,
            columns,
            aggregate: None,
            filter,
            order_by: vec![],
        }
    }

    /// `select max(column) from table`
    pub fn max(table: TableRef, column: ColumnRef) -> Select {
        Select {
            aggregate: Some(Aggregate::Max),
            ..Select::new(table, ColumnList::from_iter([column]), Predicate::new())
        }
    }
}

impl From<Select> for Statement {
    fn from(value: Select) -> Statement {
        Statement::Select(value)
    }
}

impl From<Insert> for Statement {
    fn from(value: Insert) -> Statement {
        Statement::Insert(value)
    }
}

impl From<Update> for Statement {
    fn from(value: Update) -> Statement {
        Statement::Update(value)
    }
}

impl From<Delete> for Statement {
    fn from(value: Delete) -> Statement {
        Statement::Delete(value)
    }
}
