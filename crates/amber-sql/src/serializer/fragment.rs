use super::{And, Comma, Formatter, Placeholder, ToSql};

use amber_core::stmt;

impl ToSql for &stmt::ColumnRef {
    fn to_sql(self, f: &mut Formatter<'_>) {
        if let Some(alias) = &self.alias {
            fmt!(f, alias, ".");
        }

        fmt!(f, &self.name);
    }
}

impl ToSql for &stmt::ColumnList {
    fn to_sql(self, f: &mut Formatter<'_>) {
        fmt!(f, Comma(&self.columns));
    }
}

impl ToSql for &stmt::Operand {
    fn to_sql(self, f: &mut Formatter<'_>) {
        match self {
            stmt::Operand::Param => fmt!(f, Placeholder),
            stmt::Operand::Column(column) => fmt!(f, column),
        }
    }
}

impl ToSql for &stmt::Condition {
    fn to_sql(self, f: &mut Formatter<'_>) {
        match self {
            stmt::Condition::Eq { column, rhs } => fmt!(f, column, "=", rhs),
            stmt::Condition::IsNull(column) => fmt!(f, column, " is null"),
            stmt::Condition::IsNotNull(column) => fmt!(f, column, " is not null"),
        }
    }
}

impl ToSql for &stmt::Predicate {
    fn to_sql(self, f: &mut Formatter<'_>) {
        fmt!(f, And(&self.conditions));
    }
}

/// `col=?` assignment of an UPDATE.
struct Assignment<'a>(&'a stmt::ColumnRef);

impl ToSql for Assignment<'_> {
    fn to_sql(self, f: &mut Formatter<'_>) {
        fmt!(f, self.0, "=", Placeholder);
    }
}

impl ToSql for &stmt::Assignments {
    fn to_sql(self, f: &mut Formatter<'_>) {
        fmt!(f, Comma(self.columns.iter().map(Assignment)));
    }
}

impl ToSql for &stmt::OrderBy {
    fn to_sql(self, f: &mut Formatter<'_>) {
        let direction = if self.descending { " desc" } else { "" };
        fmt!(f, &self.column, direction);
    }
}

impl ToSql for &stmt::TableRef {
    fn to_sql(self, f: &mut Formatter<'_>) {
        fmt!(f, &self.name);

        if let Some(alias) = &self.alias {
            fmt!(f, " ", alias);
        }
    }
}
