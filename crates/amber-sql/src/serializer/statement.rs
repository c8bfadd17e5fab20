use super::{Comma, Flavor, Formatter, Placeholder, ToSql};

use amber_core::stmt;

impl ToSql for &stmt::Statement {
    fn to_sql(self, f: &mut Formatter<'_>) {
        match self {
            stmt::Statement::Select(stmt) => stmt.to_sql(f),
            stmt::Statement::Insert(stmt) => stmt.to_sql(f),
            stmt::Statement::Update(stmt) => stmt.to_sql(f),
            stmt::Statement::Delete(stmt) => stmt.to_sql(f),
        }
    }
}

struct Filter<'a>(&'a stmt::Predicate);

impl ToSql for Filter<'_> {
    fn to_sql(self, f: &mut Formatter<'_>) {
        if !self.0.is_empty() {
            fmt!(f, " where ", self.0);
        }
    }
}

impl ToSql for &stmt::Select {
    fn to_sql(self, f: &mut Formatter<'_>) {
        match self.aggregate {
            Some(stmt::Aggregate::Max) => fmt!(f, "select max(", &self.columns, ")"),
            None => fmt!(f, "select ", &self.columns),
        }

        fmt!(f, " from ", &self.table, Filter(&self.filter));

        if !self.order_by.is_empty() {
            fmt!(f, " order by ", Comma(&self.order_by));
        }
    }
}

impl ToSql for &stmt::Insert {
    fn to_sql(self, f: &mut Formatter<'_>) {
        fmt!(f, "insert into ", &self.table);

        let flavor = f.serializer.flavor;

        if self.columns.is_empty() {
            match flavor {
                Flavor::Mysql => fmt!(f, " () values ()"),
                _ => fmt!(f, " default values"),
            }
        } else {
            let placeholders = Comma(self.columns.iter().map(|_| Placeholder));
            fmt!(f, " (", Comma(&self.columns), ") values (", placeholders, ")");
        }

        if f.serializer.is_postgresql() {
            if let Some(generated) = &self.generated {
                fmt!(f, " returning ", generated);
            }
        }
    }
}

impl ToSql for &stmt::Update {
    fn to_sql(self, f: &mut Formatter<'_>) {
        fmt!(
            f,
            "update ",
            &self.table,
            " set ",
            &self.assignments,
            Filter(&self.filter),
        );
    }
}

impl ToSql for &stmt::Delete {
    fn to_sql(self, f: &mut Formatter<'_>) {
        fmt!(f, "delete from ", &self.table, Filter(&self.filter));
    }
}
