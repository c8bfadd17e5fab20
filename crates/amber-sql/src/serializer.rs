#[macro_use]
mod fmt;
use fmt::ToSql;

mod create_table;

mod delim;
use delim::{And, Comma};

mod flavor;
use flavor::Flavor;

mod params;
use params::Placeholder;

// Fragment serializers
mod fragment;
mod statement;
mod ty;

use amber_core::{schema::db, stmt};

/// Serialize a statement or fragment to a SQL string
#[derive(Debug)]
pub struct Serializer<'a> {
    /// Schema providing table definitions for DDL
    schema: &'a db::Schema,

    /// The database flavor handles the differences between SQL dialects.
    flavor: Flavor,
}

struct Formatter<'a> {
    /// Handle to the serializer
    serializer: &'a Serializer<'a>,

    /// Where to write the serialized SQL
    dst: &'a mut String,

    /// Number of placeholders written so far
    params: usize,
}

impl<'a> Serializer<'a> {
    pub fn serialize(&self, stmt: &stmt::Statement) -> String {
        self.render(stmt)
    }

    pub fn serialize_select(&self, stmt: &stmt::Select) -> String {
        self.render(stmt)
    }

    /// `o.a, o.b`
    pub fn column_list(&self, columns: &stmt::ColumnList) -> String {
        self.render(columns)
    }

    /// `o.a=? and o.b=?`
    pub fn predicate(&self, predicate: &stmt::Predicate) -> String {
        self.render(predicate)
    }

    /// `a=?, b=?`
    pub fn assignments(&self, assignments: &stmt::Assignments) -> String {
        self.render(assignments)
    }

    fn render(&self, fragment: impl ToSql) -> String {
        let mut ret = String::new();

        let mut fmt = Formatter {
            serializer: self,
            dst: &mut ret,
            params: 0,
        };

        fragment.to_sql(&mut fmt);
        ret
    }
}
