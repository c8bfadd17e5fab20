use super::{Flavor, Formatter, ToSql};

/// A positional parameter. Placeholders are numbered in the order they are
/// written.
pub(super) struct Placeholder;

impl ToSql for Placeholder {
    fn to_sql(self, f: &mut Formatter<'_>) {
        f.params += 1;

        match f.serializer.flavor {
            Flavor::Generic | Flavor::Mysql => f.dst.push('?'),
            Flavor::Postgresql => f.dst.push_str(&format!("${}", f.params)),
            Flavor::Sqlite => f.dst.push_str(&format!("?{}", f.params)),
        }
    }
}
