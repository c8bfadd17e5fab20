use super::{Flavor, Formatter, ToSql};

use amber_core::schema::db;

impl ToSql for &db::Type {
    fn to_sql(self, f: &mut Formatter<'_>) {
        let flavor = f.serializer.flavor;

        match self {
            db::Type::Boolean => fmt!(f, "boolean"),
            db::Type::SmallInt => fmt!(f, "smallint"),
            db::Type::Integer => fmt!(f, "integer"),
            db::Type::BigInt => fmt!(f, "bigint"),
            db::Type::Double => match flavor {
                Flavor::Sqlite => fmt!(f, "real"),
                Flavor::Mysql => fmt!(f, "double"),
                _ => fmt!(f, "double precision"),
            },
            db::Type::VarChar(length) => f.dst.push_str(&format!("varchar({length})")),
            db::Type::Text => fmt!(f, "text"),
            db::Type::Blob => match flavor {
                Flavor::Postgresql => fmt!(f, "bytea"),
                _ => fmt!(f, "blob"),
            },
            db::Type::Timestamp => fmt!(f, "timestamp"),
        }
    }
}
