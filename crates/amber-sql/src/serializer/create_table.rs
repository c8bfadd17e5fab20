use super::{Comma, Flavor, Formatter, Serializer, ToSql};

use amber_core::schema::db;

pub(super) struct CreateTable<'a>(pub(super) &'a db::Table);

struct ColumnDef<'a> {
    column: &'a db::Column,

    /// SQLite only auto increments a lone integer primary key declared on
    /// the column itself.
    inline_primary_key: bool,
}

struct ForeignKey<'a>(&'a db::LinkColumns);

impl ToSql for CreateTable<'_> {
    fn to_sql(self, f: &mut Formatter<'_>) {
        let table = self.0;
        let schema = f.serializer.schema;
        let inline_primary_key = f.serializer.is_sqlite()
            && matches!(
                &table.primary_key[..],
                [id] if table.column(*id).auto_increment
            );

        let columns = table.columns.iter().map(|column| ColumnDef {
            column,
            inline_primary_key: inline_primary_key && column.primary_key,
        });

        fmt!(f, "create table ", &table.name, " (", Comma(columns));

        if !table.primary_key.is_empty() && !inline_primary_key {
            let names = table.primary_key_columns().map(|column| &column.name);
            fmt!(f, ", primary key (", Comma(names), ")");
        }

        for link in &table.outgoing {
            fmt!(f, ", ", ForeignKey(schema.link(*link)));
        }

        fmt!(f, ")");
    }
}

impl ToSql for ColumnDef<'_> {
    fn to_sql(self, f: &mut Formatter<'_>) {
        let column = self.column;

        if self.inline_primary_key {
            fmt!(f, &column.name, " integer primary key autoincrement");
            return;
        }

        fmt!(f, &column.name, " ", &column.storage_ty);

        if !column.nullable {
            fmt!(f, " not null");
        }

        if column.unique && !column.primary_key {
            fmt!(f, " unique");
        }

        if column.auto_increment {
            let flavor = f.serializer.flavor;
            match flavor {
                Flavor::Mysql => fmt!(f, " auto_increment"),
                Flavor::Sqlite => {}
                Flavor::Generic | Flavor::Postgresql => {
                    fmt!(f, " generated by default as identity")
                }
            }
        }
    }
}

impl ToSql for ForeignKey<'_> {
    fn to_sql(self, f: &mut Formatter<'_>) {
        let schema = f.serializer.schema;
        let link = self.0;
        let names = move |columns: Vec<db::ColumnId>| {
            columns
                .into_iter()
                .map(|column| &schema.column(column).name)
                .collect::<Vec<_>>()
        };

        fmt!(
            f,
            "foreign key (",
            Comma(names(link.source_columns().collect())),
            ") references ",
            &schema.table(link.target).name,
            " (",
            Comma(names(link.target_columns().collect())),
            ")",
        );

        if link.is_source_cascade_delete() {
            fmt!(f, " on delete cascade");
        }
    }
}

impl Serializer<'_> {
    /// `create table` statement for `table`.
    ///
    /// Columns are listed in registration order, followed by the primary
    /// key and the foreign keys of the table's outgoing links.
    pub fn create_table(&self, table: db::TableId) -> String {
        self.render(CreateTable(self.schema.table(table)))
    }

    /// `create table` statements for every table, in schema order.
    pub fn create_schema(&self) -> Vec<String> {
        self.schema
            .tables
            .iter()
            .map(|table| self.create_table(table.id))
            .collect()
    }
}
