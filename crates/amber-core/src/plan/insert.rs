use super::{Bind, ColumnTarget};
use crate::{
    schema::{
        app::{FieldId, Id, ModelId},
        db::TableId,
        Schema,
    },
    stmt::{ColumnRef, Insert, Select, TableRef},
    Error, Result,
};

/// INSERT of an entity's row into one table of its hierarchy.
#[derive(Debug, Clone, PartialEq)]
pub struct TableInsert {
    pub table: TableId,
    pub stmt: Insert,
    pub binds: Vec<Bind>,

    /// Key field read back from the response's generated key.
    pub generated: Option<FieldId>,
}

/// Plans the INSERTs creating an instance of `model`, root table first so
/// subtype rows can reference it.
pub fn insert(schema: &Schema, model: ModelId) -> Vec<TableInsert> {
    schema
        .app
        .ancestry(model)
        .into_iter()
        .map(|declaring| {
            let entity = declaring.expect_entity();
            let table = schema.db.table(entity.table);
            let mut columns = vec![];
            let mut binds = vec![];
            let mut generated = None;

            if let Id::Sub { .. } = entity.id {
                for (i, column) in entity.id.columns(schema).into_iter().enumerate() {
                    columns.push(schema.db.column(column).name.clone());
                    binds.push(Bind::Key(i));
                }
            } else if entity.id.is_identity_generator(schema) {
                generated = entity.id.generated_field(schema).ok().map(|field| field.id);
            }

            for field in &declaring.fields {
                for fc in field.insert_columns(&schema.db, table.id) {
                    columns.push(schema.db.column(fc.column).name.clone());
                    binds.push(Bind::Field(ColumnTarget {
                        field: field.id,
                        part: fc.part,
                    }));
                }
            }

            let generated_column = generated.map(|field| {
                let column = schema.field(field).columns(&schema.db)[0].column;
                schema.db.column(column).name.clone()
            });

            TableInsert {
                table: table.id,
                stmt: Insert {
                    table: table.name.clone(),
                    columns,
                    generated: generated_column,
                },
                binds,
                generated,
            }
        })
        .collect()
}

/// `select max(key) from table` for a key generated by the max strategy.
pub fn max_key(schema: &Schema, model: ModelId) -> Result<Select> {
    let root = schema.app.root(model);
    let entity = schema.entity(root);
    let field = entity.id.generated_field(schema)?;

    let [column] = field.columns(&schema.db)[..] else {
        return Err(Error::invalid_state(format!(
            "generated key `{}` must map to a single column",
            field.name
        )));
    };

    let table = schema.db.table(entity.table);
    Ok(Select::max(
        TableRef::new(&table.name, None),
        ColumnRef::unqualified(&schema.db.column(column.column).name),
    ))
}
