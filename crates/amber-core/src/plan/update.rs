use super::{Bind, ColumnTarget};
use crate::{
    schema::{app::ModelId, db::TableId, Schema},
    stmt::{Assignments, ColumnRef, Update},
    Mask,
};

/// UPDATE of the dirty columns of one table.
#[derive(Debug, Clone, PartialEq)]
pub struct TableUpdate {
    pub table: TableId,
    pub stmt: Update,
    pub binds: Vec<Bind>,

    /// True if the WHERE clause checks the version column. Zero affected
    /// rows then means another writer got there first.
    pub versioned: bool,
}

/// Plans the UPDATEs writing the fields set in `dirty`.
///
/// Tables without dirty columns are skipped. The version column is assigned
/// its next value and compared against the loaded value.
pub fn update(schema: &Schema, model: ModelId, dirty: &Mask) -> Vec<TableUpdate> {
    let version = schema.entity(model).version.map(|field| {
        let column = schema.field(field).columns(&schema.db)[0].column;
        (field, column)
    });

    schema
        .app
        .ancestry(model)
        .into_iter()
        .filter_map(|declaring| {
            let entity = declaring.expect_entity();
            let table = schema.db.table(entity.table);
            let mut assignments = Assignments::new();
            let mut binds = vec![];

            for field in &declaring.fields {
                if !field.update_index.is_some_and(|index| dirty.get(index)) {
                    continue;
                }

                for fc in field.update_columns(&schema.db, table.id) {
                    assignments.push(ColumnRef::unqualified(&schema.db.column(fc.column).name));
                    binds.push(if field.ty.is_version() {
                        Bind::NextVersion
                    } else {
                        Bind::Field(ColumnTarget {
                            field: field.id,
                            part: fc.part,
                        })
                    });
                }
            }

            if assignments.is_empty() {
                return None;
            }

            let mut filter = entity.id.where_clause(schema, None);
            binds.extend((0..filter.param_count()).map(Bind::Key));

            let versioned = match version {
                Some((_, column)) if column.table == table.id => {
                    filter.push(ColumnRef::unqualified(&schema.db.column(column).name).eq_param());
                    binds.push(Bind::Version);
                    true
                }
                _ => false,
            };

            Some(TableUpdate {
                table: table.id,
                stmt: Update {
                    table: table.name.clone(),
                    assignments,
                    filter,
                },
                binds,
                versioned,
            })
        })
        .collect()
}
