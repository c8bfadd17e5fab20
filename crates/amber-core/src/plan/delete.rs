use super::Bind;
use crate::{
    schema::{
        app::{FieldTy, ModelId},
        db::TableId,
        Schema,
    },
    stmt::{ColumnRef, Delete},
};

/// DELETE of the rows an entity owns in one table.
#[derive(Debug, Clone, PartialEq)]
pub struct TableDelete {
    pub table: TableId,
    pub stmt: Delete,
    pub binds: Vec<Bind>,
    pub versioned: bool,
}

/// Plans the DELETEs removing an instance of `model`.
///
/// Association and collection rows owned by the instance go first, then the
/// hierarchy's rows from the most derived table up to the root.
pub fn delete(schema: &Schema, model: ModelId) -> Vec<TableDelete> {
    let ancestry = schema.app.ancestry(model);
    let mut plans = vec![];

    for declaring in &ancestry {
        for field in &declaring.fields {
            let link = match &field.ty {
                FieldTy::ManyToMany(rel) => rel.source_link,
                FieldTy::ElementCollection(rel) => rel.source_link,
                _ => continue,
            };

            let link = schema.db.link(link);
            let table = schema.db.table(link.source);
            let filter = link.match_args(&schema.db, None);

            plans.push(TableDelete {
                table: table.id,
                binds: (0..filter.param_count()).map(Bind::Key).collect(),
                stmt: Delete {
                    table: table.name.clone(),
                    filter,
                },
                versioned: false,
            });
        }
    }

    let version = schema
        .entity(model)
        .version
        .map(|field| schema.field(field).columns(&schema.db)[0].column);

    for declaring in ancestry.iter().rev() {
        let entity = declaring.expect_entity();
        let table = schema.db.table(entity.table);

        let mut filter = entity.id.where_clause(schema, None);
        let mut binds: Vec<_> = (0..filter.param_count()).map(Bind::Key).collect();

        let versioned = match version {
            Some(column) if column.table == table.id => {
                filter.push(ColumnRef::unqualified(&schema.db.column(column).name).eq_param());
                binds.push(Bind::Version);
                true
            }
            _ => false,
        };

        plans.push(TableDelete {
            table: table.id,
            stmt: Delete {
                table: table.name.clone(),
                filter,
            },
            binds,
            versioned,
        });
    }

    plans
}
