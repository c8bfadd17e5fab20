use super::{ColumnTarget, ALIAS};
use crate::{
    schema::{
        app::ModelId,
        db::TableId,
        Schema,
    },
    stmt::{ColumnList, Select, TableRef},
};

/// SELECT fetching one load group of an entity.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadGroupPlan {
    /// Model whose table holds the group.
    pub model: ModelId,

    pub group: usize,
    pub table: TableId,

    /// Filtered by the key columns of `table`; parameters are the instance's
    /// key column values.
    pub select: Select,

    /// Destination of each selected column. `None` for columns selected only
    /// to check that the row exists.
    pub targets: Vec<Option<ColumnTarget>>,
}

/// Plans the SELECT for `group` of an instance of `model`.
///
/// Returns `None` for groups that own no columns, such as collection and
/// association target groups; those are resolved by [`super::collection`].
pub fn load_group(schema: &Schema, model: ModelId, group: usize) -> Option<LoadGroupPlan> {
    for declaring in schema.app.ancestry(model) {
        let entity = declaring.expect_entity();
        let table = entity.table;
        let mut columns = ColumnList::new();
        let mut targets = vec![];
        let mut owns_group = group == entity.default_load_group;

        for field in &declaring.fields {
            if field.load_group != Some(group) || field.is_collection_like() {
                continue;
            }

            owns_group = true;

            let Some(select) = field.load_select(&schema.db, table, Some(ALIAS)) else {
                continue;
            };

            columns.extend(select);
            targets.extend(
                field
                    .columns(&schema.db)
                    .into_iter()
                    .filter(|fc| fc.column.table == table)
                    .map(|fc| {
                        Some(ColumnTarget {
                            field: field.id,
                            part: fc.part,
                        })
                    }),
            );
        }

        if !owns_group {
            continue;
        }

        // A subtype without eager columns still reads its key to confirm the
        // subtype row exists.
        if columns.is_empty() {
            let key = entity.id.select(schema, Some(ALIAS));
            targets.extend(key.iter().map(|_| None));
            columns.extend(key);
        }

        let table_name = &schema.db.table(table).name;
        let filter = entity.id.where_clause(schema, Some(ALIAS));

        return Some(LoadGroupPlan {
            model: declaring.id,
            group,
            table,
            select: Select::new(TableRef::new(table_name, Some(ALIAS)), columns, filter),
            targets,
        });
    }

    None
}
