use super::ALIAS;
use crate::{
    schema::{
        app::{FieldId, FieldTy, ModelId, OrderByColumn},
        db::{LinkId, TableId},
        Schema,
    },
    stmt::{ColumnRef, Delete, Insert, OrderBy, Select, TableRef},
    Error, Result,
};

/// SELECT resolving a collection or dependent association of one owner.
/// Parameters are the owner's key column values.
#[derive(Debug, Clone, PartialEq)]
pub struct CollectionPlan {
    pub field: FieldId,
    pub select: Select,
    pub rows: CollectionRows,

    /// Ordering applied to the loaded targets when the database cannot
    /// order the rows itself.
    pub sort: Vec<OrderByColumn>,
}

/// How rows of a [`CollectionPlan`] are read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionRows {
    /// Each row holds the key columns of one target entity.
    Keys { target: ModelId },

    /// Each row holds the key columns of one target entity followed by its
    /// map key.
    Entries { target: ModelId },

    /// Each row holds one element value.
    Elements,
}

/// Statements maintaining the rows of an association or collection table.
///
/// The first `owner_columns` parameters of `insert` and all parameters of
/// `delete` are the owner's key column values. The remaining `insert`
/// parameters are the target's key column values or the element value.
#[derive(Debug, Clone, PartialEq)]
pub struct AssociationPlan {
    pub table: TableId,
    pub insert: Insert,
    pub delete: Delete,
    pub owner_columns: usize,
}

pub fn collection(schema: &Schema, field: FieldId) -> Result<CollectionPlan> {
    let owner = schema.field(field);

    let plan = match &owner.ty {
        FieldTy::OneToMany(rel) => {
            let mut select = select_referencing(schema, rel.source.model, rel.link, &rel.order_by);

            let rows = match rel.map_key {
                Some(map_key) => {
                    select.columns.columns.push(ColumnRef::new(
                        Some(ALIAS),
                        &schema.db.column(map_key.column).name,
                    ));
                    CollectionRows::Entries { target: rel.target }
                }
                None => CollectionRows::Keys { target: rel.target },
            };

            CollectionPlan {
                field,
                select,
                rows,
                sort: vec![],
            }
        }
        FieldTy::DependentOneToOne(rel) => CollectionPlan {
            field,
            select: select_referencing(schema, rel.target_field.model, rel.link, &[]),
            rows: CollectionRows::Keys { target: rel.target },
            sort: vec![],
        },
        FieldTy::ManyToMany(rel) => {
            let source = schema.db.link(rel.source_link);
            let target = schema.db.link(rel.target_link);
            let table = schema.db.table(rel.table);

            CollectionPlan {
                field,
                select: Select::new(
                    TableRef::new(&table.name, Some(ALIAS)),
                    target.select(&schema.db, Some(ALIAS)),
                    source.match_args(&schema.db, Some(ALIAS)),
                ),
                rows: CollectionRows::Keys { target: rel.target },
                sort: rel.order_by.clone(),
            }
        }
        FieldTy::ElementCollection(rel) => {
            let source = schema.db.link(rel.source_link);
            let table = schema.db.table(rel.table);
            let value = ColumnRef::new(Some(ALIAS), &schema.db.column(rel.column).name);

            let mut select = Select::new(
                TableRef::new(&table.name, Some(ALIAS)),
                [value.clone()].into_iter().collect(),
                source.match_args(&schema.db, Some(ALIAS)),
            );

            if rel.ordered {
                select.order_by.push(OrderBy {
                    column: value,
                    descending: false,
                });
            }

            CollectionPlan {
                field,
                select,
                rows: CollectionRows::Elements,
                sort: vec![],
            }
        }
        _ => {
            return Err(Error::invalid_state(format!(
                "{} field `{}` has no collection to load",
                owner.ty.kind_name(),
                owner.name
            )))
        }
    };

    Ok(plan)
}

/// Keys of the `model` rows whose `link` columns reference the owner.
fn select_referencing(
    schema: &Schema,
    model: ModelId,
    link: LinkId,
    order_by: &[OrderByColumn],
) -> Select {
    let link = schema.db.link(link);
    let table = schema.db.table(link.source);

    let mut select = Select::new(
        TableRef::new(&table.name, Some(ALIAS)),
        schema.entity(model).id.select(schema, Some(ALIAS)),
        link.match_args(&schema.db, Some(ALIAS)),
    );

    select.order_by = order_by
        .iter()
        .map(|order| OrderBy {
            column: ColumnRef::new(Some(ALIAS), &schema.db.column(order.column).name),
            descending: order.descending,
        })
        .collect();

    select
}

/// Plans row maintenance for a many-to-many or element collection field.
pub fn association(schema: &Schema, field: FieldId) -> Result<AssociationPlan> {
    let owner = schema.field(field);

    let (table, source, values) = match &owner.ty {
        FieldTy::ManyToMany(rel) => {
            let target = schema.db.link(rel.target_link);
            let values = target
                .source_columns()
                .map(|column| schema.db.column(column).name.clone())
                .collect();
            (rel.table, rel.source_link, values)
        }
        FieldTy::ElementCollection(rel) => (
            rel.table,
            rel.source_link,
            vec![schema.db.column(rel.column).name.clone()],
        ),
        _ => {
            return Err(Error::invalid_state(format!(
                "{} field `{}` owns no association rows",
                owner.ty.kind_name(),
                owner.name
            )))
        }
    };

    let source = schema.db.link(source);
    let table_name = schema.db.table(table).name.clone();

    let mut columns: Vec<String> = source
        .source_columns()
        .map(|column| schema.db.column(column).name.clone())
        .collect();
    let owner_columns = columns.len();
    columns.extend(values);

    Ok(AssociationPlan {
        table,
        insert: Insert {
            table: table_name.clone(),
            columns,
            generated: None,
        },
        delete: Delete {
            table: table_name,
            filter: source.match_args(&schema.db, None),
        },
        owner_columns,
    })
}
