use super::{Field, FieldColumn, FieldTy};
use crate::{
    schema::db::{self, TableId},
    stmt::{Assignments, ColumnList, ColumnRef, Predicate},
};

impl Field {
    /// True if another field writes this field's columns.
    pub fn is_aliased(&self) -> bool {
        match &self.ty {
            FieldTy::Property(property) => property.alias_key.is_some(),
            FieldTy::ManyToOne(rel) => rel.alias.is_some(),
            _ => false,
        }
    }

    /// Columns of the field on `table`, or `None` if the field has none
    /// there. Multi-table SELECT assembly skips such fields.
    pub fn load_select(
        &self,
        db: &db::Schema,
        table: TableId,
        alias: Option<&str>,
    ) -> Option<ColumnList> {
        let columns = self.columns_on(db, table);

        if columns.is_empty() {
            return None;
        }

        Some(column_list(db, &columns, alias))
    }

    /// All columns of the field.
    pub fn select(&self, db: &db::Schema, alias: Option<&str>) -> Option<ColumnList> {
        let columns = self.columns(db);

        if columns.is_empty() {
            return None;
        }

        Some(column_list(db, &columns, alias))
    }

    /// `o.col=?` for every column of the field.
    pub fn where_clause(&self, db: &db::Schema, alias: Option<&str>) -> Option<Predicate> {
        let columns = self.columns(db);

        if columns.is_empty() {
            return None;
        }

        Some(
            columns
                .iter()
                .map(|fc| ColumnRef::new(alias, &db.column(fc.column).name).eq_param())
                .collect(),
        )
    }

    /// Columns written by an INSERT into `table`.
    pub fn insert_columns(&self, db: &db::Schema, table: TableId) -> Vec<FieldColumn> {
        if !self.insertable() || self.is_aliased() {
            return vec![];
        }

        if let FieldTy::Key(key) = &self.ty {
            if key.generator.as_ref().is_some_and(|g| g.is_identity()) {
                return vec![];
            }
        }

        self.columns_on(db, table)
    }

    /// Columns written by an UPDATE of `table`.
    pub fn update_columns(&self, db: &db::Schema, table: TableId) -> Vec<FieldColumn> {
        if !self.updatable() || self.is_aliased() {
            return vec![];
        }

        self.columns_on(db, table)
    }

    /// `col=?` assignments for an UPDATE of `table`.
    pub fn update_set(&self, db: &db::Schema, table: TableId) -> Option<Assignments> {
        let columns = self.update_columns(db, table);

        if columns.is_empty() {
            return None;
        }

        Some(
            columns
                .iter()
                .map(|fc| ColumnRef::unqualified(&db.column(fc.column).name))
                .collect(),
        )
    }

    fn columns_on(&self, db: &db::Schema, table: TableId) -> Vec<FieldColumn> {
        let mut columns = self.columns(db);
        columns.retain(|fc| fc.column.table == table);
        columns
    }
}

fn column_list(db: &db::Schema, columns: &[FieldColumn], alias: Option<&str>) -> ColumnList {
    columns
        .iter()
        .map(|fc| ColumnRef::new(alias, &db.column(fc.column).name))
        .collect()
}
