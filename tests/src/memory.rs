use amber::{
    driver::{Response, Row},
    stmt::{Aggregate, Condition, Operand, Predicate, Select, Statement, Value},
    Connection, Error, Result,
};
use std::{
    cmp::Ordering,
    collections::{BTreeMap, HashMap},
};

/// One stored row, by column name.
pub type Record = BTreeMap<String, Value>;

/// In-memory storage evaluating the statements the engine issues.
///
/// Tables are created on first write. Column references ignore table
/// aliases since every statement touches a single table.
#[derive(Debug, Default)]
pub struct MemoryConnection {
    tables: HashMap<String, Vec<Record>>,

    /// Last identity value handed out per table
    identities: HashMap<String, i64>,

    /// Last value handed out per sequence
    sequences: HashMap<String, i64>,

    /// Tables whose next statement fails
    failures: Vec<String>,
}

impl MemoryConnection {
    pub fn new() -> MemoryConnection {
        MemoryConnection::default()
    }

    /// Adds a row directly, bypassing the engine.
    pub fn seed<'a>(&mut self, table: &str, columns: impl IntoIterator<Item = (&'a str, Value)>) {
        let record = columns
            .into_iter()
            .map(|(name, value)| (name.to_string(), value))
            .collect();
        self.tables.entry(table.to_string()).or_default().push(record);
    }

    /// Rows of `table`, in insertion order.
    pub fn rows(&self, table: &str) -> &[Record] {
        self.tables.get(table).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Overwrites one column of every row of `table` matching `column=key`.
    pub fn overwrite(&mut self, table: &str, key: (&str, Value), column: &str, value: Value) {
        for record in self.tables.entry(table.to_string()).or_default() {
            if record.get(key.0) == Some(&key.1) {
                record.insert(column.to_string(), value.clone());
            }
        }
    }

    /// Sets the last value of a sequence; the next call returns `value + 1`.
    pub fn set_sequence(&mut self, name: &str, value: i64) {
        self.sequences.insert(name.to_string(), value);
    }

    /// Makes the next statement touching `table` fail with a storage error.
    pub fn fail_next(&mut self, table: &str) {
        self.failures.push(table.to_string());
    }

    fn check_failure(&mut self, table: &str) -> Result<()> {
        if let Some(index) = self.failures.iter().position(|name| name == table) {
            self.failures.remove(index);
            return Err(Error::storage_failed(format!("injected failure on `{table}`")));
        }

        Ok(())
    }

    fn select(&self, stmt: &Select, params: &[Value]) -> Vec<Row> {
        let mut matches: Vec<&Record> = self
            .rows(&stmt.table.name)
            .iter()
            .filter(|record| matches(record, &stmt.filter, params))
            .collect();

        if let Some(Aggregate::Max) = stmt.aggregate {
            let column = &stmt.columns.columns[0].name;
            let max = matches
                .iter()
                .filter_map(|record| record.get(column).and_then(Value::to_i64))
                .max();
            return vec![vec![max.map(Value::I64).unwrap_or_default()]];
        }

        for order in stmt.order_by.iter().rev() {
            matches.sort_by(|a, b| {
                let ordering = compare(
                    a.get(&order.column.name).unwrap_or(&Value::Null),
                    b.get(&order.column.name).unwrap_or(&Value::Null),
                );
                if order.descending {
                    ordering.reverse()
                } else {
                    ordering
                }
            });
        }

        matches
            .into_iter()
            .map(|record| {
                stmt.columns
                    .iter()
                    .map(|column| record.get(&column.name).cloned().unwrap_or_default())
                    .collect()
            })
            .collect()
    }
}

impl Connection for MemoryConnection {
    fn query(&mut self, stmt: &Select, params: &[Value]) -> Result<Vec<Row>> {
        self.check_failure(&stmt.table.name)?;
        Ok(self.select(stmt, params))
    }

    fn execute(&mut self, stmt: &Statement, params: &[Value]) -> Result<Response> {
        self.check_failure(stmt.table())?;

        match stmt {
            Statement::Select(select) => {
                let rows = self.select(select, params);
                Ok(Response::count(rows.len() as u64))
            }
            Statement::Insert(insert) => {
                let mut record: Record = insert
                    .columns
                    .iter()
                    .cloned()
                    .zip(params.iter().cloned())
                    .collect();

                let mut response = Response::count(1);

                if let Some(column) = &insert.generated {
                    let next = self.identities.entry(insert.table.clone()).or_default();
                    *next += 1;
                    record.insert(column.clone(), Value::I64(*next));
                    response.generated_key = Some(Value::I64(*next));
                }

                self.tables.entry(insert.table.clone()).or_default().push(record);
                Ok(response)
            }
            Statement::Update(update) => {
                let (values, filter) = params.split_at(update.assignments.len().min(params.len()));
                let mut count = 0;

                for record in self.tables.entry(update.table.clone()).or_default() {
                    if matches(record, &update.filter, filter) {
                        for (column, value) in update.assignments.columns.iter().zip(values) {
                            record.insert(column.name.clone(), value.clone());
                        }
                        count += 1;
                    }
                }

                Ok(Response::count(count))
            }
            Statement::Delete(delete) => {
                let rows = self.tables.entry(delete.table.clone()).or_default();
                let before = rows.len();
                rows.retain(|record| !matches(record, &delete.filter, params));
                Ok(Response::count((before - rows.len()) as u64))
            }
        }
    }

    fn next_sequence(&mut self, name: &str) -> Result<i64> {
        let next = self.sequences.entry(name.to_string()).or_default();
        *next += 1;
        Ok(*next)
    }
}

/// Evaluates a conjunction with SQL null semantics: `col=?` never matches
/// a null.
fn matches(record: &Record, filter: &Predicate, params: &[Value]) -> bool {
    let mut params = params.iter();

    filter.conditions.iter().all(|condition| match condition {
        Condition::Eq { column, rhs } => {
            let lhs = record.get(&column.name).unwrap_or(&Value::Null);
            let rhs = match rhs {
                Operand::Param => params.next().unwrap_or(&Value::Null),
                Operand::Column(other) => record.get(&other.name).unwrap_or(&Value::Null),
            };
            !lhs.is_null() && same(lhs, rhs)
        }
        Condition::IsNull(column) => record.get(&column.name).map_or(true, Value::is_null),
        Condition::IsNotNull(column) => record.get(&column.name).is_some_and(|v| !v.is_null()),
    })
}

/// Integer values of different widths compare equal by value.
fn same(a: &Value, b: &Value) -> bool {
    match (a.to_i64(), b.to_i64()) {
        (Some(a), Some(b)) => a == b,
        _ => a == b,
    }
}

fn compare(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Null, Value::Null) => Ordering::Equal,
        (Value::Null, _) => Ordering::Less,
        (_, Value::Null) => Ordering::Greater,
        (Value::String(a), Value::String(b)) => a.cmp(b),
        (Value::F64(a), Value::F64(b)) => a.total_cmp(b),
        _ => a.to_i64().cmp(&b.to_i64()),
    }
}
