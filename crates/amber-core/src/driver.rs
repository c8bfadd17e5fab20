use crate::{
    stmt::{Select, Statement, Value},
    Result,
};

/// One result row, in SELECT column order.
pub type Row = Vec<Value>;

/// Outcome of a write statement.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Response {
    /// Number of rows affected.
    pub count: u64,

    /// Value generated for the insert's identity column, if any.
    pub generated_key: Option<Value>,
}

/// Storage session used by the engine.
///
/// Calls are synchronous. Implementations report failures with
/// [`Error::storage`](crate::Error::storage) so they propagate unchanged to
/// the caller of the triggering accessor or lifecycle operation.
pub trait Connection {
    /// Runs a query and returns every matching row.
    fn query(&mut self, stmt: &Select, params: &[Value]) -> Result<Vec<Row>>;

    /// Runs an INSERT, UPDATE or DELETE.
    fn execute(&mut self, stmt: &Statement, params: &[Value]) -> Result<Response>;

    /// Returns the next value of the named sequence or generator table.
    fn next_sequence(&mut self, name: &str) -> Result<i64>;
}

impl Response {
    pub fn count(count: u64) -> Response {
        Response {
            count,
            generated_key: None,
        }
    }
}

impl<C: Connection + ?Sized> Connection for Box<C> {
    fn query(&mut self, stmt: &Select, params: &[Value]) -> Result<Vec<Row>> {
        (**self).query(stmt, params)
    }

    fn execute(&mut self, stmt: &Statement, params: &[Value]) -> Result<Response> {
        (**self).execute(stmt, params)
    }

    fn next_sequence(&mut self, name: &str) -> Result<i64> {
        (**self).next_sequence(name)
    }
}
