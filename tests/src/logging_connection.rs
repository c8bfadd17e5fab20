use amber::{
    driver::{Response, Row},
    schema::Schema,
    stmt::{Select, Statement, Value},
    Connection, Result, Serializer,
};
use std::sync::{Arc, Mutex};

/// One statement sent to the storage connection.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecOp {
    pub statement: Statement,

    /// Statement rendered by the generic SQL serializer
    pub sql: String,

    pub params: Vec<Value>,
}

/// A connection wrapper that logs every statement for testing purposes
#[derive(Debug)]
pub struct LoggingConnection<C> {
    /// The underlying connection that actually executes statements
    inner: C,

    schema: Arc<Schema>,

    /// Log of all statements executed through this connection.
    /// Shared with [`crate::ExecLog`].
    ops_log: Arc<Mutex<Vec<ExecOp>>>,
}

impl<C: Connection> LoggingConnection<C> {
    pub fn new(inner: C, schema: Arc<Schema>) -> LoggingConnection<C> {
        LoggingConnection {
            inner,
            schema,
            ops_log: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Get a handle to access the statement log
    pub fn ops_log_handle(&self) -> Arc<Mutex<Vec<ExecOp>>> {
        self.ops_log.clone()
    }

    pub fn inner(&self) -> &C {
        &self.inner
    }

    pub fn inner_mut(&mut self) -> &mut C {
        &mut self.inner
    }

    fn log(&self, statement: Statement, params: &[Value]) {
        let sql = Serializer::new(&self.schema.db).serialize(&statement);

        self.ops_log
            .lock()
            .expect("Failed to acquire ops log lock")
            .push(ExecOp {
                statement,
                sql,
                params: params.to_vec(),
            });
    }
}

impl<C: Connection> Connection for LoggingConnection<C> {
    fn query(&mut self, stmt: &Select, params: &[Value]) -> Result<Vec<Row>> {
        self.log(Statement::Select(stmt.clone()), params);
        self.inner.query(stmt, params)
    }

    fn execute(&mut self, stmt: &Statement, params: &[Value]) -> Result<Response> {
        self.log(stmt.clone(), params);
        self.inner.execute(stmt, params)
    }

    fn next_sequence(&mut self, name: &str) -> Result<i64> {
        self.inner.next_sequence(name)
    }
}
