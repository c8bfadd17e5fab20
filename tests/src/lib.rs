mod exec_log;
pub use exec_log::ExecLog;

pub mod fixtures;

mod logging_connection;
pub use logging_connection::{ExecOp, LoggingConnection};

mod memory;
pub use memory::{MemoryConnection, Record};

use amber::{Schema, Session};
use std::sync::Arc;

pub type TestSession = Session<LoggingConnection<MemoryConnection>>;

/// Session over an empty in-memory store, with the log of every statement
/// it sends.
pub fn session(schema: Schema) -> (TestSession, ExecLog) {
    init_tracing();

    let schema = Arc::new(schema);
    let conn = LoggingConnection::new(MemoryConnection::new(), schema.clone());
    let log = ExecLog::new(conn.ops_log_handle());

    (Session::new(schema, conn), log)
}

/// The in-memory store behind a test session.
pub fn store(session: &mut TestSession) -> &mut MemoryConnection {
    session.connection_mut().inner_mut()
}

/// Routes engine events to the test output. Filtered by `RUST_LOG`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
