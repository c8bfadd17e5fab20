use crate::logging_connection::ExecOp;
use amber::stmt::Statement;
use std::sync::{Arc, Mutex};

/// A wrapper around the statement log that provides a clean API for tests
#[derive(Debug, Clone)]
pub struct ExecLog {
    ops: Arc<Mutex<Vec<ExecOp>>>,
}

impl ExecLog {
    pub(crate) fn new(ops: Arc<Mutex<Vec<ExecOp>>>) -> Self {
        Self { ops }
    }

    /// Get the number of logged statements
    pub fn len(&self) -> usize {
        self.ops.lock().unwrap().len()
    }

    /// Check if the log is empty
    pub fn is_empty(&self) -> bool {
        self.ops.lock().unwrap().is_empty()
    }

    /// Count statements matching the given predicate
    pub fn count<F>(&self, predicate: F) -> usize
    where
        F: Fn(&Statement) -> bool,
    {
        self.ops
            .lock()
            .unwrap()
            .iter()
            .filter(|op| predicate(&op.statement))
            .count()
    }

    /// Number of SELECTs issued
    pub fn selects(&self) -> usize {
        self.count(Statement::is_select)
    }

    /// Number of INSERTs issued
    pub fn inserts(&self) -> usize {
        self.count(Statement::is_insert)
    }

    /// Number of UPDATEs issued
    pub fn updates(&self) -> usize {
        self.count(Statement::is_update)
    }

    /// Number of DELETEs issued
    pub fn deletes(&self) -> usize {
        self.count(Statement::is_delete)
    }

    /// Rendered SQL of every logged statement, in execution order
    pub fn sql(&self) -> Vec<String> {
        self.ops
            .lock()
            .unwrap()
            .iter()
            .map(|op| op.sql.clone())
            .collect()
    }

    /// Clear the log
    pub fn clear(&mut self) {
        self.ops.lock().unwrap().clear();
    }

    /// Remove and return the first statement from the log.
    /// Returns None if the log is empty
    pub fn pop(&mut self) -> Option<ExecOp> {
        let mut ops = self.ops.lock().unwrap();
        if ops.is_empty() {
            None
        } else {
            Some(ops.remove(0))
        }
    }
}
