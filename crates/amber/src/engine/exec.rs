use crate::Session;
use amber_core::{
    driver::{Response, Row},
    stmt::{Select, Statement, Value},
    Connection, Result,
};
use amber_sql::Serializer;

impl<C: Connection> Session<C> {
    /// Runs a SELECT on the session's connection.
    pub(crate) fn query(&mut self, stmt: &Select, params: &[Value]) -> Result<Vec<Row>> {
        tracing::debug!(
            sql = %Serializer::new(&self.schema.db).serialize_select(stmt),
            params = ?params,
            "query"
        );

        let rows = self.conn.query(stmt, params)?;
        tracing::trace!(rows = rows.len(), "query complete");
        Ok(rows)
    }

    /// Runs an INSERT, UPDATE or DELETE on the session's connection.
    pub(crate) fn execute(&mut self, stmt: &Statement, params: &[Value]) -> Result<Response> {
        tracing::debug!(
            sql = %Serializer::new(&self.schema.db).serialize(stmt),
            params = ?params,
            "execute"
        );

        let response = self.conn.execute(stmt, params)?;
        tracing::trace!(count = response.count, "execute complete");
        Ok(response)
    }
}
