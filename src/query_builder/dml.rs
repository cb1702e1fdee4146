use crate::error::PgNamedError;
use crate::session::Connector;

use super::QueryBuilder;

impl<C: Connector> QueryBuilder<'_, C> {
    /// Execute a statement and return rows affected.
    ///
    /// # Errors
    /// Parse, binding and execution errors.
    pub async fn dml(self) -> Result<u64, PgNamedError> {
        self.target
            .execute_dml(self.sql.as_ref(), &self.params)
            .await
    }
}
