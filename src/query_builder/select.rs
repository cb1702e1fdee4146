use crate::error::PgNamedError;
use crate::results::ResultCursor;
use crate::session::Connector;

use super::QueryBuilder;

impl<C: Connector> QueryBuilder<'_, C> {
    /// Execute a row-returning statement, mapping each row through `handler`.
    ///
    /// # Errors
    /// Parse, binding and execution errors, plus anything `handler` returns.
    pub async fn select<T, F>(self, handler: F) -> Result<Vec<T>, PgNamedError>
    where
        F: FnMut(&ResultCursor) -> Result<T, PgNamedError>,
    {
        self.target
            .execute_select(self.sql.as_ref(), &self.params, handler)
            .await
    }
}
