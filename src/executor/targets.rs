use crate::connection::Connection;
use crate::error::PgNamedError;
use crate::params::ParameterSource;
use crate::pool::ConnectionPool;
use crate::results::ResultCursor;
use crate::session::Connector;

/// Where a fluent query runs: a connection held by the caller, or any idle pool slot.
pub enum QueryTarget<'a, C: Connector> {
    Connection(&'a mut Connection<C>),
    Pool(&'a ConnectionPool<C>),
}

impl<'a, C: Connector> From<&'a mut Connection<C>> for QueryTarget<'a, C> {
    fn from(conn: &'a mut Connection<C>) -> Self {
        QueryTarget::Connection(conn)
    }
}

impl<'a, C: Connector> From<&'a ConnectionPool<C>> for QueryTarget<'a, C> {
    fn from(pool: &'a ConnectionPool<C>) -> Self {
        QueryTarget::Pool(pool)
    }
}

impl<C: Connector> QueryTarget<'_, C> {
    pub(crate) async fn execute_select<S, T, F>(
        self,
        sql: &str,
        source: &S,
        handler: F,
    ) -> Result<Vec<T>, PgNamedError>
    where
        S: ParameterSource + ?Sized,
        F: FnMut(&ResultCursor) -> Result<T, PgNamedError>,
    {
        match self {
            QueryTarget::Connection(conn) => conn.execute_select(sql, source, handler).await,
            QueryTarget::Pool(pool) => pool.execute_select(sql, source, handler).await,
        }
    }

    pub(crate) async fn execute_dml<S>(self, sql: &str, source: &S) -> Result<u64, PgNamedError>
    where
        S: ParameterSource + ?Sized,
    {
        match self {
            QueryTarget::Connection(conn) => conn.execute_dml(sql, source).await,
            QueryTarget::Pool(pool) => pool.execute_dml(sql, source).await,
        }
    }
}
