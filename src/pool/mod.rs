//! Fixed-size pool of reconnecting connections.
//!
//! Built on `deadpool::unmanaged::Pool`: a FIFO semaphore sized to the number of
//! connections gates borrowers, and a mutex-guarded idle list hands each borrower a
//! connection nobody else holds. The connection goes back to the idle list when the
//! guard drops, on every exit path.

use std::sync::Arc;

use deadpool::unmanaged::{Object, Pool};
use tracing::debug;

use crate::connection::Connection;
use crate::error::PgNamedError;
use crate::executor::{QueryTarget, query};
use crate::params::ParameterSource;
use crate::query_builder::QueryBuilder;
use crate::results::ResultCursor;
use crate::session::Connector;
use crate::types::SqlValue;

/// A connection checked out of a `ConnectionPool`; returned to the pool on drop.
pub type PooledConnection<C> = Object<Connection<C>>;

/// Snapshot of pool occupancy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolStatus {
    pub max_size: usize,
    pub size: usize,
    /// Idle connections ready to be borrowed.
    pub available: usize,
}

/// Owns N connections and lends each to one borrower at a time.
///
/// Cloning is cheap and shares the same connections.
pub struct ConnectionPool<C: Connector> {
    pool: Pool<Connection<C>>,
}

impl<C: Connector> Clone for ConnectionPool<C> {
    fn clone(&self) -> Self {
        Self {
            pool: self.pool.clone(),
        }
    }
}

impl<C: Connector> std::fmt::Debug for ConnectionPool<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionPool")
            .field("status", &self.status())
            .finish()
    }
}

impl<C: Connector> ConnectionPool<C> {
    /// Open `size` connections through `connector`.
    ///
    /// # Errors
    /// `ConfigError` for a zero size, otherwise the first connect failure.
    pub async fn open(connector: C, size: usize) -> Result<Self, PgNamedError> {
        if size == 0 {
            return Err(PgNamedError::ConfigError(
                "pool size must be at least 1".to_string(),
            ));
        }
        let connector = Arc::new(connector);
        let mut connections = Vec::with_capacity(size);
        for _ in 0..size {
            connections.push(Connection::open(Arc::clone(&connector)).await?);
        }
        debug!(size, "connection pool opened");
        Ok(Self::from_connections(connections))
    }

    /// Pool over already opened connections.
    #[must_use]
    pub fn from_connections(connections: Vec<Connection<C>>) -> Self {
        Self {
            pool: Pool::from(connections),
        }
    }

    /// Wait for an idle connection and claim it.
    ///
    /// # Errors
    /// `PoolError` once the pool is closed.
    pub async fn acquire(&self) -> Result<PooledConnection<C>, PgNamedError> {
        Ok(self.pool.get().await?)
    }

    /// Run `handler` with exclusive use of one connection.
    ///
    /// The connection is returned to the pool when `handler` finishes, whatever it
    /// returned.
    ///
    /// # Errors
    /// `PoolError` if no connection can be claimed; the handler's own result is returned
    /// as-is inside `Ok`.
    pub async fn borrow<T, F>(&self, handler: F) -> Result<T, PgNamedError>
    where
        F: AsyncFnOnce(&mut Connection<C>) -> T,
    {
        let mut conn = self.acquire().await?;
        debug!(connection = conn.id(), "connection borrowed");
        Ok(handler(&mut *conn).await)
    }

    /// `Connection::execute_select` on any idle connection.
    ///
    /// # Errors
    /// Pool, parse, binding and execution errors.
    pub async fn execute_select<S, T, F>(
        &self,
        sql: &str,
        source: &S,
        handler: F,
    ) -> Result<Vec<T>, PgNamedError>
    where
        S: ParameterSource + ?Sized,
        F: FnMut(&ResultCursor) -> Result<T, PgNamedError>,
    {
        let mut conn = self.acquire().await?;
        conn.execute_select(sql, source, handler).await
    }

    /// `Connection::execute_dml` on any idle connection.
    ///
    /// # Errors
    /// Pool, parse, binding and execution errors.
    pub async fn execute_dml<S>(&self, sql: &str, source: &S) -> Result<u64, PgNamedError>
    where
        S: ParameterSource + ?Sized,
    {
        let mut conn = self.acquire().await?;
        conn.execute_dml(sql, source).await
    }

    /// # Errors
    /// See `execute_select`.
    pub async fn execute_select_map<T, F>(
        &self,
        sql: &str,
        params: &[(&str, SqlValue)],
        handler: F,
    ) -> Result<Vec<T>, PgNamedError>
    where
        F: FnMut(&ResultCursor) -> Result<T, PgNamedError>,
    {
        self.execute_select(sql, params, handler).await
    }

    /// # Errors
    /// See `execute_dml`.
    pub async fn execute_dml_map(
        &self,
        sql: &str,
        params: &[(&str, SqlValue)],
    ) -> Result<u64, PgNamedError> {
        self.execute_dml(sql, params).await
    }

    /// Start a fluent query that runs on any idle connection.
    pub fn query<'a>(&'a self, sql: &'a str) -> QueryBuilder<'a, C> {
        query(QueryTarget::Pool(self), sql)
    }

    #[must_use]
    pub fn status(&self) -> PoolStatus {
        let status = self.pool.status();
        PoolStatus {
            max_size: status.max_size,
            size: status.size,
            available: usize::try_from(status.available).unwrap_or(0),
        }
    }

    /// Stop lending connections. Pending and future borrows fail with `PoolError`; idle
    /// connections are dropped, which ends their sessions.
    pub fn close(&self) {
        self.pool.close();
        debug!("connection pool closed");
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.pool.is_closed()
    }
}
