//! A single reconnecting connection.
//!
//! A statement that fails with a fatal status tears the session down and opens a fresh one
//! before the error reaches the caller, so the next call on the same `Connection` runs on
//! a working session.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::{debug, error, warn};

use crate::error::PgNamedError;
use crate::executor::{QueryTarget, collect_rows, prepare_call, query};
use crate::params::{NoParams, ParameterSource};
use crate::query_builder::QueryBuilder;
use crate::results::ResultCursor;
use crate::session::{Connector, ResultStatus, Session, TabularResult, WireParam};
use crate::types::SqlValue;

static NEXT_CONNECTION_ID: AtomicU64 = AtomicU64::new(1);

/// Lifecycle of a `Connection`.
///
/// `Connecting -> Ready`, then `Ready -> Fatal -> Reconnecting -> Ready` on a fatal
/// statement failure. A failed reconnect leaves the connection in `Fatal` without a
/// session; the next statement connects again first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Connecting,
    Ready,
    Fatal,
    Reconnecting,
    Closed,
}

/// Owns exactly one live session opened through `C`.
pub struct Connection<C: Connector> {
    connector: Arc<C>,
    session: Option<C::Session>,
    state: ConnectionState,
    id: u64,
}

impl<C: Connector> std::fmt::Debug for Connection<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("id", &self.id)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl<C: Connector> Connection<C> {
    /// Open a session through `connector`.
    ///
    /// # Errors
    /// Whatever the connector reports when the session cannot be established.
    pub async fn open(connector: Arc<C>) -> Result<Self, PgNamedError> {
        let id = NEXT_CONNECTION_ID.fetch_add(1, Ordering::Relaxed);
        debug!(connection = id, "opening connection");
        let session = connector.connect().await?;
        Ok(Self {
            connector,
            session: Some(session),
            state: ConnectionState::Ready,
            id,
        })
    }

    #[must_use]
    pub fn id(&self) -> u64 {
        self.id
    }

    #[must_use]
    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Send an already positional statement.
    ///
    /// On success the raw result is returned. On failure the session's last error text
    /// becomes the error message; a fatal status additionally replaces the session.
    ///
    /// # Errors
    /// - `Statement` for a failure that left the session usable
    /// - `ConnectionLost` after a fatal failure, once a new session is in place
    /// - `Reconnect` when the replacement session could not be opened
    /// - `ConnectionError` on a closed connection
    pub async fn execute_raw(
        &mut self,
        sql: &str,
        params: &[WireParam],
    ) -> Result<TabularResult, PgNamedError> {
        if self.state == ConnectionState::Closed {
            return Err(PgNamedError::ConnectionError(format!(
                "connection {} is closed",
                self.id
            )));
        }
        if self.session.is_none() {
            self.reestablish().await?;
        }
        let Some(session) = self.session.as_mut() else {
            return Err(PgNamedError::ConnectionError(format!(
                "connection {} has no session",
                self.id
            )));
        };

        let result = session.exec_params(sql, params).await;
        let status = result.status();
        if status.is_success() {
            return Ok(result);
        }

        let message = session
            .last_error_message()
            .or_else(|| result.error_message().map(str::to_string))
            .unwrap_or_else(|| format!("statement failed with status {status:?}"));

        if status != ResultStatus::FatalError {
            debug!(connection = self.id, ?status, error = %message, "statement failed");
            return Err(PgNamedError::Statement(message));
        }

        self.state = ConnectionState::Fatal;
        warn!(connection = self.id, error = %message, "fatal session error, reconnecting");
        if let Some(mut dead) = self.session.take() {
            dead.close().await;
        }
        match self.reestablish().await {
            Ok(()) => Err(PgNamedError::ConnectionLost(message)),
            Err(e) => Err(PgNamedError::Reconnect(format!("{message}; {e}"))),
        }
    }

    /// Run a row-returning statement and map every row through `handler`.
    ///
    /// # Errors
    /// Parse, binding and execution errors, plus anything `handler` returns.
    pub async fn execute_select<S, T, F>(
        &mut self,
        sql: &str,
        source: &S,
        handler: F,
    ) -> Result<Vec<T>, PgNamedError>
    where
        S: ParameterSource + ?Sized,
        F: FnMut(&ResultCursor) -> Result<T, PgNamedError>,
    {
        let call = prepare_call(sql, source)?;
        let result = self.execute_raw(&call.sql, &call.params).await?;
        collect_rows(result, handler)
    }

    /// Run a statement and return the affected-row count (0 when the server reports none).
    ///
    /// # Errors
    /// Parse, binding and execution errors.
    pub async fn execute_dml<S>(&mut self, sql: &str, source: &S) -> Result<u64, PgNamedError>
    where
        S: ParameterSource + ?Sized,
    {
        let call = prepare_call(sql, source)?;
        let result = self.execute_raw(&call.sql, &call.params).await?;
        Ok(result.rows_affected().unwrap_or(0))
    }

    /// `execute_select` with `(name, value)` pairs.
    ///
    /// # Errors
    /// See `execute_select`.
    pub async fn execute_select_map<T, F>(
        &mut self,
        sql: &str,
        params: &[(&str, SqlValue)],
        handler: F,
    ) -> Result<Vec<T>, PgNamedError>
    where
        F: FnMut(&ResultCursor) -> Result<T, PgNamedError>,
    {
        self.execute_select(sql, params, handler).await
    }

    /// `execute_dml` with `(name, value)` pairs.
    ///
    /// # Errors
    /// See `execute_dml`.
    pub async fn execute_dml_map(
        &mut self,
        sql: &str,
        params: &[(&str, SqlValue)],
    ) -> Result<u64, PgNamedError> {
        self.execute_dml(sql, params).await
    }

    /// Run a statement without parameters.
    ///
    /// # Errors
    /// Execution errors.
    pub async fn execute(&mut self, sql: &str) -> Result<u64, PgNamedError> {
        self.execute_dml(sql, &NoParams).await
    }

    /// Start a fluent query on this connection.
    pub fn query<'a>(&'a mut self, sql: &'a str) -> QueryBuilder<'a, C> {
        query(QueryTarget::Connection(self), sql)
    }

    /// Close the session. Later statements fail with `ConnectionError`.
    pub async fn close(&mut self) {
        if let Some(mut session) = self.session.take() {
            session.close().await;
        }
        self.state = ConnectionState::Closed;
        debug!(connection = self.id, "connection closed");
    }

    async fn reestablish(&mut self) -> Result<(), PgNamedError> {
        self.state = if self.state == ConnectionState::Fatal {
            ConnectionState::Reconnecting
        } else {
            ConnectionState::Connecting
        };
        match self.connector.connect().await {
            Ok(session) => {
                self.session = Some(session);
                self.state = ConnectionState::Ready;
                debug!(connection = self.id, "session established");
                Ok(())
            }
            Err(e) => {
                self.state = ConnectionState::Fatal;
                error!(connection = self.id, error = %e, "could not establish session");
                Err(e)
            }
        }
    }
}
