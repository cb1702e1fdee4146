use thiserror::Error;

#[derive(Debug, Error)]
pub enum PgNamedError {
    #[cfg(feature = "postgres")]
    #[error(transparent)]
    PostgresError(#[from] tokio_postgres::Error),

    /// Malformed placeholder syntax. `position` is the byte offset in the raw SQL.
    #[error("SQL parse error at position {position}: {message}")]
    Parse { position: usize, message: String },

    #[error("Invalid parameter usage: {0}")]
    InvalidParameterUsage(String),

    #[error("No value supplied for the SQL parameter '{name}'")]
    MissingParameter { name: String },

    #[error("Unsupported parameter type for '{name}': {shape}")]
    UnsupportedParameterType { name: String, shape: String },

    /// The statement failed but the session is still usable (bad grammar, constraint violation).
    #[error("SQL execution error: {0}")]
    Statement(String),

    /// The session failed fatally; it has already been re-established for the next call.
    #[error("Connection lost: {0}")]
    ConnectionLost(String),

    /// The session failed fatally and could not be re-established.
    #[error("Reconnect failed: {0}")]
    Reconnect(String),

    #[error("Error getting column {column} value: {message}")]
    ColumnValue { column: usize, message: String },

    #[error("Cursor error: {0}")]
    NoCurrentRow(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Pool error: {0}")]
    PoolError(String),
}

impl PgNamedError {
    pub(crate) fn column(column: usize, message: impl Into<String>) -> Self {
        PgNamedError::ColumnValue {
            column,
            message: message.into(),
        }
    }

    /// True when the underlying session was lost, whether or not it came back.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            PgNamedError::ConnectionLost(_)
                | PgNamedError::Reconnect(_)
                | PgNamedError::ConnectionError(_)
        )
    }

    /// True when repeating the same call may succeed without changing the statement.
    ///
    /// A lost connection has been replaced by the time the error reaches the caller, so
    /// the next attempt runs on a fresh session.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            PgNamedError::ConnectionLost(_) | PgNamedError::PoolError(_)
        )
    }
}

impl From<deadpool::unmanaged::PoolError> for PgNamedError {
    fn from(err: deadpool::unmanaged::PoolError) -> Self {
        PgNamedError::PoolError(format!("connection pool error: {err}"))
    }
}
