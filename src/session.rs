//! Transport boundary between the statement layer and a live Postgres session.
//!
//! `Connector` opens sessions, `Session` runs one parameterized statement and reports a
//! libpq-style `TabularResult`. The tokio-postgres implementation lives in
//! `crate::postgres`; tests supply in-memory fakes.

use async_trait::async_trait;

use crate::error::PgNamedError;
use crate::types::{Oid, ParamFormat};

/// One positional parameter as sent over the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WireParam {
    /// `None` sends SQL NULL.
    pub value: Option<Vec<u8>>,
    pub type_oid: Oid,
    pub format: ParamFormat,
}

impl WireParam {
    #[must_use]
    pub fn text(value: impl Into<String>, type_oid: Oid) -> Self {
        Self {
            value: Some(value.into().into_bytes()),
            type_oid,
            format: ParamFormat::Text,
        }
    }

    #[must_use]
    pub fn binary(value: Vec<u8>, type_oid: Oid) -> Self {
        Self {
            value: Some(value),
            type_oid,
            format: ParamFormat::Binary,
        }
    }

    #[must_use]
    pub fn null(type_oid: Oid) -> Self {
        Self {
            value: None,
            type_oid,
            format: ParamFormat::Text,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnInfo {
    pub name: String,
    pub type_oid: Oid,
    pub format: ParamFormat,
}

impl ColumnInfo {
    #[must_use]
    pub fn new(name: impl Into<String>, type_oid: Oid) -> Self {
        Self {
            name: name.into(),
            type_oid,
            format: ParamFormat::Text,
        }
    }
}

/// Outcome of a statement, mirroring the libpq result status codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultStatus {
    EmptyQuery,
    CommandOk,
    TuplesOk,
    CopyOut,
    CopyIn,
    BadResponse,
    NonfatalError,
    /// The statement failed and the session can no longer be used.
    FatalError,
}

impl ResultStatus {
    #[must_use]
    pub fn is_success(self) -> bool {
        matches!(
            self,
            ResultStatus::TuplesOk | ResultStatus::CommandOk | ResultStatus::CopyIn
        )
    }
}

/// A fully materialized statement result: column metadata plus raw cells.
///
/// Text-format cells hold the Postgres text output of the value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabularResult {
    status: ResultStatus,
    columns: Vec<ColumnInfo>,
    rows: Vec<Vec<Option<Vec<u8>>>>,
    rows_affected: Option<u64>,
    error_message: Option<String>,
}

impl TabularResult {
    /// Result of a row-returning statement.
    #[must_use]
    pub fn tuples(columns: Vec<ColumnInfo>, rows: Vec<Vec<Option<Vec<u8>>>>) -> Self {
        let rows_affected = Some(rows.len() as u64);
        Self {
            status: ResultStatus::TuplesOk,
            columns,
            rows,
            rows_affected,
            error_message: None,
        }
    }

    /// Result of a statement that returns no rows.
    #[must_use]
    pub fn command(rows_affected: Option<u64>) -> Self {
        Self {
            status: ResultStatus::CommandOk,
            columns: Vec::new(),
            rows: Vec::new(),
            rows_affected,
            error_message: None,
        }
    }

    /// A failed statement with the given (non-success) status.
    #[must_use]
    pub fn error(status: ResultStatus, message: impl Into<String>) -> Self {
        Self {
            status,
            columns: Vec::new(),
            rows: Vec::new(),
            rows_affected: None,
            error_message: Some(message.into()),
        }
    }

    #[must_use]
    pub fn status(&self) -> ResultStatus {
        self.status
    }

    #[must_use]
    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    #[must_use]
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    #[must_use]
    pub fn columns(&self) -> &[ColumnInfo] {
        &self.columns
    }

    #[must_use]
    pub fn column(&self, col: usize) -> Option<&ColumnInfo> {
        self.columns.get(col)
    }

    /// Out-of-range cells count as null.
    #[must_use]
    pub fn is_null(&self, row: usize, col: usize) -> bool {
        self.value(row, col).is_none()
    }

    #[must_use]
    pub fn value(&self, row: usize, col: usize) -> Option<&[u8]> {
        self.rows.get(row)?.get(col)?.as_deref()
    }

    /// Affected-row count reported by the server, when there is one.
    #[must_use]
    pub fn rows_affected(&self) -> Option<u64> {
        self.rows_affected
    }
}

/// A single open database session.
#[async_trait]
pub trait Session: Send {
    /// Run one statement with positional `$n` parameters.
    ///
    /// Failures are reported through the result status, never as `Err`; the session
    /// keeps the message for `last_error_message`.
    async fn exec_params(&mut self, command: &str, params: &[WireParam]) -> TabularResult;

    fn last_error_message(&self) -> Option<String>;

    async fn close(&mut self);
}

/// Opens new sessions; shared by a connection so it can reconnect.
#[async_trait]
pub trait Connector: Send + Sync + 'static {
    type Session: Session + 'static;

    async fn connect(&self) -> Result<Self::Session, PgNamedError>;
}
