//! Forward-only typed access to a statement result.
//!
//! Cells are decoded from the Postgres text output format; the transport adapter renders
//! binary cells to text first, so every getter has a single decoding path.

mod decode;

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde_json::Value as JsonValue;

use crate::error::PgNamedError;
use crate::session::TabularResult;
use crate::types::{Oid, ParamFormat};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Position {
    BeforeFirst,
    Row(usize),
    AfterLast,
}

/// Cursor over the rows of one `TabularResult`.
///
/// The cursor starts before the first row; call `next` before reading columns. Getters
/// return `Ok(None)` for SQL NULL.
/// ```rust
/// use pg_named::results::ResultCursor;
/// use pg_named::session::{ColumnInfo, TabularResult};
/// use pg_named::types::oid;
///
/// let result = TabularResult::tuples(
///     vec![ColumnInfo::new("name", oid::TEXT)],
///     vec![vec![Some(b"john".to_vec())]],
/// );
/// let mut cursor = ResultCursor::new(result);
/// while cursor.next() {
///     assert_eq!(cursor.get_string(0).unwrap().as_deref(), Some("john"));
/// }
/// ```
#[derive(Debug)]
pub struct ResultCursor {
    result: TabularResult,
    position: Position,
}

impl ResultCursor {
    #[must_use]
    pub fn new(result: TabularResult) -> Self {
        Self {
            result,
            position: Position::BeforeFirst,
        }
    }

    /// Advance to the next row. Returns `false`, leaving the cursor after the last row,
    /// once the rows are exhausted.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> bool {
        let next = match self.position {
            Position::BeforeFirst => 0,
            Position::Row(row) => row + 1,
            Position::AfterLast => return false,
        };
        if next < self.result.row_count() {
            self.position = Position::Row(next);
            true
        } else {
            self.position = Position::AfterLast;
            false
        }
    }

    #[must_use]
    pub fn row_count(&self) -> usize {
        self.result.row_count()
    }

    #[must_use]
    pub fn column_count(&self) -> usize {
        self.result.column_count()
    }

    #[must_use]
    pub fn column_name(&self, col: usize) -> Option<&str> {
        self.result.column(col).map(|c| c.name.as_str())
    }

    #[must_use]
    pub fn column_type(&self, col: usize) -> Option<Oid> {
        self.result.column(col).map(|c| c.type_oid)
    }

    /// Index of the first column called `name`.
    #[must_use]
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.result.columns().iter().position(|c| c.name == name)
    }

    #[must_use]
    pub fn rows_affected(&self) -> Option<u64> {
        self.result.rows_affected()
    }

    /// Whether the current row's cell is SQL NULL.
    ///
    /// # Errors
    /// `NoCurrentRow` outside a row, `ColumnValue` for an out-of-range column.
    pub fn is_null(&self, col: usize) -> Result<bool, PgNamedError> {
        Ok(self.cell(col)?.is_none())
    }

    /// # Errors
    /// `ColumnValue` when the cell is not valid UTF-8 or only has a binary form.
    pub fn get_string(&self, col: usize) -> Result<Option<String>, PgNamedError> {
        Ok(self.text(col)?.map(str::to_string))
    }

    /// True only for the engine's `t` token.
    ///
    /// # Errors
    /// `NoCurrentRow` outside a row, `ColumnValue` for an out-of-range column.
    pub fn get_boolean(&self, col: usize) -> Result<Option<bool>, PgNamedError> {
        Ok(self.cell(col)?.map(|raw| raw == b"t"))
    }

    /// # Errors
    /// `ColumnValue` when the text is not a valid `i16`.
    pub fn get_short(&self, col: usize) -> Result<Option<i16>, PgNamedError> {
        self.parse(col)
    }

    /// # Errors
    /// `ColumnValue` when the text is not a valid `i32`.
    pub fn get_int(&self, col: usize) -> Result<Option<i32>, PgNamedError> {
        self.parse(col)
    }

    /// # Errors
    /// `ColumnValue` when the text is not a valid `i64`.
    pub fn get_long(&self, col: usize) -> Result<Option<i64>, PgNamedError> {
        self.parse(col)
    }

    /// Accepts `NaN`, `Infinity` and `-Infinity`.
    ///
    /// # Errors
    /// `ColumnValue` when the text is not a float.
    pub fn get_float(&self, col: usize) -> Result<Option<f32>, PgNamedError> {
        self.parse(col)
    }

    /// # Errors
    /// `ColumnValue` when the text is not a float.
    pub fn get_double(&self, col: usize) -> Result<Option<f64>, PgNamedError> {
        self.parse(col)
    }

    /// Raw cell bytes, uninterpreted.
    ///
    /// # Errors
    /// `NoCurrentRow` outside a row, `ColumnValue` for an out-of-range column.
    pub fn get_bytes(&self, col: usize) -> Result<Option<Vec<u8>>, PgNamedError> {
        Ok(self.cell(col)?.map(<[u8]>::to_vec))
    }

    /// Decoded content of a bytea column. Text cells must use the `\x` hex form; binary
    /// cells are returned as-is.
    ///
    /// # Errors
    /// `ColumnValue` when the text is not hex output.
    pub fn get_bytea(&self, col: usize) -> Result<Option<Vec<u8>>, PgNamedError> {
        let Some(raw) = self.cell(col)? else {
            return Ok(None);
        };
        if self.format(col) == ParamFormat::Binary {
            return Ok(Some(raw.to_vec()));
        }
        decode::parse_bytea_hex(raw)
            .map(Some)
            .map_err(|message| PgNamedError::column(col, message))
    }

    /// # Errors
    /// `ColumnValue` when the text is not `YYYY-MM-DD`.
    pub fn get_date(&self, col: usize) -> Result<Option<NaiveDate>, PgNamedError> {
        self.decode_with(col, decode::parse_date)
    }

    /// # Errors
    /// `ColumnValue` when the text is not `HH:MM:SS[.f]`.
    pub fn get_time(&self, col: usize) -> Result<Option<NaiveTime>, PgNamedError> {
        self.decode_with(col, decode::parse_time)
    }

    /// Timestamp without time zone.
    ///
    /// # Errors
    /// `ColumnValue` when the text is not a timestamp.
    pub fn get_local_date_time(&self, col: usize) -> Result<Option<NaiveDateTime>, PgNamedError> {
        self.decode_with(col, decode::parse_local_date_time)
    }

    /// Timestamp with time zone, normalized to UTC.
    ///
    /// # Errors
    /// `ColumnValue` when the text has no parseable offset.
    pub fn get_instant(&self, col: usize) -> Result<Option<DateTime<Utc>>, PgNamedError> {
        self.decode_with(col, decode::parse_instant)
    }

    /// # Errors
    /// `ColumnValue` when the text is not JSON.
    pub fn get_json(&self, col: usize) -> Result<Option<JsonValue>, PgNamedError> {
        self.decode_with(col, |text| {
            serde_json::from_str(text).map_err(|e| format!("invalid json: {e}"))
        })
    }

    fn cell(&self, col: usize) -> Result<Option<&[u8]>, PgNamedError> {
        let row = match self.position {
            Position::Row(row) => row,
            Position::BeforeFirst => {
                return Err(PgNamedError::NoCurrentRow(
                    "cursor is before the first row; call next() first".to_string(),
                ));
            }
            Position::AfterLast => {
                return Err(PgNamedError::NoCurrentRow(
                    "cursor is after the last row".to_string(),
                ));
            }
        };
        if col >= self.result.column_count() {
            return Err(PgNamedError::column(
                col,
                format!(
                    "column index out of range (result has {} columns)",
                    self.result.column_count()
                ),
            ));
        }
        Ok(self.result.value(row, col))
    }

    fn format(&self, col: usize) -> ParamFormat {
        self.result
            .column(col)
            .map_or(ParamFormat::Text, |c| c.format)
    }

    fn text(&self, col: usize) -> Result<Option<&str>, PgNamedError> {
        let cell = self.cell(col)?;
        if cell.is_some() && self.format(col) == ParamFormat::Binary {
            let type_oid = self.column_type(col).unwrap_or_default();
            return Err(PgNamedError::column(
                col,
                format!("type oid {type_oid} has no text form; use get_bytes"),
            ));
        }
        cell.map(|raw| {
            std::str::from_utf8(raw)
                .map_err(|e| PgNamedError::column(col, format!("invalid utf-8: {e}")))
        })
        .transpose()
    }

    fn parse<T>(&self, col: usize) -> Result<Option<T>, PgNamedError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        self.decode_with(col, |text| {
            text.parse::<T>()
                .map_err(|e| format!("cannot parse '{text}': {e}"))
        })
    }

    fn decode_with<T>(
        &self,
        col: usize,
        decode: impl FnOnce(&str) -> Result<T, String>,
    ) -> Result<Option<T>, PgNamedError> {
        self.text(col)?
            .map(|text| decode(text).map_err(|message| PgNamedError::column(col, message)))
            .transpose()
    }
}
