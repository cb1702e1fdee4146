use std::error::Error;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use futures_util::{TryStreamExt, pin_mut};
use rust_decimal::Decimal;
use serde_json::Value;
use tokio_postgres::Client;
use tokio_postgres::types::{FromSql, Type};

use super::params::param_type;
use crate::session::{ColumnInfo, TabularResult, WireParam};
use crate::types::ParamFormat;

/// Any cell, as the raw bytes the server sent.
struct RawCell<'a>(&'a [u8]);

impl<'a> FromSql<'a> for RawCell<'a> {
    fn from_sql(_ty: &Type, raw: &'a [u8]) -> Result<Self, Box<dyn Error + Sync + Send>> {
        Ok(RawCell(raw))
    }

    fn accepts(_ty: &Type) -> bool {
        true
    }
}

/// Prepare `sql` with the parameter types of `params`, run it and materialize every row.
///
/// # Errors
/// Returns the tokio-postgres error from preparation, execution or row decoding.
pub(crate) async fn run_statement(
    client: &Client,
    sql: &str,
    params: &[WireParam],
) -> Result<TabularResult, tokio_postgres::Error> {
    let types: Vec<Type> = params.iter().map(|p| param_type(p.type_oid)).collect();
    let stmt = client.prepare_typed(sql, &types).await?;
    let columns: Vec<ColumnInfo> = stmt
        .columns()
        .iter()
        .map(|col| ColumnInfo {
            name: col.name().to_string(),
            type_oid: col.type_().oid(),
            format: column_format(col.type_()),
        })
        .collect();

    let stream = client.query_raw(&stmt, params.iter()).await?;
    pin_mut!(stream);
    let mut rows = Vec::new();
    while let Some(row) = stream.try_next().await? {
        let mut cells = Vec::with_capacity(columns.len());
        for idx in 0..columns.len() {
            cells.push(postgres_extract_text(&row, idx)?);
        }
        rows.push(cells);
    }

    if columns.is_empty() {
        Ok(TabularResult::command(stream.rows_affected()))
    } else {
        Ok(TabularResult::tuples(columns, rows))
    }
}

fn column_format(ty: &Type) -> ParamFormat {
    match *ty {
        Type::BOOL
        | Type::INT2
        | Type::INT4
        | Type::INT8
        | Type::OID
        | Type::FLOAT4
        | Type::FLOAT8
        | Type::TEXT
        | Type::VARCHAR
        | Type::BPCHAR
        | Type::NAME
        | Type::UNKNOWN
        | Type::BYTEA
        | Type::DATE
        | Type::TIME
        | Type::TIMESTAMP
        | Type::TIMESTAMPTZ
        | Type::JSON
        | Type::JSONB
        | Type::NUMERIC
        | Type::UUID => ParamFormat::Text,
        _ => ParamFormat::Binary,
    }
}

// NaN and the infinities are flagged in the sign word of the binary header.
fn numeric_special(raw: &[u8]) -> Option<&'static str> {
    match raw.get(4..6)? {
        [0xC0, 0x00] => Some("NaN"),
        [0xD0, 0x00] => Some("Infinity"),
        [0xF0, 0x00] => Some("-Infinity"),
        _ => None,
    }
}

fn float_text(v: f64, finite: impl FnOnce() -> String) -> String {
    if v.is_nan() {
        "NaN".to_string()
    } else if v.is_infinite() {
        if v > 0.0 { "Infinity" } else { "-Infinity" }.to_string()
    } else {
        finite()
    }
}

/// Render the cell at `idx` in the server's default text output form.
///
/// Types without a text rendering here keep their binary wire bytes, and their column is
/// marked `ParamFormat::Binary` so the text getters refuse them.
///
/// # Errors
/// Returns `tokio_postgres::Error` if the column cannot be retrieved.
pub(crate) fn postgres_extract_text(
    row: &tokio_postgres::Row,
    idx: usize,
) -> Result<Option<Vec<u8>>, tokio_postgres::Error> {
    let type_info = row.columns()[idx].type_();

    let text = match *type_info {
        Type::BOOL => {
            let val: Option<bool> = row.try_get(idx)?;
            val.map(|b| if b { "t" } else { "f" }.to_string())
        }
        Type::INT2 => {
            let val: Option<i16> = row.try_get(idx)?;
            val.map(|v| v.to_string())
        }
        Type::INT4 => {
            let val: Option<i32> = row.try_get(idx)?;
            val.map(|v| v.to_string())
        }
        Type::INT8 => {
            let val: Option<i64> = row.try_get(idx)?;
            val.map(|v| v.to_string())
        }
        Type::OID => {
            let val: Option<u32> = row.try_get(idx)?;
            val.map(|v| v.to_string())
        }
        Type::FLOAT4 => {
            let val: Option<f32> = row.try_get(idx)?;
            val.map(|v| float_text(f64::from(v), || v.to_string()))
        }
        Type::FLOAT8 => {
            let val: Option<f64> = row.try_get(idx)?;
            val.map(|v| float_text(v, || v.to_string()))
        }
        Type::TEXT | Type::VARCHAR | Type::BPCHAR | Type::NAME | Type::UNKNOWN => {
            row.try_get::<_, Option<String>>(idx)?
        }
        Type::BYTEA => {
            let val: Option<Vec<u8>> = row.try_get(idx)?;
            val.map(|b| format!("\\x{}", hex::encode(b)))
        }
        Type::DATE => {
            let val: Option<NaiveDate> = row.try_get(idx)?;
            val.map(|d| d.format("%Y-%m-%d").to_string())
        }
        Type::TIME => {
            let val: Option<NaiveTime> = row.try_get(idx)?;
            val.map(|t| t.format("%H:%M:%S%.f").to_string())
        }
        Type::TIMESTAMP => {
            let val: Option<NaiveDateTime> = row.try_get(idx)?;
            val.map(|ts| ts.format("%Y-%m-%d %H:%M:%S%.f").to_string())
        }
        Type::TIMESTAMPTZ => {
            let val: Option<DateTime<Utc>> = row.try_get(idx)?;
            val.map(|ts| ts.format("%Y-%m-%d %H:%M:%S%.f+00").to_string())
        }
        Type::NUMERIC => {
            let raw: Option<RawCell<'_>> = row.try_get(idx)?;
            match raw.map(|cell| numeric_special(cell.0)) {
                None => None,
                Some(Some(special)) => Some(special.to_string()),
                Some(None) => {
                    let val: Option<Decimal> = row.try_get(idx)?;
                    val.map(|d| d.to_string())
                }
            }
        }
        Type::UUID => {
            let val: Option<uuid::Uuid> = row.try_get(idx)?;
            val.map(|u| u.hyphenated().to_string())
        }
        Type::JSON | Type::JSONB => {
            let val: Option<Value> = row.try_get(idx)?;
            val.map(|v| v.to_string())
        }
        _ => {
            let val: Option<RawCell<'_>> = row.try_get(idx)?;
            return Ok(val.map(|cell| cell.0.to_vec()));
        }
    };
    Ok(text.map(String::into_bytes))
}
