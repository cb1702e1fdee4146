use chrono::SecondsFormat;
use tracing::trace;

use super::ParameterSource;
use crate::error::PgNamedError;
use crate::session::WireParam;
use crate::translation::ParsedSql;
use crate::types::{Oid, SqlValue};

/// A value bound to one positional placeholder.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundValue {
    /// Parameter name the value came from.
    pub name: String,
    pub value: SqlValue,
    pub type_oid: Oid,
}

impl BoundValue {
    /// Encode for the wire. Byte arrays go out in binary format, everything else as the
    /// Postgres text representation.
    pub fn to_wire(&self) -> Result<WireParam, PgNamedError> {
        let text = match &self.value {
            SqlValue::Null => return Ok(WireParam::null(self.type_oid)),
            SqlValue::Bytes(bytes) => return Ok(WireParam::binary(bytes.clone(), self.type_oid)),
            SqlValue::Bool(b) => if *b { "true" } else { "false" }.to_string(),
            SqlValue::Int(v) => v.to_string(),
            SqlValue::BigInt(v) => v.to_string(),
            SqlValue::Float(v) => float_text(f64::from(*v), v.to_string()),
            SqlValue::Double(v) => float_text(*v, v.to_string()),
            SqlValue::Text(s) => s.clone(),
            SqlValue::Date(d) => d.format("%Y-%m-%d").to_string(),
            SqlValue::Time(t) => t.format("%H:%M:%S%.f").to_string(),
            SqlValue::Timestamp(ts) => ts.format("%Y-%m-%d %H:%M:%S%.f").to_string(),
            SqlValue::TimestampTz(ts) => ts.to_rfc3339_opts(SecondsFormat::AutoSi, false),
            SqlValue::Json(v) => serde_json::to_string(v).map_err(|e| {
                PgNamedError::UnsupportedParameterType {
                    name: self.name.clone(),
                    shape: format!("json: {e}"),
                }
            })?,
            SqlValue::List(_) | SqlValue::Tuple(_) => {
                return Err(PgNamedError::UnsupportedParameterType {
                    name: self.name.clone(),
                    shape: self.value.shape().to_string(),
                });
            }
        };
        Ok(WireParam::text(text, self.type_oid))
    }
}

// Postgres spells the special values differently from Rust's Display.
fn float_text(v: f64, finite: String) -> String {
    if v.is_nan() {
        "NaN".to_string()
    } else if v.is_infinite() {
        if v > 0.0 { "Infinity" } else { "-Infinity" }.to_string()
    } else {
        finite
    }
}

/// Resolve every occurrence of `parsed` against `source`, in placeholder order.
///
/// The result lines up one-to-one with the `$n` placeholders produced by
/// `substitute_named_parameters`: list values contribute one entry per element and tuple
/// elements one entry per member. The type of each entry is the one declared in the
/// source, falling back to the type inferred from the value.
///
/// # Errors
/// - `InvalidParameterUsage` when the statement mixes named and `?` placeholders
/// - `MissingParameter` when a name has no value in `source`
/// - `UnsupportedParameterType` for nested lists and tuples outside a list
pub fn build_value_array<S>(parsed: &ParsedSql, source: &S) -> Result<Vec<BoundValue>, PgNamedError>
where
    S: ParameterSource + ?Sized,
{
    if parsed.named_parameter_count() > 0 && parsed.unnamed_parameter_count() > 0 {
        return Err(PgNamedError::InvalidParameterUsage(format!(
            "Not allowed to mix named and traditional ? placeholders. You have {} named parameter(s) and {} traditional placeholder(s) in statement: {}",
            parsed.named_parameter_count(),
            parsed.unnamed_parameter_count(),
            parsed.original_sql()
        )));
    }

    let mut values = Vec::with_capacity(parsed.occurrences().len());
    for name in parsed.parameter_names() {
        let Some(value) = source.value(name) else {
            return Err(PgNamedError::MissingParameter {
                name: name.to_string(),
            });
        };
        let declared = source.sql_type(name);
        match value {
            SqlValue::List(items) => {
                for item in items {
                    match item {
                        SqlValue::Tuple(members) => {
                            for member in members {
                                push_scalar(&mut values, name, member, declared)?;
                            }
                        }
                        other => push_scalar(&mut values, name, other, declared)?,
                    }
                }
            }
            other => push_scalar(&mut values, name, other, declared)?,
        }
    }
    trace!(count = values.len(), "bound parameter values");
    Ok(values)
}

fn push_scalar(
    values: &mut Vec<BoundValue>,
    name: &str,
    value: &SqlValue,
    declared: Option<Oid>,
) -> Result<(), PgNamedError> {
    let Some(inferred) = value.inferred_oid() else {
        return Err(PgNamedError::UnsupportedParameterType {
            name: name.to_string(),
            shape: value.shape().to_string(),
        });
    };
    values.push(BoundValue {
        name: name.to_string(),
        value: value.clone(),
        type_oid: declared.unwrap_or(inferred),
    });
    Ok(())
}
