use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde_json::Value as JsonValue;

/// Postgres type identifier.
pub type Oid = u32;

/// Oid for "let the server infer the type".
pub const TYPE_UNKNOWN: Oid = 0;

pub mod oid {
    use super::Oid;

    pub const BOOL: Oid = 16;
    pub const BYTEA: Oid = 17;
    pub const NAME: Oid = 19;
    pub const INT8: Oid = 20;
    pub const INT2: Oid = 21;
    pub const INT4: Oid = 23;
    pub const TEXT: Oid = 25;
    pub const OID: Oid = 26;
    pub const JSON: Oid = 114;
    pub const FLOAT4: Oid = 700;
    pub const FLOAT8: Oid = 701;
    pub const BPCHAR: Oid = 1042;
    pub const VARCHAR: Oid = 1043;
    pub const DATE: Oid = 1082;
    pub const TIME: Oid = 1083;
    pub const TIMESTAMP: Oid = 1114;
    pub const TIMESTAMPTZ: Oid = 1184;
    pub const NUMERIC: Oid = 1700;
    pub const UUID: Oid = 2950;
    pub const JSONB: Oid = 3802;
}

/// Name of a known type identifier, used for diagnostics.
#[must_use]
pub fn type_name(id: Oid) -> Option<&'static str> {
    let name = match id {
        oid::BOOL => "bool",
        oid::BYTEA => "bytea",
        oid::NAME => "name",
        oid::INT8 => "int8",
        oid::INT2 => "int2",
        oid::INT4 => "int4",
        oid::TEXT => "text",
        oid::OID => "oid",
        oid::JSON => "json",
        oid::FLOAT4 => "float4",
        oid::FLOAT8 => "float8",
        oid::BPCHAR => "bpchar",
        oid::VARCHAR => "varchar",
        oid::DATE => "date",
        oid::TIME => "time",
        oid::TIMESTAMP => "timestamp",
        oid::TIMESTAMPTZ => "timestamptz",
        oid::NUMERIC => "numeric",
        oid::UUID => "uuid",
        oid::JSONB => "jsonb",
        _ => return None,
    };
    Some(name)
}

/// Wire encoding of a parameter or result column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParamFormat {
    #[default]
    Text,
    Binary,
}

/// Values that can be bound to a named parameter.
///
/// `List` expands to a comma-separated run of placeholders (`IN (:ids)`); a list of
/// `Tuple`s expands to parenthesized groups (`(a, b) IN (:pairs)`).
/// ```rust
/// use pg_named::prelude::*;
///
/// let ids = SqlValue::List(vec![SqlValue::BigInt(1), SqlValue::BigInt(2)]);
/// let pairs = SqlValue::List(vec![
///     SqlValue::Tuple(vec!["john".into(), 35.into()]),
///     SqlValue::Tuple(vec!["ann".into(), 50.into()]),
/// ]);
/// # let _ = (ids, pairs);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Null,
    Bool(bool),
    Bytes(Vec<u8>),
    Int(i32),
    BigInt(i64),
    Float(f32),
    Double(f64),
    Text(String),
    Date(NaiveDate),
    Time(NaiveTime),
    Timestamp(NaiveDateTime),
    TimestampTz(DateTime<Utc>),
    Json(JsonValue),
    List(Vec<SqlValue>),
    Tuple(Vec<SqlValue>),
}

impl SqlValue {
    /// Build a `List` from anything convertible into values.
    pub fn list<I, T>(values: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<SqlValue>,
    {
        SqlValue::List(values.into_iter().map(Into::into).collect())
    }

    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Short name of the runtime shape, used in error messages.
    #[must_use]
    pub fn shape(&self) -> &'static str {
        match self {
            SqlValue::Null => "null",
            SqlValue::Bool(_) => "bool",
            SqlValue::Bytes(_) => "bytes",
            SqlValue::Int(_) => "i32",
            SqlValue::BigInt(_) => "i64",
            SqlValue::Float(_) => "f32",
            SqlValue::Double(_) => "f64",
            SqlValue::Text(_) => "text",
            SqlValue::Date(_) => "date",
            SqlValue::Time(_) => "time",
            SqlValue::Timestamp(_) => "timestamp",
            SqlValue::TimestampTz(_) => "timestamptz",
            SqlValue::Json(_) => "json",
            SqlValue::List(_) => "list",
            SqlValue::Tuple(_) => "tuple",
        }
    }

    /// Type identifier inferred from the runtime shape. `None` for collections.
    #[must_use]
    pub fn inferred_oid(&self) -> Option<Oid> {
        let id = match self {
            SqlValue::Null => TYPE_UNKNOWN,
            SqlValue::Bool(_) => oid::BOOL,
            SqlValue::Bytes(_) => oid::BYTEA,
            SqlValue::Int(_) => oid::INT4,
            SqlValue::BigInt(_) => oid::INT8,
            SqlValue::Float(_) => oid::FLOAT4,
            SqlValue::Double(_) => oid::FLOAT8,
            SqlValue::Text(_) => oid::TEXT,
            SqlValue::Date(_) => oid::DATE,
            SqlValue::Time(_) => oid::TIME,
            SqlValue::Timestamp(_) => oid::TIMESTAMP,
            SqlValue::TimestampTz(_) => oid::TIMESTAMPTZ,
            SqlValue::Json(_) => oid::JSONB,
            SqlValue::List(_) | SqlValue::Tuple(_) => return None,
        };
        Some(id)
    }
}

impl std::fmt::Display for SqlValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SqlValue::Null => f.write_str("null"),
            SqlValue::Bool(b) => write!(f, "{b}"),
            SqlValue::Bytes(bytes) => write!(f, "\\x{}", hex::encode(bytes)),
            SqlValue::Int(i) => write!(f, "{i}"),
            SqlValue::BigInt(i) => write!(f, "{i}"),
            SqlValue::Float(v) => write!(f, "{v}"),
            SqlValue::Double(v) => write!(f, "{v}"),
            SqlValue::Text(s) => f.write_str(s),
            SqlValue::Date(d) => write!(f, "{d}"),
            SqlValue::Time(t) => write!(f, "{t}"),
            SqlValue::Timestamp(ts) => write!(f, "{ts}"),
            SqlValue::TimestampTz(ts) => write!(f, "{ts}"),
            SqlValue::Json(v) => write!(f, "{v}"),
            SqlValue::List(items) | SqlValue::Tuple(items) => {
                let (open, close) = if matches!(self, SqlValue::List(_)) {
                    ('[', ']')
                } else {
                    ('(', ')')
                };
                write!(f, "{open}")?;
                for (idx, item) in items.iter().enumerate() {
                    if idx > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "{close}")
            }
        }
    }
}

macro_rules! impl_from_scalar {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for SqlValue {
                fn from(value: $ty) -> Self {
                    SqlValue::$variant(value)
                }
            }
        )*
    };
}

impl_from_scalar! {
    bool => Bool,
    Vec<u8> => Bytes,
    i32 => Int,
    i64 => BigInt,
    f32 => Float,
    f64 => Double,
    String => Text,
    NaiveDate => Date,
    NaiveTime => Time,
    NaiveDateTime => Timestamp,
    DateTime<Utc> => TimestampTz,
    JsonValue => Json,
}

impl From<i16> for SqlValue {
    fn from(value: i16) -> Self {
        SqlValue::Int(i32::from(value))
    }
}

impl From<&str> for SqlValue {
    fn from(value: &str) -> Self {
        SqlValue::Text(value.to_string())
    }
}

impl From<&[u8]> for SqlValue {
    fn from(value: &[u8]) -> Self {
        SqlValue::Bytes(value.to_vec())
    }
}

impl<T: Into<SqlValue>> From<Option<T>> for SqlValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(SqlValue::Null, Into::into)
    }
}
