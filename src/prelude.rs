//! Convenient imports for common functionality.

pub use crate::connection::{Connection, ConnectionState};
pub use crate::error::PgNamedError;
pub use crate::executor::{PreparedCall, QueryTarget, prepare_call, query};
pub use crate::params::{MapParameterSource, NoParams, ParameterSource};
pub use crate::pool::{ConnectionPool, PoolStatus, PooledConnection};
pub use crate::query_builder::QueryBuilder;
pub use crate::results::ResultCursor;
pub use crate::session::{Connector, Session};
pub use crate::translation::{ParsedSql, parse_sql, substitute_named_parameters};
pub use crate::types::{Oid, SqlValue};

#[cfg(feature = "postgres")]
pub use crate::postgres::{PgConfig, PgConnection, PgConnector, PgPool};
