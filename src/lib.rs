//! Named-parameter SQL execution for PostgreSQL.
//!
//! Statements are written with `:name`, `&name` or `:{name}` placeholders, bound from a
//! [`params::ParameterSource`], rewritten to positional `$n` placeholders and executed on a
//! reconnecting [`connection::Connection`] or a [`pool::ConnectionPool`]. Rows come back
//! through a forward-only [`results::ResultCursor`] with typed getters.
//!
//! ```rust,no_run
//! use pg_named::prelude::*;
//!
//! # async fn demo() -> Result<(), PgNamedError> {
//! let config = PgConfig {
//!     host: Some("localhost".into()),
//!     dbname: Some("app".into()),
//!     user: Some("app".into()),
//!     password: Some("secret".into()),
//!     ..PgConfig::default()
//! };
//! let pool = config.connect_pool().await?;
//!
//! let source = MapParameterSource::new().with_value("one", "john");
//! let names = pool
//!     .execute_select("select name from t where name = :one", &source, |row| {
//!         row.get_string(0)
//!     })
//!     .await?;
//! # let _ = names;
//! # Ok(())
//! # }
//! ```

pub mod connection;
pub mod error;
pub mod executor;
pub mod params;
pub mod pool;
pub mod prelude;
pub mod query_builder;
pub mod results;
pub mod session;
pub mod translation;
pub mod types;

#[cfg(feature = "postgres")]
pub mod postgres;

pub use error::PgNamedError;
pub use executor::{PreparedCall, prepare_call, query};
