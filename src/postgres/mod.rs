// PostgreSQL transport over tokio-postgres
//
// - config: connection settings, connector and pool construction
// - params: `ToSql` for pre-encoded wire parameters
// - query: statement execution and text rendering of result cells
// - session: `Connector`/`Session` implementations and error classification

pub mod config;
pub mod params;
pub mod query;
pub mod session;

use crate::connection::Connection;
use crate::pool::ConnectionPool;

pub use config::PgConfig;
pub use session::{PgConnector, PgSession};

/// A reconnecting connection to a Postgres server.
pub type PgConnection = Connection<PgConnector>;

/// A pool of reconnecting Postgres connections.
pub type PgPool = ConnectionPool<PgConnector>;
