use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio_postgres::Config;

use super::session::PgConnector;
use super::{PgConnection, PgPool};
use crate::connection::Connection;
use crate::error::PgNamedError;
use crate::pool::ConnectionPool;

fn default_port() -> u16 {
    5432
}

fn default_pool_size() -> usize {
    20
}

/// Connection settings for a Postgres server.
///
/// ```rust
/// use pg_named::postgres::PgConfig;
///
/// let config: PgConfig = serde_json::from_str(
///     r#"{"host": "localhost", "dbname": "app", "user": "app", "password": "secret"}"#,
/// ).unwrap();
/// assert_eq!(config.port, 5432);
/// assert_eq!(config.pool_size, 20);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Clone, Serialize, Deserialize)]
pub struct PgConfig {
    pub host: Option<String>,
    #[serde(default = "default_port")]
    pub port: u16,
    pub dbname: Option<String>,
    pub user: Option<String>,
    #[serde(default, skip_serializing)]
    pub password: Option<String>,
    #[serde(default = "default_pool_size")]
    pub pool_size: usize,
    #[serde(default)]
    pub application_name: Option<String>,
    #[serde(default)]
    pub connect_timeout_secs: Option<u64>,
}

impl Default for PgConfig {
    fn default() -> Self {
        Self {
            host: None,
            port: default_port(),
            dbname: None,
            user: None,
            password: None,
            pool_size: default_pool_size(),
            application_name: None,
            connect_timeout_secs: None,
        }
    }
}

impl std::fmt::Debug for PgConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PgConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("dbname", &self.dbname)
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("pool_size", &self.pool_size)
            .field("application_name", &self.application_name)
            .field("connect_timeout_secs", &self.connect_timeout_secs)
            .finish()
    }
}

impl PgConfig {
    /// Check that every required field is present.
    ///
    /// # Errors
    /// Returns `PgNamedError::ConfigError` naming the first missing field.
    pub fn validate(&self) -> Result<(), PgNamedError> {
        if self.dbname.is_none() {
            return Err(PgNamedError::ConfigError(
                "dbname is required".to_string(),
            ));
        }
        if self.host.is_none() {
            return Err(PgNamedError::ConfigError(
                "host is required".to_string(),
            ));
        }
        if self.user.is_none() {
            return Err(PgNamedError::ConfigError(
                "user is required".to_string(),
            ));
        }
        if self.password.is_none() {
            return Err(PgNamedError::ConfigError(
                "password is required".to_string(),
            ));
        }
        if self.pool_size == 0 {
            return Err(PgNamedError::ConfigError(
                "pool_size must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Build the tokio-postgres configuration.
    ///
    /// # Errors
    /// Returns `PgNamedError::ConfigError` if validation fails.
    pub fn to_tokio_config(&self) -> Result<Config, PgNamedError> {
        self.validate()?;
        let mut config = Config::new();
        if let Some(host) = &self.host {
            config.host(host);
        }
        config.port(self.port);
        if let Some(dbname) = &self.dbname {
            config.dbname(dbname);
        }
        if let Some(user) = &self.user {
            config.user(user);
        }
        if let Some(password) = &self.password {
            config.password(password);
        }
        if let Some(name) = &self.application_name {
            config.application_name(name);
        }
        if let Some(secs) = self.connect_timeout_secs {
            config.connect_timeout(Duration::from_secs(secs));
        }
        Ok(config)
    }

    /// # Errors
    /// Returns `PgNamedError::ConfigError` if validation fails.
    pub fn connector(&self) -> Result<PgConnector, PgNamedError> {
        Ok(PgConnector::new(self.to_tokio_config()?))
    }

    /// Open a single reconnecting connection.
    ///
    /// # Errors
    /// Configuration errors, or `ConnectionError` when the server cannot be reached.
    pub async fn connect_unit(&self) -> Result<PgConnection, PgNamedError> {
        Connection::open(Arc::new(self.connector()?)).await
    }

    /// Open `pool_size` connections and pool them.
    ///
    /// # Errors
    /// Configuration errors, or `ConnectionError` when the server cannot be reached.
    pub async fn connect_pool(&self) -> Result<PgPool, PgNamedError> {
        ConnectionPool::open(self.connector()?, self.pool_size).await
    }
}
