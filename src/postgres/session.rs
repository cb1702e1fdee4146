use async_trait::async_trait;
use tokio::task::JoinHandle;
use tokio_postgres::{Client, Config, NoTls};
use tracing::{debug, error};

use super::query::run_statement;
use crate::error::PgNamedError;
use crate::session::{Connector, ResultStatus, Session, TabularResult, WireParam};

/// Opens tokio-postgres sessions from a fixed configuration.
#[derive(Debug, Clone)]
pub struct PgConnector {
    config: Config,
}

impl PgConnector {
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self { config }
    }
}

#[async_trait]
impl Connector for PgConnector {
    type Session = PgSession;

    async fn connect(&self) -> Result<PgSession, PgNamedError> {
        let (client, connection) = self.config.connect(NoTls).await.map_err(|e| {
            PgNamedError::ConnectionError(format!("Failed to connect to Postgres: {e}"))
        })?;
        let task = tokio::spawn(async move {
            if let Err(e) = connection.await {
                error!(error = %e, "postgres connection task ended with an error");
            }
        });
        debug!("postgres session opened");
        Ok(PgSession {
            client: Some(client),
            task,
            last_error: None,
        })
    }
}

/// One tokio-postgres client plus the task driving its socket.
///
/// The task is aborted when the session is closed or dropped.
pub struct PgSession {
    client: Option<Client>,
    task: JoinHandle<()>,
    last_error: Option<String>,
}

impl std::fmt::Debug for PgSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PgSession")
            .field("open", &self.client.is_some())
            .field("last_error", &self.last_error)
            .finish_non_exhaustive()
    }
}

/// Server-side FATAL/PANIC, a closed socket and transport failures end the session.
fn classify(client: &Client, err: &tokio_postgres::Error) -> (ResultStatus, String) {
    if let Some(db) = err.as_db_error() {
        let fatal = matches!(db.severity(), "FATAL" | "PANIC");
        let message = format!("{}: {} ({})", db.severity(), db.message(), db.code().code());
        let status = if fatal || client.is_closed() {
            ResultStatus::FatalError
        } else {
            ResultStatus::NonfatalError
        };
        return (status, message);
    }
    let status = if err.is_closed() || client.is_closed() {
        ResultStatus::FatalError
    } else {
        ResultStatus::NonfatalError
    };
    (status, err.to_string())
}

#[async_trait]
impl Session for PgSession {
    async fn exec_params(&mut self, command: &str, params: &[WireParam]) -> TabularResult {
        let Some(client) = self.client.as_ref() else {
            let message = "session is closed".to_string();
            self.last_error = Some(message.clone());
            return TabularResult::error(ResultStatus::FatalError, message);
        };
        match run_statement(client, command, params).await {
            Ok(result) => {
                self.last_error = None;
                result
            }
            Err(e) => {
                let (status, message) = classify(client, &e);
                self.last_error = Some(message.clone());
                TabularResult::error(status, message)
            }
        }
    }

    fn last_error_message(&self) -> Option<String> {
        self.last_error.clone()
    }

    async fn close(&mut self) {
        self.client.take();
        self.task.abort();
    }
}

impl Drop for PgSession {
    fn drop(&mut self) {
        self.task.abort();
    }
}
