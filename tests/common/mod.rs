#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use pg_named::prelude::*;
use pg_named::session::{ColumnInfo, ResultStatus, TabularResult, WireParam};
use pg_named::types::oid;

/// Answers a statement: `(session number, sql, params)`.
pub type Responder = Arc<dyn Fn(usize, &str, &[WireParam]) -> TabularResult + Send + Sync>;

/// Counters shared by a connector and every session it opens.
#[derive(Default)]
pub struct Probe {
    pub connects: AtomicUsize,
    pub in_flight: AtomicUsize,
    pub max_in_flight: AtomicUsize,
    pub refuse_connect: AtomicBool,
    /// Statements in completion order.
    pub completed: Mutex<Vec<String>>,
}

impl Probe {
    pub fn connects(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    pub fn completed(&self) -> Vec<String> {
        self.completed.lock().unwrap().clone()
    }
}

pub struct FakeConnector {
    pub probe: Arc<Probe>,
    responder: Responder,
    delay: Duration,
}

impl FakeConnector {
    pub fn new(
        responder: impl Fn(usize, &str, &[WireParam]) -> TabularResult + Send + Sync + 'static,
    ) -> Self {
        Self {
            probe: Arc::new(Probe::default()),
            responder: Arc::new(responder),
            delay: Duration::ZERO,
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

#[async_trait]
impl Connector for FakeConnector {
    type Session = FakeSession;

    async fn connect(&self) -> Result<FakeSession, PgNamedError> {
        if self.probe.refuse_connect.load(Ordering::SeqCst) {
            return Err(PgNamedError::ConnectionError(
                "connection refused".to_string(),
            ));
        }
        let number = self.probe.connects.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(FakeSession {
            number,
            probe: Arc::clone(&self.probe),
            responder: Arc::clone(&self.responder),
            delay: self.delay,
            last_error: None,
            closed: false,
        })
    }
}

pub struct FakeSession {
    number: usize,
    probe: Arc<Probe>,
    responder: Responder,
    delay: Duration,
    last_error: Option<String>,
    closed: bool,
}

#[async_trait]
impl Session for FakeSession {
    async fn exec_params(&mut self, command: &str, params: &[WireParam]) -> TabularResult {
        assert!(!self.closed, "statement sent on a closed session");
        let now = self.probe.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.probe.max_in_flight.fetch_max(now, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        let result = (self.responder)(self.number, command, params);
        self.probe
            .completed
            .lock()
            .unwrap()
            .push(command.to_string());
        self.probe.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.last_error = result.error_message().map(str::to_string);
        result
    }

    fn last_error_message(&self) -> Option<String> {
        self.last_error.clone()
    }

    async fn close(&mut self) {
        self.closed = true;
    }
}

pub fn text(param: &WireParam) -> Option<&str> {
    param
        .value
        .as_deref()
        .map(|raw| std::str::from_utf8(raw).unwrap())
}

/// One-column `name` result.
pub fn names(rows: &[&str]) -> TabularResult {
    TabularResult::tuples(
        vec![ColumnInfo::new("name", oid::TEXT)],
        rows.iter()
            .map(|name| vec![Some(name.as_bytes().to_vec())])
            .collect(),
    )
}

/// Emulates `t(name)` holding the given rows; understands the lookup by name, a plain
/// scan and DML statements.
pub fn table(rows: &'static [&'static str]) -> FakeConnector {
    FakeConnector::new(move |_, sql, params| match sql {
        "select name from t where name = $1" => {
            let wanted = params.first().and_then(text);
            let hits: Vec<&str> = rows
                .iter()
                .copied()
                .filter(|name| Some(*name) == wanted)
                .collect();
            names(&hits)
        }
        "select name from t" => names(rows),
        _ if sql.starts_with("update") || sql.starts_with("delete") => {
            TabularResult::command(Some(params.len() as u64))
        }
        _ => TabularResult::error(
            ResultStatus::NonfatalError,
            format!("ERROR: syntax error at or near \"{sql}\""),
        ),
    })
}
