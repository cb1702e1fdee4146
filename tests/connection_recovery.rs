mod common;

use std::sync::Arc;
use std::sync::atomic::Ordering;

use common::{FakeConnector, names, table, text};
use pg_named::prelude::*;
use pg_named::session::{ResultStatus, TabularResult};
use tokio::runtime::Runtime;

#[test]
fn select_by_named_parameter() -> Result<(), Box<dyn std::error::Error>> {
    let rt = Runtime::new()?;
    rt.block_on(async {
        let mut conn = Connection::open(Arc::new(table(&["john", "ann"]))).await?;
        let sql = "select name from t where name = :one";

        let found = conn
            .execute_select_map(sql, &[("one", "john".into())], |row| row.get_string(0))
            .await?;
        assert_eq!(found, [Some("john".to_string())]);

        let source = MapParameterSource::new().with_value("one", "missing");
        let found = conn
            .execute_select(sql, &source, |row| row.get_string(0))
            .await?;
        assert!(found.is_empty());
        Ok::<_, PgNamedError>(())
    })?;
    Ok(())
}

#[test]
fn fatal_error_is_followed_by_a_fresh_session() -> Result<(), Box<dyn std::error::Error>> {
    let rt = Runtime::new()?;
    rt.block_on(async {
        let connector = FakeConnector::new(|session, _, _| {
            if session == 1 {
                TabularResult::error(
                    ResultStatus::FatalError,
                    "FATAL: terminating connection due to administrator command",
                )
            } else {
                names(&["fresh"])
            }
        });
        let probe = Arc::clone(&connector.probe);
        let mut conn = Connection::open(Arc::new(connector)).await?;

        let err = conn
            .execute_select("select name from t", &NoParams, |row| row.get_string(0))
            .await
            .unwrap_err();
        match &err {
            PgNamedError::ConnectionLost(message) => {
                assert!(message.contains("administrator command"));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(err.is_fatal());
        assert!(err.is_retryable());
        assert_eq!(probe.connects(), 2);
        assert_eq!(conn.state(), ConnectionState::Ready);

        let rows = conn
            .execute_select("select name from t", &NoParams, |row| row.get_string(0))
            .await?;
        assert_eq!(rows, [Some("fresh".to_string())]);
        assert_eq!(probe.connects(), 2);
        Ok::<_, PgNamedError>(())
    })?;
    Ok(())
}

#[test]
fn failed_reconnect_retries_on_next_call() -> Result<(), Box<dyn std::error::Error>> {
    let rt = Runtime::new()?;
    rt.block_on(async {
        let connector = FakeConnector::new(|session, _, _| {
            if session == 1 {
                TabularResult::error(ResultStatus::FatalError, "server closed the connection")
            } else {
                TabularResult::command(Some(1))
            }
        });
        let probe = Arc::clone(&connector.probe);
        let mut conn = Connection::open(Arc::new(connector)).await?;

        probe.refuse_connect.store(true, Ordering::SeqCst);
        let err = conn.execute("delete from t").await.unwrap_err();
        assert!(matches!(err, PgNamedError::Reconnect(_)));
        assert_eq!(conn.state(), ConnectionState::Fatal);

        probe.refuse_connect.store(false, Ordering::SeqCst);
        assert_eq!(conn.execute("delete from t").await?, 1);
        assert_eq!(conn.state(), ConnectionState::Ready);
        assert_eq!(probe.connects(), 2);
        Ok::<_, PgNamedError>(())
    })?;
    Ok(())
}

#[test]
fn statement_errors_keep_the_session() -> Result<(), Box<dyn std::error::Error>> {
    let rt = Runtime::new()?;
    rt.block_on(async {
        let connector = table(&["john"]);
        let probe = Arc::clone(&connector.probe);
        let mut conn = Connection::open(Arc::new(connector)).await?;

        let err = conn.execute("selec name from t").await.unwrap_err();
        match &err {
            PgNamedError::Statement(message) => assert!(message.contains("syntax error")),
            other => panic!("unexpected error: {other}"),
        }
        assert!(!err.is_fatal());
        assert_eq!(probe.connects(), 1);
        assert_eq!(conn.state(), ConnectionState::Ready);
        Ok::<_, PgNamedError>(())
    })?;
    Ok(())
}

#[test]
fn binding_errors_never_reach_the_server() -> Result<(), Box<dyn std::error::Error>> {
    let rt = Runtime::new()?;
    rt.block_on(async {
        let connector = table(&["john"]);
        let probe = Arc::clone(&connector.probe);
        let mut conn = Connection::open(Arc::new(connector)).await?;

        let err = conn
            .execute_dml_map("update t set name = :name where id = ?", &[("name", "x".into())])
            .await
            .unwrap_err();
        assert!(matches!(err, PgNamedError::InvalidParameterUsage(_)));

        let err = conn
            .execute_dml_map("update t set name = :name", &[("other", "x".into())])
            .await
            .unwrap_err();
        assert!(matches!(err, PgNamedError::MissingParameter { ref name } if name == "name"));

        let err = conn
            .execute_dml_map("update t set name = :{name", &[("name", "x".into())])
            .await
            .unwrap_err();
        assert!(matches!(err, PgNamedError::Parse { position: 20, .. }));

        assert!(probe.completed().is_empty());
        Ok::<_, PgNamedError>(())
    })?;
    Ok(())
}

#[test]
fn empty_maps_still_require_every_named_value() -> Result<(), Box<dyn std::error::Error>> {
    let rt = Runtime::new()?;
    rt.block_on(async {
        let connector = table(&["john"]);
        let probe = Arc::clone(&connector.probe);
        let mut conn = Connection::open(Arc::new(connector)).await?;

        let err = conn
            .execute_select(
                "select name from t where name = :one",
                &MapParameterSource::new(),
                |row| row.get_string(0),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, PgNamedError::MissingParameter { ref name } if name == "one"));

        let err = conn
            .execute_dml_map("update t set a = :a where b = ?", &[])
            .await
            .unwrap_err();
        assert!(matches!(err, PgNamedError::InvalidParameterUsage(_)));

        assert!(probe.completed().is_empty());
        Ok::<_, PgNamedError>(())
    })?;
    Ok(())
}

#[test]
fn statements_without_parameters_are_sent_verbatim() -> Result<(), Box<dyn std::error::Error>> {
    let rt = Runtime::new()?;
    rt.block_on(async {
        let connector = FakeConnector::new(|_, _, params| {
            assert!(params.is_empty());
            TabularResult::command(Some(0))
        });
        let probe = Arc::clone(&connector.probe);
        let mut conn = Connection::open(Arc::new(connector)).await?;

        let sql = "update t set doc = doc - 'k' where doc ? 'k' and note = ':later'";
        conn.execute(sql).await?;
        conn.execute_dml(sql, &MapParameterSource::new()).await?;
        assert_eq!(probe.completed(), [sql, sql]);
        Ok::<_, PgNamedError>(())
    })?;
    Ok(())
}

#[test]
fn lists_expand_into_positional_parameters() -> Result<(), Box<dyn std::error::Error>> {
    let rt = Runtime::new()?;
    rt.block_on(async {
        let connector = FakeConnector::new(|_, sql, params| {
            assert_eq!(sql, "update t set seen = $1 where id in ($2, $3, $4)");
            let values: Vec<Option<&str>> = params.iter().map(text).collect();
            assert_eq!(
                values,
                [Some("true"), Some("1"), Some("2"), Some("3")]
            );
            TabularResult::command(Some(3))
        });
        let mut conn = Connection::open(Arc::new(connector)).await?;

        let affected = conn
            .query("update t set seen = :seen where id in (:ids)")
            .param("seen", true)
            .param("ids", SqlValue::list([1i64, 2, 3]))
            .dml()
            .await?;
        assert_eq!(affected, 3);
        Ok::<_, PgNamedError>(())
    })?;
    Ok(())
}

#[test]
fn closed_connections_refuse_work() -> Result<(), Box<dyn std::error::Error>> {
    let rt = Runtime::new()?;
    rt.block_on(async {
        let mut conn = Connection::open(Arc::new(table(&[]))).await?;
        conn.close().await;
        assert_eq!(conn.state(), ConnectionState::Closed);
        let err = conn.execute("select name from t").await.unwrap_err();
        assert!(matches!(err, PgNamedError::ConnectionError(_)));
        Ok::<_, PgNamedError>(())
    })?;
    Ok(())
}
