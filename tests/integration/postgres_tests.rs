//! Integration tests for PgDatabase against a live server

use pgnav::config::{ConnectionConfig, ConnectionStore, SslMode};
use pgnav::db::{Catalog, CellValue, Database, PgDatabase, QueryOutcome};
use pgnav::error::DbError;
use pgnav::registry::ConnectionRegistry;

/// Get test database connection config
fn test_config() -> ConnectionConfig {
    ConnectionConfig {
        name: "integration-test".to_string(),
        host: std::env::var("PGNAV_TEST_HOST").unwrap_or_else(|_| "localhost".to_string()),
        port: std::env::var("PGNAV_TEST_PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(5432),
        database: std::env::var("PGNAV_TEST_DB").unwrap_or_else(|_| "postgres".to_string()),
        username: std::env::var("PGNAV_TEST_USER").unwrap_or_else(|_| "postgres".to_string()),
        password: std::env::var("PGNAV_TEST_PASSWORD").unwrap_or_else(|_| "postgres".to_string()),
        ssl_mode: SslMode::Disable,
    }
}

/// Connect, or None when the server isn't there (the test then skips)
async fn try_connect() -> Option<PgDatabase> {
    let config = test_config();
    match PgDatabase::connect(&config).await {
        Ok(db) => Some(db),
        Err(e) => {
            eprintln!(
                "Skipping test: database not available at {}:{} - {}",
                config.host, config.port, e
            );
            None
        }
    }
}

#[tokio::test]
async fn test_connect_failure_is_descriptive() {
    let mut config = test_config();
    config.host = "host.invalid".to_string();
    match PgDatabase::connect(&config).await {
        Err(DbError::ConnectionFailed(msg)) => assert!(!msg.is_empty()),
        Err(other) => panic!("expected ConnectionFailed, got {:?}", other),
        Ok(_) => panic!("connect to host.invalid should fail"),
    }
}

#[tokio::test]
async fn test_execute_select_one() {
    let Some(db) = try_connect().await else { return };

    let outcome = db.execute("SELECT 1").await.unwrap();
    let QueryOutcome::Rows(result) = outcome else {
        panic!("SELECT should produce rows");
    };
    assert_eq!(result.rows.len(), 1);
    assert_eq!(result.columns.len(), 1);
    match &result.rows[0].values[0] {
        CellValue::Integer(n) => assert_eq!(*n, 1),
        other => panic!("expected Integer, got {:?}", other),
    }

    // Mapping mode: same value, addressed by the driver's column name
    let mapped = db.execute_mapping("SELECT 1").await.unwrap();
    let col = mapped.columns[0].name.clone();
    assert_eq!(mapped.value(0, &col).and_then(CellValue::as_i64), Some(1));
}

#[tokio::test]
async fn test_command_reports_affected_rows() {
    let Some(db) = try_connect().await else { return };

    db.execute("CREATE TEMP TABLE pgnav_cmd_test (id integer, label text)")
        .await
        .unwrap();

    let outcome = db
        .execute("INSERT INTO pgnav_cmd_test VALUES (1, 'a'), (2, 'b')")
        .await
        .unwrap();
    match outcome {
        QueryOutcome::Command { affected } => assert_eq!(affected, 2),
        other => panic!("expected Command, got {:?}", other),
    }

    // The inserted rows are visible afterwards
    let count = match db
        .execute("SELECT count(*) FROM pgnav_cmd_test")
        .await
        .unwrap()
    {
        QueryOutcome::Rows(rs) => rs.rows[0].values[0].as_i64(),
        _ => None,
    };
    assert_eq!(count, Some(2));
}

#[tokio::test]
async fn test_error_mentions_object_and_session_recovers() {
    let Some(db) = try_connect().await else { return };

    let err = db
        .execute("SELECT * FROM pgnav_nonexistent_table")
        .await
        .unwrap_err();
    match &err {
        DbError::QueryFailed(msg) => {
            assert!(msg.contains("pgnav_nonexistent_table"), "got: {}", msg)
        }
        other => panic!("expected QueryFailed, got {:?}", other),
    }

    // Rollback restored the session
    assert!(db.execute("SELECT 1").await.is_ok());
}

#[tokio::test]
async fn test_close_is_idempotent_and_blocks_queries() {
    let Some(mut db) = try_connect().await else { return };

    db.close().await;
    db.close().await;
    assert!(!db.is_connected());
    assert!(matches!(
        db.execute("SELECT 1").await,
        Err(DbError::NotConnected)
    ));
}

#[tokio::test]
async fn test_schema_listing_excludes_system_schemas() {
    let Some(db) = try_connect().await else { return };

    let schemas = db.schemas().await.unwrap();
    assert!(schemas.iter().any(|s| s == "public"));
    assert!(schemas.iter().all(|s| !s.starts_with("pg_")));
    assert!(schemas.iter().all(|s| s != "information_schema"));
    assert!(schemas.iter().all(|s| s != "crdb_internal"));

    let mut sorted = schemas.clone();
    sorted.sort();
    assert_eq!(schemas, sorted);
}

#[tokio::test]
async fn test_catalog_against_created_objects() {
    let Some(db) = try_connect().await else { return };

    // Temp schema objects so the run leaves no residue
    db.execute("DROP TABLE IF EXISTS pgnav_itest").await.unwrap();
    db.execute("CREATE TABLE pgnav_itest (id integer PRIMARY KEY, note text)")
        .await
        .unwrap();

    let tables = db.tables("public").await.unwrap();
    assert!(tables.iter().any(|t| t == "pgnav_itest"));

    let columns = db.table_columns("public", "pgnav_itest").await.unwrap();
    assert_eq!(columns.len(), 2);
    assert_eq!(columns[0].name, "id");
    assert_eq!(columns[0].data_type, "integer");
    assert!(!columns[0].nullable);
    assert!(columns[1].nullable);

    db.execute("INSERT INTO pgnav_itest VALUES (1, NULL), (2, 'x')")
        .await
        .unwrap();
    assert_eq!(db.table_row_count("public", "pgnav_itest").await.unwrap(), 2);

    let page = db.table_rows("public", "pgnav_itest", 1, 1).await.unwrap();
    assert_eq!(page.rows.len(), 1);

    // Index DDL for the primary key index exists and is normalized
    let ddl = db.index_ddl("public", "pgnav_itest_pkey").await.unwrap();
    assert!(ddl.starts_with("CREATE UNIQUE INDEX"));

    let missing = db.view_ddl("public", "pgnav_missing_view").await.unwrap_err();
    assert_eq!(missing.to_string(), "view pgnav_missing_view not found");

    db.execute("DROP TABLE pgnav_itest").await.unwrap();
}

#[tokio::test]
async fn test_registry_round_trip_live() {
    let config = test_config();
    if PgDatabase::connect(&config).await.is_err() {
        eprintln!("Skipping test: database not available");
        return;
    }

    let dir = tempfile::tempdir().unwrap();
    let store = ConnectionStore::new(dir.path().join("connections.json"));
    let mut registry: ConnectionRegistry<PgDatabase> = ConnectionRegistry::new(store.clone());

    registry.add(config.clone()).await.unwrap();
    assert_eq!(registry.active_name(), Some("integration-test"));
    assert!(registry.get_active().unwrap().is_connected());

    // A fresh registry over the same store reconnects from the saved record
    let mut reloaded: ConnectionRegistry<PgDatabase> = ConnectionRegistry::new(store);
    reloaded.load_saved().await;
    assert_eq!(reloaded.active_name(), Some("integration-test"));

    registry.close_all().await;
    reloaded.close_all().await;
}
