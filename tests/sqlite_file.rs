//! File-Backed Database Tests
//!
//! Tests against an on-disk SQLite database:
//! - Rows written through the API survive closing and reopening
//! - Closing is idempotent and later statements fail cleanly
//! - Configuration-driven connect opens the same file

use std::sync::Arc;

use serde_json::json;
use tempfile::TempDir;

use sqld::core::{AppContext, SqldError};
use sqld::db::{self, Database, DatabaseConfig, DatabaseType, DbError, SqliteDatabase};
use sqld::query::{builder, Dialect, FilterSet, QuerySpec};

// =============================================================================
// Helper Functions
// =============================================================================

fn setup_db() -> (TempDir, String) {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("sqld.db").to_str().unwrap().to_string();

    let db = SqliteDatabase::open(&path).unwrap();
    db.execute_batch("CREATE TABLE user(id INTEGER PRIMARY KEY, name TEXT, age INTEGER)")
        .unwrap();
    db.close().unwrap();

    (tmp, path)
}

fn context(path: &str) -> AppContext {
    AppContext::new(Arc::new(SqliteDatabase::open(path).unwrap()), Dialect::Question)
}

// =============================================================================
// Persistence Tests
// =============================================================================

#[tokio::test]
async fn test_rows_survive_reopen() {
    let (_tmp, path) = setup_db();

    let ctx = context(&path);
    let item = json!({"name": "jack", "age": 30});
    let row = ctx
        .executor()
        .create_single("user", item.as_object().unwrap().clone())
        .await
        .unwrap();
    assert_eq!(row["id"], 1);
    ctx.executor().database().close().unwrap();

    let ctx = context(&path);
    let spec = QuerySpec::new("user").with_filters(FilterSet::new().and("name", "jack"));
    let rows = ctx.executor().read(builder::select(&spec).unwrap()).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["age"], 30);
}

#[tokio::test]
async fn test_update_by_key_on_disk() {
    let (_tmp, path) = setup_db();
    let ctx = context(&path);
    ctx.executor()
        .create_single("user", json!({"name": "jill"}).as_object().unwrap().clone())
        .await
        .unwrap();

    let spec = QuerySpec::new("user").with_key("1");
    let values = json!({"name": "jack"});
    ctx.executor()
        .write(builder::update(&spec, values.as_object().unwrap()).unwrap())
        .await
        .unwrap();

    let missing = QuerySpec::new("user").with_key("8");
    let err = ctx
        .executor()
        .write(builder::update(&missing, values.as_object().unwrap()).unwrap())
        .await
        .unwrap_err();
    assert!(matches!(err, SqldError::NotFound(_)));

    let rows = ctx.executor().read(builder::select(&spec).unwrap()).await.unwrap();
    assert_eq!(rows[0]["name"], "jack");
}

// =============================================================================
// Lifecycle Tests
// =============================================================================

#[test]
fn test_close_is_idempotent() {
    let (_tmp, path) = setup_db();
    let db = SqliteDatabase::open(&path).unwrap();

    db.close().unwrap();
    db.close().unwrap();
    assert!(matches!(db.query("SELECT 1", &[]), Err(DbError::Closed)));
}

#[test]
fn test_connect_from_config() {
    let (_tmp, path) = setup_db();
    let config = DatabaseConfig {
        db_type: DatabaseType::Sqlite3,
        dsn: path,
        ..Default::default()
    };

    let handle = db::connect(&config).unwrap();
    let set = handle
        .query("SELECT name FROM sqlite_master WHERE type = 'table'", &[])
        .unwrap();
    let rows = set.into_rows();
    assert_eq!(rows[0]["name"], "user");
}
