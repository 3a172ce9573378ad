//! Statement Executor
//!
//! Runs compiled statements against the shared [`Database`] handle on
//! tokio's blocking pool, marshals result sets into [`Row`]s and
//! classifies failures.

use std::sync::Arc;

use serde_json::{Map, Value};

use crate::db::{Database, DbError, DbResult, ExecOutcome, Row, Scalar};
use crate::query::{builder, Dialect, Statement};

use super::error::{SqldError, SqldResult};

/// Message for a write that touched nothing
pub const NO_ROWS_MATCHED: &str = "no rows matched";

/// Executes statements for one database and placeholder dialect
#[derive(Clone)]
pub struct Executor {
    db: Arc<dyn Database>,
    dialect: Dialect,
}

impl Executor {
    pub fn new(db: Arc<dyn Database>, dialect: Dialect) -> Self {
        Self { db, dialect }
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    pub fn database(&self) -> &Arc<dyn Database> {
        &self.db
    }

    async fn blocking<T, F>(&self, f: F) -> DbResult<T>
    where
        F: FnOnce(&dyn Database) -> DbResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let db = Arc::clone(&self.db);
        tokio::task::spawn_blocking(move || f(db.as_ref()))
            .await
            .map_err(|e| DbError::Worker(e.to_string()))?
    }

    /// Run `sql` as given and marshal every row.
    pub async fn query_rows(&self, sql: String, args: Vec<Scalar>) -> DbResult<Vec<Row>> {
        let set = self.blocking(move |db| db.query(&sql, &args)).await?;
        Ok(set.into_rows())
    }

    /// Run `sql` as given and report what the backend says about it.
    pub async fn exec(&self, sql: String, args: Vec<Scalar>) -> DbResult<ExecOutcome> {
        self.blocking(move |db| db.execute(&sql, &args)).await
    }

    /// Release the database handle off the async workers.
    pub async fn close(&self) -> DbResult<()> {
        self.blocking(|db| db.close()).await
    }

    /// Run a compiled read. Any failure is an internal error.
    pub async fn read(&self, stmt: Statement) -> SqldResult<Vec<Row>> {
        let sql = self.dialect.render(&stmt.sql);
        self.query_rows(sql, stmt.args)
            .await
            .map_err(SqldError::internal)
    }

    /// Run a compiled write.
    ///
    /// Execution and affected-count failures are bad requests; a write that
    /// matched nothing is not found.
    pub async fn write(&self, stmt: Statement) -> SqldResult<()> {
        let sql = self.dialect.render(&stmt.sql);
        let outcome = self
            .exec(sql, stmt.args)
            .await
            .map_err(SqldError::bad_request)?;

        match outcome.rows_affected().map_err(SqldError::bad_request)? {
            0 => Err(SqldError::not_found(NO_ROWS_MATCHED)),
            _ => Ok(()),
        }
    }

    /// Insert one object and return it with its generated `id`.
    pub async fn create_single(&self, table: &str, mut item: Map<String, Value>) -> SqldResult<Row> {
        let stmt = builder::insert(table, &item)?;
        let sql = self.dialect.render(&stmt.sql);
        let outcome = self
            .exec(sql, stmt.args)
            .await
            .map_err(SqldError::bad_request)?;

        let id = outcome.last_insert_id().map_err(SqldError::bad_request)?;
        item.insert("id".to_string(), Value::from(id));
        Ok(item)
    }
}
