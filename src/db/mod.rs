//! # Database Module
//!
//! The seam between the request pipeline and a concrete SQL backend.
//! Everything above this module sees a [`Database`] trait object and the
//! tagged values in [`value`].

pub mod config;
pub mod postgres;
pub mod sqlite;
pub mod value;

use std::sync::Arc;

use thiserror::Error;

pub use config::{DatabaseConfig, DatabaseType};
pub use self::postgres::PostgresDatabase;
pub use sqlite::SqliteDatabase;
pub use value::{DbValue, Row, RowSet, Scalar, ValueError};

/// Result type for database operations
pub type DbResult<T> = Result<T, DbError>;

/// Database errors
#[derive(Debug, Error)]
pub enum DbError {
    /// Error reported by SQLite
    #[error("{0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Error reported by PostgreSQL or its client
    #[error("{0}")]
    Postgres(#[from] ::postgres::Error),

    /// A result column whose type has no JSON rendering
    #[error("unsupported column type {0}")]
    ColumnType(String),

    /// The configured type names no known backend
    #[error("Unsupported database type {0}")]
    UnsupportedType(String),

    /// A known backend whose driver is not part of this build
    #[error("no {0} driver is built into this binary")]
    NoDriver(DatabaseType),

    /// The driver cannot report this piece of information
    #[error("{0} is not supported by this driver")]
    Unsupported(&'static str),

    #[error("database connection is closed")]
    Closed,

    #[error("database connection lock poisoned")]
    Poisoned,

    /// The blocking worker running the statement died
    #[error("database worker failed: {0}")]
    Worker(String),
}

/// What a write statement reports back
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExecOutcome {
    pub rows_affected: Option<u64>,
    pub last_insert_id: Option<i64>,
}

impl ExecOutcome {
    pub fn rows_affected(&self) -> DbResult<u64> {
        self.rows_affected.ok_or(DbError::Unsupported("rows affected"))
    }

    pub fn last_insert_id(&self) -> DbResult<i64> {
        self.last_insert_id.ok_or(DbError::Unsupported("last insert id"))
    }
}

/// A live database handle
///
/// Implementations are shared across requests and must be safe for
/// concurrent use. Statements arrive already rendered for the backend's
/// placeholder dialect.
pub trait Database: Send + Sync {
    /// Backend family of this handle
    fn backend(&self) -> DatabaseType;

    /// Run a statement that returns rows
    fn query(&self, sql: &str, args: &[Scalar]) -> DbResult<RowSet>;

    /// Run a statement that modifies rows
    fn execute(&self, sql: &str, args: &[Scalar]) -> DbResult<ExecOutcome>;

    /// Release the underlying connection
    fn close(&self) -> DbResult<()>;
}

/// Open a database handle for `config`.
pub fn connect(config: &DatabaseConfig) -> DbResult<Arc<dyn Database>> {
    match &config.db_type {
        DatabaseType::Sqlite3 => Ok(Arc::new(SqliteDatabase::open(&config.build_dsn())?)),
        DatabaseType::Postgres => Ok(Arc::new(PostgresDatabase::connect(&config.build_dsn())?)),
        DatabaseType::Mysql => Err(DbError::NoDriver(DatabaseType::Mysql)),
        DatabaseType::Other(name) => Err(DbError::UnsupportedType(name.clone())),
    }
}
