//! SQLite backend built on rusqlite.

use std::sync::Mutex;

use rusqlite::types::{ToSqlOutput, Value as SqliteValue, ValueRef};
use rusqlite::{params_from_iter, Connection, ToSql};

use super::config::DatabaseType;
use super::value::{DbValue, RowSet, Scalar};
use super::{Database, DbError, DbResult, ExecOutcome};

impl ToSql for Scalar {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            Scalar::Null => ToSqlOutput::Owned(SqliteValue::Null),
            Scalar::Bool(b) => ToSqlOutput::Owned(SqliteValue::Integer(i64::from(*b))),
            Scalar::Integer(i) => ToSqlOutput::Owned(SqliteValue::Integer(*i)),
            Scalar::Real(f) => ToSqlOutput::Owned(SqliteValue::Real(*f)),
            Scalar::Text(s) => ToSqlOutput::Borrowed(ValueRef::Text(s.as_bytes())),
        })
    }
}

impl From<ValueRef<'_>> for DbValue {
    fn from(value: ValueRef<'_>) -> Self {
        match value {
            ValueRef::Null => DbValue::Null,
            ValueRef::Integer(i) => DbValue::Integer(i),
            ValueRef::Real(f) => DbValue::Real(f),
            ValueRef::Text(text) => DbValue::Text(String::from_utf8_lossy(text).into_owned()),
            ValueRef::Blob(bytes) => DbValue::Blob(bytes.to_vec()),
        }
    }
}

/// A single SQLite connection shared by every request
///
/// rusqlite connections are not `Sync`; the mutex serializes access and
/// keeps `execute` and `last_insert_rowid` paired.
pub struct SqliteDatabase {
    conn: Mutex<Option<Connection>>,
}

impl SqliteDatabase {
    /// Open `dsn`, either `:memory:` or a file path.
    pub fn open(dsn: &str) -> DbResult<Self> {
        let conn = if dsn == ":memory:" {
            Connection::open_in_memory()?
        } else {
            Connection::open(dsn)?
        };
        Ok(Self {
            conn: Mutex::new(Some(conn)),
        })
    }

    /// Run one or more `;`-separated statements with no arguments.
    pub fn execute_batch(&self, sql: &str) -> DbResult<()> {
        self.with_conn(|conn| Ok(conn.execute_batch(sql)?))
    }

    fn with_conn<T>(&self, f: impl FnOnce(&Connection) -> DbResult<T>) -> DbResult<T> {
        let guard = self.conn.lock().map_err(|_| DbError::Poisoned)?;
        match guard.as_ref() {
            Some(conn) => f(conn),
            None => Err(DbError::Closed),
        }
    }
}

impl Database for SqliteDatabase {
    fn backend(&self) -> DatabaseType {
        DatabaseType::Sqlite3
    }

    fn query(&self, sql: &str, args: &[Scalar]) -> DbResult<RowSet> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(sql)?;
            let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
            let width = columns.len();

            let mut rows = stmt.query(params_from_iter(args.iter()))?;
            let mut out = Vec::new();
            while let Some(row) = rows.next()? {
                let mut values = Vec::with_capacity(width);
                for i in 0..width {
                    values.push(DbValue::from(row.get_ref(i)?));
                }
                out.push(values);
            }

            Ok(RowSet { columns, rows: out })
        })
    }

    fn execute(&self, sql: &str, args: &[Scalar]) -> DbResult<ExecOutcome> {
        self.with_conn(|conn| {
            let affected = conn.execute(sql, params_from_iter(args.iter()))?;
            Ok(ExecOutcome {
                rows_affected: Some(affected as u64),
                last_insert_id: Some(conn.last_insert_rowid()),
            })
        })
    }

    fn close(&self) -> DbResult<()> {
        let mut guard = self.conn.lock().map_err(|_| DbError::Poisoned)?;
        match guard.take() {
            Some(conn) => conn.close().map_err(|(_, e)| DbError::from(e)),
            None => Ok(()),
        }
    }
}
