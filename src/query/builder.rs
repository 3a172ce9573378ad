//! # Query Compiler
//!
//! Turns a [`QuerySpec`] (plus a JSON body for writes) into SQL text with
//! `?` placeholders and the matching positional arguments. Placeholders
//! are rendered for the backend later, by [`Dialect::render`].
//!
//! [`Dialect::render`]: super::Dialect::render

use serde_json::{Map, Value};
use thiserror::Error;

use crate::db::{Scalar, ValueError};

use super::clause::{is_identifier, QuerySpec, ROW_KEY_COLUMN};

/// Compilation failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    #[error("a table name is required")]
    MissingTable,

    #[error("invalid table name: {0:?}")]
    InvalidTable(String),

    #[error("invalid column name: {0:?}")]
    InvalidColumn(String),

    #[error("update statements must have at least one column to set")]
    EmptySet,

    #[error("insert statements must have at least one column")]
    EmptyInsert,

    #[error("{0}")]
    Value(#[from] ValueError),
}

/// SQL text and its arguments, in placeholder order
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub sql: String,
    pub args: Vec<Scalar>,
}

impl Statement {
    fn new(sql: String) -> Self {
        Self {
            sql,
            args: Vec::new(),
        }
    }

    /// Append the WHERE clause for the row key and filters.
    fn push_where(&mut self, spec: &QuerySpec) -> Result<(), CompileError> {
        let mut predicates = Vec::with_capacity(spec.filters().len() + 1);

        if let Some(key) = spec.key() {
            predicates.push(format!("{} = ?", ROW_KEY_COLUMN));
            self.args.push(Scalar::from(key));
        }

        for (column, values) in spec.filters().iter() {
            let marks = vec!["?"; values.len()].join(", ");
            predicates.push(format!("{} IN ({})", column_name(column)?, marks));
            self.args.extend(values.iter().map(|v| Scalar::from(v.as_str())));
        }

        if !predicates.is_empty() {
            self.sql.push_str(" WHERE ");
            self.sql.push_str(&predicates.join(" AND "));
        }
        Ok(())
    }

    fn push_order_by(&mut self, spec: &QuerySpec) {
        if spec.order_by().is_empty() {
            return;
        }
        let terms: Vec<String> = spec.order_by().iter().map(ToString::to_string).collect();
        self.sql.push_str(" ORDER BY ");
        self.sql.push_str(&terms.join(", "));
    }

    fn push_limit(&mut self, spec: &QuerySpec) {
        if let Some(limit) = spec.limit() {
            self.sql.push_str(&format!(" LIMIT {}", limit));
        }
    }

    fn push_offset(&mut self, spec: &QuerySpec) {
        if let Some(offset) = spec.offset() {
            self.sql.push_str(&format!(" OFFSET {}", offset));
        }
    }
}

fn table_name(table: &str) -> Result<&str, CompileError> {
    match table {
        "" => Err(CompileError::MissingTable),
        table if is_identifier(table) => Ok(table),
        table => Err(CompileError::InvalidTable(table.to_string())),
    }
}

fn column_name(column: &str) -> Result<&str, CompileError> {
    if is_identifier(column) {
        Ok(column)
    } else {
        Err(CompileError::InvalidColumn(column.to_string()))
    }
}

fn table_of(spec: &QuerySpec) -> Result<&str, CompileError> {
    table_name(spec.table())
}

/// `SELECT * FROM t [WHERE …] [ORDER BY …] [LIMIT n] [OFFSET m]`
pub fn select(spec: &QuerySpec) -> Result<Statement, CompileError> {
    let mut stmt = Statement::new(format!("SELECT * FROM {}", table_of(spec)?));
    stmt.push_where(spec)?;
    stmt.push_order_by(spec);
    stmt.push_limit(spec);
    stmt.push_offset(spec);
    Ok(stmt)
}

/// `UPDATE t SET c = ?, … [WHERE …] [LIMIT n]`
///
/// SET clauses follow the body's key order.
pub fn update(spec: &QuerySpec, values: &Map<String, Value>) -> Result<Statement, CompileError> {
    let table = table_of(spec)?;
    if values.is_empty() {
        return Err(CompileError::EmptySet);
    }

    let mut sets = Vec::with_capacity(values.len());
    let mut args = Vec::with_capacity(values.len());
    for (column, value) in values {
        sets.push(format!("{} = ?", column_name(column)?));
        args.push(Scalar::from_json(column, value)?);
    }

    let mut stmt = Statement {
        sql: format!("UPDATE {} SET {}", table, sets.join(", ")),
        args,
    };
    stmt.push_where(spec)?;
    stmt.push_limit(spec);
    Ok(stmt)
}

/// `DELETE FROM t [WHERE …] [LIMIT n]`
pub fn delete(spec: &QuerySpec) -> Result<Statement, CompileError> {
    let mut stmt = Statement::new(format!("DELETE FROM {}", table_of(spec)?));
    stmt.push_where(spec)?;
    stmt.push_limit(spec);
    Ok(stmt)
}

/// `INSERT INTO t (c1,c2) VALUES (?,?)` for one flat object.
pub fn insert(table: &str, item: &Map<String, Value>) -> Result<Statement, CompileError> {
    let table = table_name(table)?;
    if item.is_empty() {
        return Err(CompileError::EmptyInsert);
    }

    let mut columns = Vec::with_capacity(item.len());
    let mut args = Vec::with_capacity(item.len());
    for (column, value) in item {
        columns.push(column_name(column)?);
        args.push(Scalar::from_json(column, value)?);
    }

    Ok(Statement {
        sql: format!(
            "INSERT INTO {} ({}) VALUES ({})",
            table,
            columns.join(","),
            vec!["?"; columns.len()].join(",")
        ),
        args,
    })
}
