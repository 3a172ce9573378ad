//! Raw Query Passthrough
//!
//! Operator-enabled execution of literal SQL. Statements run verbatim,
//! with no arguments and no placeholder rendering.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::db::Row;

use super::error::{SqldError, SqldResult};
use super::executor::Executor;

/// Request body for raw mode: exactly one of `read` or `write`
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RawQuery {
    #[serde(default, rename = "read")]
    pub read_query: String,

    #[serde(default, rename = "write")]
    pub write_query: String,
}

/// Outcome of a raw write
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RawWriteResult {
    pub last_insert_id: i64,
    pub rows_affected: u64,
}

/// What a raw query produced
#[derive(Debug, Clone, PartialEq)]
pub enum RawOutcome {
    Rows(Vec<Row>),
    Written(RawWriteResult),
}

impl RawOutcome {
    pub fn into_json(self) -> Value {
        match self {
            RawOutcome::Rows(rows) => Value::Array(rows.into_iter().map(Value::Object).collect()),
            RawOutcome::Written(result) => serde_json::json!({
                "last_insert_id": result.last_insert_id,
                "rows_affected": result.rows_affected,
            }),
        }
    }
}

impl RawQuery {
    /// Execute the query. Every failure is a bad request.
    pub async fn run(self, executor: &Executor) -> SqldResult<RawOutcome> {
        match (self.read_query.is_empty(), self.write_query.is_empty()) {
            (false, true) => executor
                .query_rows(self.read_query, Vec::new())
                .await
                .map(RawOutcome::Rows)
                .map_err(SqldError::bad_request),
            (true, false) => {
                let outcome = executor
                    .exec(self.write_query, Vec::new())
                    .await
                    .map_err(SqldError::bad_request)?;
                Ok(RawOutcome::Written(RawWriteResult {
                    last_insert_id: outcome.last_insert_id.unwrap_or_default(),
                    rows_affected: outcome.rows_affected.unwrap_or_default(),
                }))
            }
            (false, false) => Err(SqldError::bad_request(
                "a raw query takes either \"read\" or \"write\", not both",
            )),
            (true, true) => Err(SqldError::bad_request(
                "a raw query needs a \"read\" or \"write\" statement",
            )),
        }
    }
}
