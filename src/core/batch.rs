//! Batch Insert Coordinator
//!
//! Fans a list of create payloads out to one task per item and fans the
//! outcomes back in. Items fail independently; nothing is retried.

use serde::Serialize;
use serde_json::{json, Value};
use tokio::task::JoinSet;

use crate::db::value::json_kind;
use crate::db::{Row, ValueError};
use crate::observability::{Event, Logger};

use super::error::{SqldError, SqldResult};
use super::executor::Executor;

/// Created rows and per-item failures, both in completion order
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BatchResult {
    #[serde(rename = "objects")]
    pub created: Vec<Row>,
    pub errors: Vec<String>,
}

impl BatchResult {
    /// True when every item was created
    pub fn is_complete(&self) -> bool {
        self.errors.is_empty()
    }

    /// Response body: a plain array on full success, otherwise
    /// `{"errors": [...], "objects": [...]}`.
    pub fn into_json(self) -> Value {
        if self.is_complete() {
            Value::Array(self.created.into_iter().map(Value::Object).collect())
        } else {
            json!({
                "errors": self.errors,
                "objects": self.created,
            })
        }
    }
}

async fn create_item(executor: Executor, table: String, item: Value) -> SqldResult<Row> {
    match item {
        Value::Object(map) => executor.create_single(&table, map).await,
        other => Err(SqldError::from(ValueError::NotAnObject(json_kind(&other)))),
    }
}

/// Insert every item of `items` into `table` concurrently.
///
/// Waits for all items before returning.
pub async fn create_many(executor: &Executor, table: &str, items: Vec<Value>) -> BatchResult {
    let mut units = JoinSet::new();
    for (index, item) in items.into_iter().enumerate() {
        let unit = create_item(executor.clone(), table.to_string(), item);
        units.spawn(async move { (index, unit.await) });
    }

    let mut result = BatchResult::default();
    while let Some(joined) = units.join_next().await {
        match joined {
            Ok((_, Ok(row))) => result.created.push(row),
            Ok((index, Err(err))) => {
                let item = index.to_string();
                let reason = err.to_string();
                Logger::warn(
                    Event::BatchItemFailed.as_str(),
                    &[("table", table), ("item", item.as_str()), ("reason", reason.as_str())],
                );
                result.errors.push(format!("item {}: {}", index, err));
            }
            Err(join_err) => result.errors.push(join_err.to_string()),
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::db::SqliteDatabase;
    use crate::query::Dialect;

    fn executor() -> Executor {
        let db = SqliteDatabase::open(":memory:").unwrap();
        db.execute_batch("CREATE TABLE t1(id INTEGER PRIMARY KEY, a, b)")
            .unwrap();
        Executor::new(Arc::new(db), Dialect::Question)
    }

    #[tokio::test]
    async fn test_all_items_created() {
        let exec = executor();
        let items = vec![json!({"a": 1}), json!({"a": 2}), json!({"a": 3})];

        let result = create_many(&exec, "t1", items).await;
        assert!(result.is_complete());
        assert_eq!(result.created.len(), 3);

        let mut ids: Vec<i64> = result
            .created
            .iter()
            .map(|row| row["id"].as_i64().unwrap())
            .collect();
        ids.sort();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_failures_are_isolated() {
        let exec = executor();
        let items = vec![json!({"a": "b"}), json!({"c": "d"}), json!({"b": "f"})];

        let result = create_many(&exec, "t1", items).await;
        assert_eq!(result.created.len(), 2);
        assert_eq!(result.errors.len(), 1);
        assert!(result.errors[0].starts_with("item 1:"));
    }

    #[tokio::test]
    async fn test_non_object_item_is_an_error() {
        let exec = executor();
        let result = create_many(&exec, "t1", vec![json!({"a": 1}), json!(7)]).await;
        assert_eq!(result.created.len(), 1);
        assert!(result.errors[0].contains("a number"));
    }

    #[test]
    fn test_response_shape() {
        let ok = BatchResult {
            created: vec![Row::new()],
            errors: vec![],
        };
        assert!(ok.into_json().is_array());

        let partial = BatchResult {
            created: vec![Row::new()],
            errors: vec!["boom".into()],
        };
        let body = partial.into_json();
        assert_eq!(body["errors"], json!(["boom"]));
        assert_eq!(body["objects"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_empty_batch() {
        let exec = executor();
        let result = create_many(&exec, "t1", vec![]).await;
        assert!(result.is_complete());
        assert_eq!(result.into_json(), json!([]));
    }
}
