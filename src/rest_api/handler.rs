//! # REST API Handler
//!
//! One function per resource operation. Each parses its inputs, compiles
//! a statement, hands it to the context's executor and returns a [`Reply`].

use axum::body::Bytes;
use serde_json::Value;

use crate::core::{create_many, AppContext, RawQuery, SqldError, SqldResult};
use crate::query::builder;

use super::parser::{query_spec, Intent, Payload, Target};
use super::response::Reply;

/// A routed resource request
#[derive(Debug, Clone)]
pub struct RestRequest {
    pub target: Target,
    pub params: Vec<(String, String)>,
    pub body: Bytes,
}

impl RestRequest {
    pub fn new(target: Target, params: Vec<(String, String)>, body: Bytes) -> Self {
        Self {
            target,
            params,
            body,
        }
    }
}

/// `GET`: rows matching the key and filters
pub async fn read(ctx: &AppContext, request: &RestRequest) -> SqldResult<Reply> {
    let spec = query_spec(&request.target, &request.params, Intent::Select)?;
    let rows = ctx.executor().read(builder::select(&spec)?).await?;
    Ok(Reply::Ok(Value::Array(
        rows.into_iter().map(Value::Object).collect(),
    )))
}

/// `POST`: an object creates one row, an array creates one row per item
pub async fn create(ctx: &AppContext, request: &RestRequest) -> SqldResult<Reply> {
    let table = request.target.table.as_str();
    match Payload::parse(&request.body)? {
        Payload::Object(item) => {
            let row = ctx.executor().create_single(table, item).await?;
            Ok(Reply::Created(Value::Object(row)))
        }
        Payload::Array(items) => {
            let result = create_many(ctx.executor(), table, items).await;
            Ok(Reply::Created(result.into_json()))
        }
    }
}

/// `PUT`: set the body's columns on matching rows
pub async fn update(ctx: &AppContext, request: &RestRequest) -> SqldResult<Reply> {
    let values = Payload::parse(&request.body)?.into_object()?;
    let spec = query_spec(&request.target, &request.params, Intent::Update)?;
    ctx.executor().write(builder::update(&spec, &values)?).await?;
    Ok(Reply::Empty)
}

/// `DELETE`: remove matching rows
pub async fn delete(ctx: &AppContext, request: &RestRequest) -> SqldResult<Reply> {
    let spec = query_spec(&request.target, &request.params, Intent::Delete)?;
    ctx.executor().write(builder::delete(&spec)?).await?;
    Ok(Reply::Empty)
}

/// `POST` at the root: literal SQL, when enabled
pub async fn raw(ctx: &AppContext, body: &[u8]) -> SqldResult<Reply> {
    if !ctx.allow_raw() {
        return Err(SqldError::bad_request("raw queries are disabled"));
    }
    let query: RawQuery = serde_json::from_slice(body)?;
    let outcome = query.run(ctx.executor()).await?;
    Ok(Reply::Ok(outcome.into_json()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use serde_json::json;

    use crate::db::SqliteDatabase;
    use crate::query::Dialect;

    fn context() -> AppContext {
        let db = SqliteDatabase::open(":memory:").unwrap();
        db.execute_batch(
            "CREATE TABLE user(id INTEGER PRIMARY KEY, name TEXT, age INTEGER);
             INSERT INTO user(name, age) VALUES ('jack', 30), ('jill', 28), ('bob', 41);",
        )
        .unwrap();
        AppContext::new(Arc::new(db), Dialect::Question)
    }

    fn request(path: &str, params: &[(&str, &str)], body: &str) -> RestRequest {
        RestRequest::new(
            Target::parse(path).unwrap(),
            params
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            Bytes::from(body.to_string()),
        )
    }

    fn rows(reply: Reply) -> Vec<Value> {
        match reply {
            Reply::Ok(Value::Array(rows)) => rows,
            other => panic!("expected rows, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_read_by_key() {
        let ctx = context();
        let found = rows(read(&ctx, &request("user/2", &[], "")).await.unwrap());
        assert_eq!(found, vec![json!({"id": 2, "name": "jill", "age": 28})]);
    }

    #[tokio::test]
    async fn test_read_with_order_and_limit() {
        let ctx = context();
        let params = [("__order_by__", "age desc"), ("__limit__", "2")];
        let found = rows(read(&ctx, &request("user", &params, "")).await.unwrap());

        let names: Vec<&str> = found.iter().map(|r| r["name"].as_str().unwrap()).collect();
        assert_eq!(names, vec!["bob", "jack"]);
    }

    #[tokio::test]
    async fn test_read_unknown_table_is_internal() {
        let ctx = context();
        let err = read(&ctx, &request("nope", &[], "")).await.unwrap_err();
        assert!(matches!(err, SqldError::Internal(_)));
    }

    #[tokio::test]
    async fn test_create_single_returns_id() {
        let ctx = context();
        let reply = create(&ctx, &request("user", &[], r#"{"name": "ann", "age": 5}"#))
            .await
            .unwrap();
        assert_eq!(
            reply,
            Reply::Created(json!({"name": "ann", "age": 5, "id": 4}))
        );
    }

    #[tokio::test]
    async fn test_create_scalar_body_rejected() {
        let ctx = context();
        let err = create(&ctx, &request("user", &[], "7")).await.unwrap_err();
        assert!(matches!(err, SqldError::BadRequest(_)));
    }

    #[tokio::test]
    async fn test_update_then_not_found() {
        let ctx = context();
        let reply = update(&ctx, &request("user/1", &[], r#"{"age": 31}"#))
            .await
            .unwrap();
        assert_eq!(reply, Reply::Empty);

        let err = update(&ctx, &request("user/99", &[], r#"{"age": 31}"#))
            .await
            .unwrap_err();
        assert!(matches!(err, SqldError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_update_with_empty_body_rejected() {
        let ctx = context();
        let err = update(&ctx, &request("user/1", &[], "{}")).await.unwrap_err();
        assert!(matches!(err, SqldError::BadRequest(_)));
    }

    #[tokio::test]
    async fn test_delete_by_filter() {
        let ctx = context();
        let reply = delete(&ctx, &request("user", &[("name", "bob")], ""))
            .await
            .unwrap();
        assert_eq!(reply, Reply::Empty);

        let left = rows(read(&ctx, &request("user", &[], "")).await.unwrap());
        assert_eq!(left.len(), 2);
    }

    #[tokio::test]
    async fn test_raw_requires_flag() {
        let ctx = context();
        let err = raw(&ctx, br#"{"read": "SELECT 1"}"#).await.unwrap_err();
        assert_eq!(err, SqldError::bad_request("raw queries are disabled"));

        let ctx = ctx.with_raw(true);
        let reply = raw(&ctx, br#"{"read": "SELECT count(*) AS n FROM user"}"#)
            .await
            .unwrap();
        assert_eq!(reply, Reply::Ok(json!([{"n": 3}])));
    }
}
