//! # Response Formatting
//!
//! Successful outcomes of a REST operation and their HTTP encoding.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::Value;

use crate::core::SqldResult;

/// A successful operation outcome
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    /// Nothing to return (204)
    Empty,
    /// A JSON payload (200)
    Ok(Value),
    /// A JSON payload describing created rows (201)
    Created(Value),
}

impl Reply {
    pub fn status(&self) -> StatusCode {
        match self {
            Reply::Empty => StatusCode::NO_CONTENT,
            Reply::Ok(_) => StatusCode::OK,
            Reply::Created(_) => StatusCode::CREATED,
        }
    }
}

impl IntoResponse for Reply {
    fn into_response(self) -> Response {
        let status = self.status();
        match self {
            Reply::Empty => status.into_response(),
            Reply::Ok(body) | Reply::Created(body) => (status, Json(body)).into_response(),
        }
    }
}

/// Encode an operation result as exactly one HTTP response.
pub fn encode(result: SqldResult<Reply>) -> Response {
    match result {
        Ok(reply) => reply.into_response(),
        Err(err) => err.into_response(),
    }
}
