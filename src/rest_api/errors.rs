//! # REST API Errors
//!
//! HTTP rendering of [`SqldError`]: the mapped status code with the error
//! message as a plain-text body.

use axum::response::{IntoResponse, Response};

use crate::core::SqldError;

impl IntoResponse for SqldError {
    fn into_response(self) -> Response {
        (self.status_code(), self.to_string()).into_response()
    }
}
