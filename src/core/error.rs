//! Core Error Types
//!
//! Every failure in the request pipeline is classified exactly once, where
//! it is detected, into one of these kinds. Callers pass it upward as is.

use std::fmt;

use axum::http::StatusCode;
use thiserror::Error;

use crate::db::ValueError;
use crate::query::{ClauseError, CompileError};

/// Core module result type
pub type SqldResult<T> = Result<T, SqldError>;

/// A classified failure carrying the message shown to the client
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SqldError {
    /// Malformed input, compile failure, or a rejected write
    #[error("{0}")]
    BadRequest(String),

    /// A well-formed write matched no rows
    #[error("{0}")]
    NotFound(String),

    /// Read execution or row scanning failed
    #[error("{0}")]
    Internal(String),

    #[error("method {0} is not allowed")]
    MethodNotAllowed(String),
}

impl SqldError {
    pub fn bad_request(err: impl fmt::Display) -> Self {
        Self::BadRequest(err.to_string())
    }

    pub fn not_found(err: impl fmt::Display) -> Self {
        Self::NotFound(err.to_string())
    }

    pub fn internal(err: impl fmt::Display) -> Self {
        Self::Internal(err.to_string())
    }

    pub fn method_not_allowed(method: impl fmt::Display) -> Self {
        Self::MethodNotAllowed(method.to_string())
    }

    /// Get error code for logs
    pub fn code(&self) -> &'static str {
        match self {
            Self::BadRequest(_) => "BAD_REQUEST",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Internal(_) => "INTERNAL_ERROR",
            Self::MethodNotAllowed(_) => "METHOD_NOT_ALLOWED",
        }
    }

    /// Get HTTP status code
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
        }
    }
}

impl From<CompileError> for SqldError {
    fn from(e: CompileError) -> Self {
        Self::bad_request(e)
    }
}

impl From<ClauseError> for SqldError {
    fn from(e: ClauseError) -> Self {
        Self::bad_request(e)
    }
}

impl From<ValueError> for SqldError {
    fn from(e: ValueError) -> Self {
        Self::bad_request(e)
    }
}

impl From<serde_json::Error> for SqldError {
    fn from(e: serde_json::Error) -> Self {
        Self::bad_request(e)
    }
}
