//! Application Context
//!
//! State built once at startup and shared read-only by every request.

use std::sync::Arc;

use crate::db::Database;
use crate::query::Dialect;

use super::executor::Executor;

/// Context handed to every request handler
#[derive(Clone)]
pub struct AppContext {
    executor: Executor,
    allow_raw: bool,
}

impl AppContext {
    /// Create a context for `db`, rendering placeholders per `dialect`
    pub fn new(db: Arc<dyn Database>, dialect: Dialect) -> Self {
        Self {
            executor: Executor::new(db, dialect),
            allow_raw: false,
        }
    }

    /// Enable or disable raw SQL passthrough
    pub fn with_raw(mut self, allow_raw: bool) -> Self {
        self.allow_raw = allow_raw;
        self
    }

    pub fn executor(&self) -> &Executor {
        &self.executor
    }

    pub fn allow_raw(&self) -> bool {
        self.allow_raw
    }
}
