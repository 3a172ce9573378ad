//! # sqld Core Module
//!
//! The execution side of the request pipeline: statement execution and
//! row marshaling, the batch insert coordinator, raw passthrough, and the
//! error kinds every operation reports.

pub mod batch;
pub mod context;
pub mod error;
pub mod executor;
pub mod raw;

pub use batch::{create_many, BatchResult};
pub use context::AppContext;
pub use error::{SqldError, SqldResult};
pub use executor::Executor;
pub use raw::{RawOutcome, RawQuery, RawWriteResult};
