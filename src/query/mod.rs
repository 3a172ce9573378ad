//! # Query Module
//!
//! Request intent to SQL: the clause model, the statement compiler and
//! placeholder dialects.

pub mod builder;
pub mod clause;
pub mod dialect;

pub use builder::{CompileError, Statement};
pub use clause::{ClauseError, Direction, FilterSet, OrderBy, QuerySpec};
pub use dialect::Dialect;
