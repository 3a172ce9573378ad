//! sqld - relational tables as a JSON/HTTP resource API
//!
//! Requests are parsed into a [`query::QuerySpec`], compiled to
//! parameterized SQL, executed against a shared [`db::Database`] handle
//! and encoded back as JSON.

pub mod cli;
pub mod core;
pub mod db;
pub mod http_server;
pub mod observability;
pub mod query;
pub mod rest_api;
