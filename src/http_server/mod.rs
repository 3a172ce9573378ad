//! # sqld HTTP Server Module
//!
//! Binds the REST API to a TCP listener with CORS and graceful shutdown.

pub mod config;
pub mod server;

pub use config::{normalize_prefix, HttpServerConfig};
pub use server::HttpServer;
