//! CLI module for sqld
//!
//! Parses flags (and an optional JSON config file), opens the database and
//! serves it over HTTP.

mod args;
mod commands;
mod errors;

pub use args::Cli;
pub use commands::{build_server, run, serve, Config};
pub use errors::{CliError, CliErrorCode, CliResult};
