//! CLI command implementations
//!
//! Startup order: resolve configuration, open the database, build the
//! application context, then serve on a tokio runtime until shutdown.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::AppContext;
use crate::db::{self, DatabaseConfig, DatabaseType};
use crate::http_server::{HttpServer, HttpServerConfig};
use crate::observability::{log_event, log_event_with_fields, Event};

use super::args::Cli;
use super::errors::{CliError, CliResult};

/// Configuration file structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// HTTP listener settings
    #[serde(default)]
    pub server: HttpServerConfig,

    /// Database connection settings
    #[serde(default)]
    pub database: DatabaseConfig,
}

impl Config {
    /// Load configuration from file
    pub fn load(path: &Path) -> CliResult<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| CliError::config_error(format!("Failed to read config: {}", e)))?;

        serde_json::from_str(&content)
            .map_err(|e| CliError::config_error(format!("Invalid config JSON: {}", e)))
    }

    /// Build the effective configuration: file values (if any) overridden
    /// by explicitly given flags.
    pub fn resolve(cli: &Cli) -> CliResult<Self> {
        let mut config = match &cli.config {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };
        config.apply_flags(cli);
        config.validate()?;
        Ok(config)
    }

    fn apply_flags(&mut self, cli: &Cli) {
        let db = &mut self.database;
        if let Some(db_type) = &cli.db_type {
            db.db_type = DatabaseType::from(db_type.clone());
        }
        if let Some(dsn) = &cli.dsn {
            db.dsn = dsn.clone();
        }
        if let Some(user) = &cli.user {
            db.user = user.clone();
        }
        if let Some(pass) = &cli.pass {
            db.pass = pass.clone();
        }
        if let Some(host) = &cli.host {
            db.host = host.clone();
        }
        if let Some(name) = &cli.name {
            db.name = name.clone();
        }

        let server = &mut self.server;
        if let Some(port) = cli.port {
            server.port = port;
        }
        if let Some(bind) = &cli.bind {
            server.host = bind.clone();
        }
        if let Some(url) = &cli.url {
            server.url = url.clone();
        }
        if cli.raw {
            server.allow_raw = true;
        }
        if cli.nolog {
            server.log_requests = false;
        }
    }

    /// Validate configuration
    fn validate(&self) -> CliResult<()> {
        if self.server.port == 0 {
            return Err(CliError::config_error("port must be > 0"));
        }

        if self.database.db_type == DatabaseType::Sqlite3 && self.database.dsn.is_empty() {
            return Err(CliError::config_error(
                "sqlite3 needs a dsn (a file path or :memory:)",
            ));
        }

        Ok(())
    }
}

/// Main CLI entry point
///
/// Parses arguments and serves. This is the only function that main.rs
/// should call.
pub fn run() -> CliResult<()> {
    let cli = Cli::parse_args();
    serve(&cli).map_err(|e| {
        log_event_with_fields(
            Event::BootFailed,
            &[("code", e.code_str()), ("message", e.message())],
        );
        e
    })
}

/// Open the configured database and serve it over HTTP until Ctrl-C
pub fn serve(cli: &Cli) -> CliResult<()> {
    log_event(Event::BootStart);

    let config = Config::resolve(cli)?;
    let port = config.server.port.to_string();
    log_event_with_fields(
        Event::ConfigLoaded,
        &[
            ("type", config.database.db_type.as_str()),
            ("port", port.as_str()),
            ("prefix", config.server.url.as_str()),
        ],
    );

    let server = build_server(config)?;

    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| CliError::boot_failed(format!("Failed to create tokio runtime: {}", e)))?;

    rt.block_on(async {
        server
            .start()
            .await
            .map_err(|e| CliError::boot_failed(format!("HTTP server failed: {}", e)))
    })
}

/// Connect to the database and assemble the HTTP server
pub fn build_server(config: Config) -> CliResult<HttpServer> {
    let handle = db::connect(&config.database)?;
    log_event_with_fields(
        Event::DatabaseConnected,
        &[("type", config.database.db_type.as_str())],
    );

    let ctx = AppContext::new(handle, config.database.db_type.dialect());
    Ok(HttpServer::new(config.server, ctx))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::errors::CliErrorCode;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn cli(args: &[&str]) -> Cli {
        use clap::Parser;
        let mut argv = vec!["sqld"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).unwrap()
    }

    fn config_file(json: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(json.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_defaults_without_file() {
        let config = Config::resolve(&cli(&[])).unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.database.db_type, DatabaseType::Postgres);
        assert_eq!(config.database.user, "root");
    }

    #[test]
    fn test_flags_override_file() {
        let file = config_file(
            r#"{
                "server": {"port": 3000, "url": "/api/"},
                "database": {"type": "sqlite3", "dsn": "/tmp/file.db"}
            }"#,
        );
        let path = file.path().to_str().unwrap();

        let config =
            Config::resolve(&cli(&["--config", path, "--port", "4000", "--nolog"])).unwrap();
        assert_eq!(config.server.port, 4000);
        assert_eq!(config.server.url, "/api/");
        assert!(!config.server.log_requests);
        assert_eq!(config.database.db_type, DatabaseType::Sqlite3);
        assert_eq!(config.database.dsn, "/tmp/file.db");
    }

    #[test]
    fn test_sqlite_requires_dsn() {
        let err = Config::resolve(&cli(&["--type", "sqlite3"])).unwrap_err();
        assert_eq!(err.code(), &CliErrorCode::ConfigError);
    }

    #[test]
    fn test_zero_port_rejected() {
        let err = Config::resolve(&cli(&["--port", "0"])).unwrap_err();
        assert_eq!(err.code(), &CliErrorCode::ConfigError);
    }

    #[test]
    fn test_invalid_config_json() {
        let file = config_file("{ not json");
        let err = Config::load(file.path()).unwrap_err();
        assert!(err.message().starts_with("Invalid config JSON"));
    }

    #[test]
    fn test_missing_config_file() {
        let err = Config::load(Path::new("/nonexistent/sqld.json")).unwrap_err();
        assert!(err.message().starts_with("Failed to read config"));
    }

    #[test]
    fn test_build_server_for_sqlite() {
        let config = Config::resolve(&cli(&["--type", "sqlite3", "--dsn", ":memory:", "--port", "9001"]))
            .unwrap();
        let server = build_server(config).unwrap();
        assert_eq!(server.socket_addr(), "0.0.0.0:9001");
    }

    #[test]
    fn test_build_server_unknown_type() {
        let config = Config::resolve(&cli(&["--type", "oracle"])).unwrap();
        let err = build_server(config).err().unwrap();
        assert_eq!(err.code(), &CliErrorCode::DatabaseError);
        assert!(err.message().contains("Unsupported database type oracle"));
    }
}
