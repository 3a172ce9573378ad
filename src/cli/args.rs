//! CLI argument definitions using clap
//!
//! Example:
//! - sqld -u root --db database_name -H localhost:5432 --type postgres
//! - sqld --type sqlite3 --dsn ./app.db --raw --url api

use clap::Parser;
use std::path::PathBuf;

/// sqld - relational tables as a JSON/HTTP resource API
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "sqld")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Allow raw SQL queries posted to the URL root
    #[arg(long)]
    pub raw: bool,

    /// Database source name; overrides user, pass, host and db
    #[arg(long)]
    pub dsn: Option<String>,

    /// Database username [default: root]
    #[arg(short = 'u', long)]
    pub user: Option<String>,

    /// Database password
    #[arg(short = 'p', long)]
    pub pass: Option<String>,

    /// Database host [default: localhost:5432, localhost:3306 for mysql]
    #[arg(short = 'H', long)]
    pub host: Option<String>,

    /// Database type: postgres or sqlite3; mysql is recognized but has no driver [default: postgres]
    #[arg(long = "type")]
    pub db_type: Option<String>,

    /// Database name
    #[arg(long = "db")]
    pub name: Option<String>,

    /// HTTP port [default: 8080]
    #[arg(long)]
    pub port: Option<u16>,

    /// HTTP bind address [default: 0.0.0.0]
    #[arg(long)]
    pub bind: Option<String>,

    /// URL prefix served [default: /]
    #[arg(long)]
    pub url: Option<String>,

    /// Disable request logging
    #[arg(long)]
    pub nolog: bool,

    /// Path to a JSON configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
