//! Database Connection Configuration
//!
//! Backend selection and data source name assembly.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::query::Dialect;

const MYSQL_DEFAULT_HOST: &str = "localhost:3306";
const POSTGRES_DEFAULT_HOST: &str = "localhost:5432";

/// Supported backend families
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DatabaseType {
    Mysql,
    Postgres,
    Sqlite3,
    /// Anything else; rejected at connect time
    Other(String),
}

impl DatabaseType {
    pub fn as_str(&self) -> &str {
        match self {
            DatabaseType::Mysql => "mysql",
            DatabaseType::Postgres => "postgres",
            DatabaseType::Sqlite3 => "sqlite3",
            DatabaseType::Other(name) => name,
        }
    }

    /// Placeholder convention the backend expects
    pub fn dialect(&self) -> Dialect {
        match self {
            DatabaseType::Postgres => Dialect::Dollar,
            _ => Dialect::Question,
        }
    }
}

impl FromStr for DatabaseType {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "mysql" => DatabaseType::Mysql,
            "postgres" => DatabaseType::Postgres,
            "sqlite3" => DatabaseType::Sqlite3,
            other => DatabaseType::Other(other.to_string()),
        })
    }
}

impl From<String> for DatabaseType {
    fn from(s: String) -> Self {
        match s.parse() {
            Ok(t) => t,
            Err(never) => match never {},
        }
    }
}

impl From<DatabaseType> for String {
    fn from(t: DatabaseType) -> Self {
        t.as_str().to_string()
    }
}

impl fmt::Display for DatabaseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Database connection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Backend type (default: "postgres")
    #[serde(default = "default_db_type", rename = "type")]
    pub db_type: DatabaseType,

    /// Full data source name; overrides every other field when set
    #[serde(default)]
    pub dsn: String,

    /// Username (default: "root")
    #[serde(default = "default_user")]
    pub user: String,

    #[serde(default)]
    pub pass: String,

    /// host:port, defaulted per backend when empty
    #[serde(default)]
    pub host: String,

    /// Database name
    #[serde(default)]
    pub name: String,
}

fn default_db_type() -> DatabaseType {
    DatabaseType::Postgres
}

fn default_user() -> String {
    "root".to_string()
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            db_type: default_db_type(),
            dsn: String::new(),
            user: default_user(),
            pass: String::new(),
            host: String::new(),
            name: String::new(),
        }
    }
}

impl DatabaseConfig {
    /// In-memory SQLite, mostly useful for tests
    pub fn sqlite_memory() -> Self {
        Self {
            db_type: DatabaseType::Sqlite3,
            dsn: ":memory:".to_string(),
            ..Default::default()
        }
    }

    /// Assemble the data source name for the configured backend.
    pub fn build_dsn(&self) -> String {
        if !self.dsn.is_empty() {
            return self.dsn.clone();
        }

        let host = if self.host.is_empty() {
            match self.db_type {
                DatabaseType::Postgres => POSTGRES_DEFAULT_HOST,
                _ => MYSQL_DEFAULT_HOST,
            }
        } else {
            self.host.as_str()
        };
        let user = if self.user.is_empty() { "root" } else { self.user.as_str() };

        match self.db_type {
            DatabaseType::Mysql => format!(
                "{}:{}@({})/{}?parseTime=true",
                user, self.pass, host, self.name
            ),
            DatabaseType::Postgres => format!(
                "postgres://{}:{}@{}/{}?sslmode=disable",
                user, self.pass, host, self.name
            ),
            DatabaseType::Sqlite3 | DatabaseType::Other(_) => self.dsn.clone(),
        }
    }
}
