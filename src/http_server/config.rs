//! HTTP Server Configuration
//!
//! Listen address, URL prefix, raw mode, request logging and CORS.

use serde::{Deserialize, Serialize};

/// HTTP server configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpServerConfig {
    /// Host to bind to (default: "0.0.0.0")
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind to (default: 8080)
    #[serde(default = "default_port")]
    pub port: u16,

    /// URL prefix every resource path lives under (default: "/")
    #[serde(default = "default_url")]
    pub url: String,

    /// Accept literal SQL at the prefix root (default: false)
    #[serde(default)]
    pub allow_raw: bool,

    /// Log one line per answered request (default: true)
    #[serde(default = "default_log_requests")]
    pub log_requests: bool,

    /// CORS allowed origins; empty allows any origin
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_url() -> String {
    "/".to_string()
}

fn default_log_requests() -> bool {
    true
}

impl Default for HttpServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            url: default_url(),
            allow_raw: false,
            log_requests: default_log_requests(),
            cors_origins: Vec::new(),
        }
    }
}

impl HttpServerConfig {
    /// Get the socket address string
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// The URL prefix with a leading and trailing `/`
    pub fn prefix(&self) -> String {
        normalize_prefix(&self.url)
    }
}

/// Ensure `url` starts and ends with `/`: `"api"` becomes `"/api/"`.
pub fn normalize_prefix(url: &str) -> String {
    let trimmed = url.trim().trim_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else {
        format!("/{}/", trimmed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = HttpServerConfig::default();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 8080);
        assert_eq!(config.url, "/");
        assert!(!config.allow_raw);
        assert!(config.log_requests);
        assert!(config.cors_origins.is_empty());
    }

    #[test]
    fn test_socket_addr() {
        let config = HttpServerConfig {
            port: 9000,
            ..Default::default()
        };
        assert_eq!(config.socket_addr(), "0.0.0.0:9000");
    }

    #[test]
    fn test_normalize_prefix() {
        assert_eq!(normalize_prefix(""), "/");
        assert_eq!(normalize_prefix("/"), "/");
        assert_eq!(normalize_prefix("api"), "/api/");
        assert_eq!(normalize_prefix("/api"), "/api/");
        assert_eq!(normalize_prefix("api/"), "/api/");
        assert_eq!(normalize_prefix("/api/v1/"), "/api/v1/");
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: HttpServerConfig =
            serde_json::from_str(r#"{"port": 3000, "allow_raw": true}"#).unwrap();
        assert_eq!(config.port, 3000);
        assert!(config.allow_raw);
        assert!(config.log_requests);
        assert_eq!(config.prefix(), "/");
    }
}
