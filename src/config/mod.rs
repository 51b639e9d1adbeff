//! Configuration module for the concession backend.
//!
//! All configuration is loaded from environment variables with sensible defaults.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Path to SQLite database file
    pub db_path: PathBuf,
    /// Root directory of the blob store (attachments and the history log)
    pub blob_root: PathBuf,
    /// Address to bind the server to
    pub bind_addr: SocketAddr,
    /// Public base URL used to build download links for uploaded blobs
    pub public_url: String,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let db_path = env::var("CONCESSION_DB_PATH")
            .unwrap_or_else(|_| "./data/app.sqlite".to_string())
            .into();

        let blob_root = env::var("CONCESSION_BLOB_ROOT")
            .unwrap_or_else(|_| "./data/blobs".to_string())
            .into();

        let bind_addr: SocketAddr = env::var("CONCESSION_BIND_ADDR")
            .unwrap_or_else(|_| "127.0.0.1:8080".to_string())
            .parse()
            .expect("Invalid CONCESSION_BIND_ADDR format");

        let public_url = env::var("CONCESSION_PUBLIC_URL")
            .unwrap_or_else(|_| format!("http://{}", bind_addr));

        let log_level = env::var("CONCESSION_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Self {
            db_path,
            blob_root,
            bind_addr,
            public_url,
            log_level,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        // Clear any existing env vars
        env::remove_var("CONCESSION_DB_PATH");
        env::remove_var("CONCESSION_BLOB_ROOT");
        env::remove_var("CONCESSION_BIND_ADDR");
        env::remove_var("CONCESSION_PUBLIC_URL");
        env::remove_var("CONCESSION_LOG_LEVEL");

        let config = Config::from_env();

        assert_eq!(config.db_path, PathBuf::from("./data/app.sqlite"));
        assert_eq!(config.blob_root, PathBuf::from("./data/blobs"));
        assert_eq!(config.bind_addr.to_string(), "127.0.0.1:8080");
        assert_eq!(config.public_url, "http://127.0.0.1:8080");
        assert_eq!(config.log_level, "info");
    }
}
