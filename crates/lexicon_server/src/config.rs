//! Server configuration

use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:3002";
pub const DEFAULT_CORS_ORIGIN: &str = "http://localhost:3000";
pub const DEFAULT_BODY_LIMIT: usize = 10 * 1024 * 1024;
pub const DEFAULT_IMPORT_TIMEOUT_SECS: u64 = 30;

/// Lexicon HTTP server configuration
#[derive(Parser, Debug, Clone)]
#[command(name = "lexicon-server")]
#[command(about = "Lexicon dictionary HTTP API server")]
pub struct ServerConfig {
    /// SQLite database file
    #[arg(long, env = "LEXICON_DB_PATH", default_value = "lexicon.db")]
    pub db_path: PathBuf,

    /// Address to listen on
    #[arg(long, env = "LEXICON_LISTEN_ADDR", default_value = DEFAULT_LISTEN_ADDR)]
    pub listen_addr: SocketAddr,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LEXICON_LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Absolute directory for rotating log files; stderr when unset
    #[arg(long, env = "LEXICON_LOG_DIR")]
    pub log_dir: Option<String>,

    /// Request body and upload size limit in bytes
    #[arg(long, env = "LEXICON_BODY_LIMIT", default_value_t = DEFAULT_BODY_LIMIT)]
    pub body_limit: usize,

    /// Seconds an import may run before the request fails with 408
    #[arg(long, env = "LEXICON_IMPORT_TIMEOUT_SECS", default_value_t = DEFAULT_IMPORT_TIMEOUT_SECS)]
    pub import_timeout_secs: u64,

    /// Allowed CORS origin; `*` allows any origin, empty disables CORS
    #[arg(long, env = "LEXICON_CORS_ORIGIN", default_value = DEFAULT_CORS_ORIGIN)]
    pub cors_origin: String,
}

impl ServerConfig {
    pub fn import_timeout(&self) -> Duration {
        Duration::from_secs(self.import_timeout_secs.max(1))
    }

    pub fn cors_enabled(&self) -> bool {
        !self.cors_origin.trim().is_empty()
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from("lexicon.db"),
            listen_addr: SocketAddr::from(([127, 0, 0, 1], 3002)),
            log_level: "info".to_string(),
            log_dir: None,
            body_limit: DEFAULT_BODY_LIMIT,
            import_timeout_secs: DEFAULT_IMPORT_TIMEOUT_SECS,
            cors_origin: DEFAULT_CORS_ORIGIN.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_flags_over_defaults() {
        let config = ServerConfig::try_parse_from([
            "lexicon-server",
            "--db-path",
            "/tmp/dict.db",
            "--import-timeout-secs",
            "5",
            "--cors-origin",
            "",
        ])
        .unwrap();
        assert_eq!(config.db_path, PathBuf::from("/tmp/dict.db"));
        assert_eq!(config.import_timeout(), Duration::from_secs(5));
        assert!(!config.cors_enabled());
        assert_eq!(config.body_limit, DEFAULT_BODY_LIMIT);
    }

    #[test]
    fn zero_timeout_is_raised_to_one_second() {
        let config = ServerConfig {
            import_timeout_secs: 0,
            ..ServerConfig::default()
        };
        assert_eq!(config.import_timeout(), Duration::from_secs(1));
    }

    #[test]
    fn default_matches_parser_defaults() {
        let parsed = ServerConfig::try_parse_from(["lexicon-server"]).unwrap();
        let default = ServerConfig::default();
        assert_eq!(parsed.listen_addr, default.listen_addr);
        assert_eq!(parsed.cors_origin, default.cors_origin);
        assert_eq!(parsed.import_timeout_secs, default.import_timeout_secs);
    }
}
