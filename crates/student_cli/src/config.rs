//! Command-line and environment configuration.

use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;

/// Student registry HTTP service.
#[derive(Debug, Clone, Parser)]
#[command(name = "student-registry")]
#[command(version, about = "CRUD web service for student records backed by SQLite")]
pub struct Config {
    /// Path to the SQLite database file (created when absent)
    #[arg(long, env = "STUDENT_REGISTRY_DB", default_value = "students.db")]
    pub database: PathBuf,

    /// Address to listen on
    #[arg(long, env = "STUDENT_REGISTRY_BIND", default_value = "127.0.0.1:8000")]
    pub bind: SocketAddr,

    /// Log level: trace|debug|info|warn|error (defaults by build mode)
    #[arg(long, env = "STUDENT_REGISTRY_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Absolute directory for rolling log files; logs go to stderr when unset
    #[arg(long, env = "STUDENT_REGISTRY_LOG_DIR")]
    pub log_dir: Option<String>,
}

impl Config {
    pub fn effective_log_level(&self) -> &str {
        self.log_level
            .as_deref()
            .unwrap_or_else(|| student_core::default_log_level())
    }
}

#[cfg(test)]
mod tests {
    use super::Config;
    use clap::Parser;
    use std::path::PathBuf;

    #[test]
    fn explicit_flags_override_defaults() {
        let config = Config::try_parse_from([
            "student-registry",
            "--database",
            "/tmp/school.db",
            "--bind",
            "0.0.0.0:9000",
            "--log-level",
            "warn",
            "--log-dir",
            "/var/log/students",
        ])
        .unwrap();

        assert_eq!(config.database, PathBuf::from("/tmp/school.db"));
        assert_eq!(config.bind.port(), 9000);
        assert_eq!(config.effective_log_level(), "warn");
        assert_eq!(config.log_dir.as_deref(), Some("/var/log/students"));
    }

    #[test]
    fn invalid_bind_address_is_rejected() {
        let err = Config::try_parse_from(["student-registry", "--bind", "not-an-address"]);
        assert!(err.is_err());
    }

    #[test]
    fn log_level_falls_back_to_build_default() {
        let config = Config {
            database: PathBuf::from("students.db"),
            bind: "127.0.0.1:8000".parse().unwrap(),
            log_level: None,
            log_dir: None,
        };
        assert_eq!(
            config.effective_log_level(),
            student_core::default_log_level()
        );
    }
}
