//! Server configuration module

use clap::Parser;

use crate::config::{
    db::DatabaseConfig, observability::LoggingConfig, server::ServerRuntimeConfig,
    session::SessionConfig,
};

pub(crate) mod db;
pub(crate) mod observability;
pub(crate) mod server;
pub(crate) mod session;

/// Agora JSON API Server configuration
#[derive(Debug, Parser)]
#[command(name = "agora-json", about = "Agora JSON API Server", long_about = None)]
pub struct ServerConfig {
    /// Server network settings.
    #[command(flatten)]
    pub server: ServerRuntimeConfig,

    /// Logging output settings.
    #[command(flatten)]
    pub logging: LoggingConfig,

    /// Application database settings.
    #[command(flatten)]
    pub database: DatabaseConfig,

    /// Session cookie and token maintenance settings.
    #[command(flatten)]
    pub session: SessionConfig,
}

impl ServerConfig {
    /// Load configuration from environment and CLI arguments
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be parsed
    pub fn load() -> Result<Self, clap::Error> {
        // Load .env file if present (ignore if missing)
        _ = dotenvy::dotenv();

        Self::try_parse()
    }

    /// Get the socket address for binding
    #[must_use]
    pub fn socket_addr(&self) -> String {
        self.server.socket_addr()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use testresult::TestResult;

    use super::*;

    #[test]
    fn defaults_apply_when_only_the_database_is_given() -> TestResult {
        let config =
            ServerConfig::try_parse_from(["agora-json", "--database-url", "postgres://db/agora"])?;

        assert_eq!(config.socket_addr(), "0.0.0.0:8698");
        assert_eq!(config.database.timeout(), Duration::from_secs(5));
        assert_eq!(config.session.cookie_name, "session_token");
        assert_eq!(config.session.sweep_interval(), Duration::from_secs(3_600));

        Ok(())
    }

    #[test]
    fn zero_sweep_interval_is_rejected() {
        let parsed = ServerConfig::try_parse_from([
            "agora-json",
            "--database-url",
            "postgres://db/agora",
            "--session-sweep-interval-seconds",
            "0",
        ]);

        assert!(parsed.is_err(), "a zero interval would spin the sweeper");
    }
}
