//! Database Config

use std::time::Duration;

use clap::Args;

/// Database settings.
#[derive(Debug, Args)]
pub struct DatabaseConfig {
    /// `PostgreSQL` connection string
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    pub database_url: String,

    /// Seconds to wait for a pooled connection or a single token/user query
    #[arg(
        long,
        env = "DATABASE_TIMEOUT_SECONDS",
        default_value_t = 5_u64,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub database_timeout_seconds: u64,
}

impl DatabaseConfig {
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.database_timeout_seconds)
    }
}
