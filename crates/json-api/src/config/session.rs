//! Session Config

use std::time::Duration;

use clap::Args;

use agora_app::auth::DEFAULT_ACTIVATION_BASE_URL;

/// Session cookie and expiry sweep settings.
#[derive(Debug, Args)]
pub struct SessionConfig {
    /// Name of the cookie carrying the session token
    #[arg(long, env = "SESSION_COOKIE_NAME", default_value = "session_token")]
    pub cookie_name: String,

    /// Seconds between expired-token sweeps
    #[arg(
        long,
        env = "SESSION_SWEEP_INTERVAL_SECONDS",
        default_value_t = 3_600_u64,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub session_sweep_interval_seconds: u64,

    /// Public origin used when building activation links
    #[arg(long, env = "PUBLIC_BASE_URL", default_value = DEFAULT_ACTIVATION_BASE_URL)]
    pub public_base_url: String,
}

impl SessionConfig {
    #[must_use]
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.session_sweep_interval_seconds)
    }
}
