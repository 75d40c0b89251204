use std::time::Duration;

use agora_app::{
    auth::DEFAULT_ACTIVATION_BASE_URL,
    context::AppSettings,
    database,
};
use clap::{Args, Parser, Subcommand};
use sqlx::PgPool;

mod tokens;
mod users;

#[derive(Debug, Parser)]
#[command(name = "agora-app", about = "Agora CLI", long_about = None)]
pub(crate) struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    Tokens(tokens::TokensCommand),
    Users(users::UsersCommand),
}

impl Cli {
    pub(crate) async fn run(self) -> Result<(), String> {
        match self.command {
            Commands::Tokens(command) => tokens::run(command).await,
            Commands::Users(command) => users::run(command).await,
        }
    }
}

/// Connection settings shared by every subcommand.
#[derive(Debug, Args)]
pub(crate) struct DatabaseArgs {
    /// PostgreSQL connection string
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    database_url: String,

    /// Seconds to wait for a connection or a single query
    #[arg(long, env = "DATABASE_TIMEOUT_SECONDS", default_value_t = 5)]
    database_timeout_seconds: u64,

    /// Origin prefixed to activation links
    #[arg(long, env = "PUBLIC_BASE_URL", default_value = DEFAULT_ACTIVATION_BASE_URL)]
    public_base_url: String,
}

impl DatabaseArgs {
    fn settings(&self) -> AppSettings {
        AppSettings {
            database_url: self.database_url.clone(),
            store_timeout: Duration::from_secs(self.database_timeout_seconds),
            activation_base_url: self.public_base_url.clone(),
        }
    }

    async fn connect(&self) -> Result<(PgPool, AppSettings), String> {
        let settings = self.settings();

        let pool = database::connect(&settings.database_url, settings.store_timeout)
            .await
            .map_err(|error| format!("failed to connect to database: {error}"))?;

        Ok((pool, settings))
    }
}
