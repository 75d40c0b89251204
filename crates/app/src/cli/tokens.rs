use agora_app::{auth::AuthService, context::session_service};
use clap::{Args, Subcommand};

use super::DatabaseArgs;

#[derive(Debug, Args)]
pub(crate) struct TokensCommand {
    #[command(subcommand)]
    command: TokensSubcommand,
}

#[derive(Debug, Subcommand)]
enum TokensSubcommand {
    /// Delete every expired token once
    Sweep(SweepArgs),
}

#[derive(Debug, Args)]
pub(crate) struct SweepArgs {
    #[command(flatten)]
    database: DatabaseArgs,
}

pub(crate) async fn run(command: TokensCommand) -> Result<(), String> {
    match command.command {
        TokensSubcommand::Sweep(args) => sweep(args).await,
    }
}

async fn sweep(args: SweepArgs) -> Result<(), String> {
    let (pool, settings) = args.database.connect().await?;

    let removed = session_service(pool, &settings)
        .sweep_expired()
        .await
        .map_err(|error| format!("failed to sweep tokens: {error}"))?;

    println!("removed {removed} expired tokens");

    Ok(())
}
