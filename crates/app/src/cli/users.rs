use agora_app::{
    auth::AuthService,
    context::session_service,
    users::{PgUserDirectory, UserDirectory},
};
use clap::{Args, Subcommand};

use super::DatabaseArgs;

#[derive(Debug, Args)]
pub(crate) struct UsersCommand {
    #[command(subcommand)]
    command: UsersSubcommand,
}

#[derive(Debug, Subcommand)]
enum UsersSubcommand {
    /// Issue a fresh activation token and print its link
    ActivationLink(ActivationLinkArgs),
}

#[derive(Debug, Args)]
pub(crate) struct ActivationLinkArgs {
    #[command(flatten)]
    database: DatabaseArgs,

    /// Email address of the account to activate
    #[arg(long)]
    email: String,
}

pub(crate) async fn run(command: UsersCommand) -> Result<(), String> {
    match command.command {
        UsersSubcommand::ActivationLink(args) => activation_link(args).await,
    }
}

async fn activation_link(args: ActivationLinkArgs) -> Result<(), String> {
    let (pool, settings) = args.database.connect().await?;

    let user = PgUserDirectory::new(pool.clone())
        .find_by_email(&args.email)
        .await
        .map_err(|error| format!("failed to look up user: {error}"))?
        .ok_or_else(|| format!("no user with email {}", args.email))?;

    if user.is_active {
        println!("user {} is already active", user.id);

        return Ok(());
    }

    let service = session_service(pool, &settings);

    let token = service
        .issue_activation_token(user.id)
        .await
        .map_err(|error| format!("failed to issue activation token: {error}"))?;

    println!("user_id: {}", user.id);
    println!("activation_link: {}", service.activation_link(&token));

    Ok(())
}
