use clap::Subcommand;
use pushups_core::integrations::telegram::{
    forget_token, resolve_token, store_token, TOKEN_ENV,
};
use pushups_core::{Config, TelegramClient};

use super::CommandResult;

#[derive(Subcommand)]
pub enum AuthAction {
    /// Verify a bot token and store it in the OS keyring
    Login {
        /// Bot token from @BotFather
        #[arg(long)]
        token: String,
    },
    /// Remove the stored bot token
    Logout,
    /// Check which bot the configured token belongs to
    Status,
}

pub async fn run(action: AuthAction) -> CommandResult {
    let config = Config::load()?;
    match action {
        AuthAction::Login { token } => {
            let client = TelegramClient::new(token.trim(), config.telegram.api_base.clone())?;
            let me = client.get_me().await?;
            store_token(&token)?;
            println!("authenticated as {}", me.username.unwrap_or(me.first_name));
        }
        AuthAction::Logout => {
            forget_token()?;
            println!("bot token removed");
            if std::env::var_os(TOKEN_ENV).is_some() {
                println!("note: {TOKEN_ENV} is still set");
            }
        }
        AuthAction::Status => match resolve_token() {
            Some(token) => {
                let client = TelegramClient::new(token, config.telegram.api_base.clone())?;
                match client.get_me().await {
                    Ok(me) => println!(
                        "authenticated as {}",
                        me.username.unwrap_or(me.first_name)
                    ),
                    Err(e) => println!("token rejected: {e}"),
                }
            }
            None => println!("not authenticated"),
        },
    }
    Ok(())
}
