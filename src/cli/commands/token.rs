use clap::Subcommand;
use serde_json::json;
use uuid::Uuid;

use crate::auth::{generate_jwt, Claims};
use crate::cli::utils::*;
use crate::cli::OutputFormat;

#[derive(Subcommand)]
pub enum TokenCommands {
    #[command(about = "Issue a bearer token for an existing user")]
    Issue {
        #[arg(help = "User id")]
        user_id: Uuid,
    },
}

pub async fn handle(cmd: TokenCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        TokenCommands::Issue { user_id } => {
            let backend = open_backend().await?;
            let user = backend
                .users
                .find_user(user_id)
                .await?
                .ok_or_else(|| anyhow::anyhow!("User {} not found", user_id))?;

            let token = generate_jwt(&Claims::new(user.id, user.display_name.clone()))?;

            match output_format {
                OutputFormat::Json => output_success(
                    &output_format,
                    &format!("Token issued for '{}'", user.display_name),
                    Some(json!({ "token": token, "user_id": user.id })),
                ),
                OutputFormat::Text => {
                    println!("{}", token);
                    Ok(())
                }
            }
        }
    }
}
