use clap::Subcommand;
use serde_json::json;

use crate::cli::utils::*;
use crate::cli::OutputFormat;

#[derive(Subcommand)]
pub enum UserCommands {
    #[command(about = "Create a user")]
    Add {
        #[arg(help = "Display name")]
        name: String,

        #[arg(long, help = "Grant the admin role without a vote")]
        admin: bool,
    },

    #[command(about = "List users with their admin flag")]
    List,
}

pub async fn handle(cmd: UserCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        UserCommands::Add { name, admin } => {
            if name.trim().is_empty() {
                anyhow::bail!("Display name must not be empty");
            }
            let service = open_admin_service().await?;
            let user = service.create_user(&name, admin).await?;
            output_success(
                &output_format,
                &format!("Created user '{}' ({})", user.display_name, user.id),
                Some(json!({ "user": user, "is_admin": admin })),
            )
        }
        UserCommands::List => {
            let backend = open_backend().await?;
            let users = backend.users.list_users().await?;

            if users.is_empty() {
                return output_empty_collection(&output_format, "users", "No users");
            }

            match output_format {
                OutputFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(&json!({ "users": users }))?);
                }
                OutputFormat::Text => {
                    println!("{:<38} {:<25} {:<6} {}", "ID", "NAME", "ADMIN", "CREATED");
                    println!("{}", "-".repeat(90));
                    for user in &users {
                        println!(
                            "{:<38} {:<25} {:<6} {}",
                            user.id,
                            user.display_name,
                            if user.is_admin { "yes" } else { "" },
                            user.created_at.format("%Y-%m-%d %H:%M")
                        );
                    }
                }
            }
            Ok(())
        }
    }
}
