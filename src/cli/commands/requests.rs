use clap::Subcommand;
use serde_json::json;

use crate::cli::utils::*;
use crate::cli::OutputFormat;

#[derive(Subcommand)]
pub enum RequestCommands {
    #[command(about = "List pending admin requests with their tally")]
    List,
}

pub async fn handle(cmd: RequestCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        RequestCommands::List => {
            let backend = open_backend().await?;
            let pending = backend.requests.list_pending().await?;
            let total_admins = backend.roles.current_administrators().await?.len();

            if pending.is_empty() {
                return output_empty_collection(&output_format, "requests", "No pending requests");
            }

            match output_format {
                OutputFormat::Json => {
                    println!(
                        "{}",
                        serde_json::to_string_pretty(&json!({
                            "total_admins": total_admins,
                            "requests": pending
                        }))?
                    );
                }
                OutputFormat::Text => {
                    println!("{:<38} {:<38} {:<8} {}", "ID", "REQUESTER", "TALLY", "SUBMITTED");
                    println!("{}", "-".repeat(105));
                    for request in &pending {
                        println!(
                            "{:<38} {:<38} {:<8} {}",
                            request.id,
                            request.requester_id,
                            format!("{}/{}", request.approval_count(), total_admins),
                            request.created_at.format("%Y-%m-%d %H:%M")
                        );
                    }
                }
            }
            Ok(())
        }
    }
}
