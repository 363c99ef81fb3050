use clap::Subcommand;

use crate::cli::utils::output_success;
use crate::cli::OutputFormat;
use crate::config::config;
use crate::database::DatabaseManager;

#[derive(Subcommand)]
pub enum InitCommands {
    #[command(about = "Create tables and indexes (idempotent)")]
    Schema,
}

pub async fn handle(cmd: InitCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        InitCommands::Schema => {
            let pool = DatabaseManager::main_pool(&config().database).await?;
            DatabaseManager::apply_schema(&pool).await?;
            output_success(&output_format, "Database schema is up to date", None)
        }
    }
}
