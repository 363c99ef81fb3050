use serde_json::{json, Value};

use crate::cli::OutputFormat;
use crate::config::config;
use crate::database::Backend;
use crate::services::AdminService;

/// Open the configured storage backend for a one-shot command
pub async fn open_backend() -> anyhow::Result<Backend> {
    Ok(Backend::from_config(config()).await?)
}

/// Admin service over a fresh lock table. Lock state is per process, which is
/// fine for commands that never race a vote.
pub async fn open_admin_service() -> anyhow::Result<AdminService> {
    let backend = open_backend().await?;
    Ok(AdminService::new(&backend, Default::default()))
}

/// Output a success message in the appropriate format
pub fn output_success(output_format: &OutputFormat, message: &str, data: Option<Value>) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut response = json!({
                "success": true,
                "message": message
            });
            if let Some(data) = data {
                response["data"] = data;
            }
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Text => {
            println!("✓ {}", message);
        }
    }
    Ok(())
}

/// Output an empty collection in the appropriate format
pub fn output_empty_collection(output_format: &OutputFormat, collection_name: &str, message: &str) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&json!({ collection_name: [] }))?);
        }
        OutputFormat::Text => {
            println!("{}", message);
        }
    }
    Ok(())
}
