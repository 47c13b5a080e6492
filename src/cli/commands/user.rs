use clap::Subcommand;
use serde_json::json;

use crate::cli::utils::output_success;
use crate::cli::OutputFormat;
use crate::database::{DatabaseManager, EntityStore, PgStore};

#[derive(Subcommand)]
pub enum UserCommands {
    #[command(about = "Create a user account")]
    Create {
        #[arg(help = "Unique username")]
        username: String,
    },
}

pub async fn handle(cmd: UserCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        UserCommands::Create { username } => {
            let store = PgStore::new(DatabaseManager::connect().await?);
            let user = store.create_user(&username).await?;

            output_success(
                &output_format,
                &format!("Created user '{}' with id {}", user.username, user.id),
                Some(json!({ "user": user })),
            )
        }
    }
}
