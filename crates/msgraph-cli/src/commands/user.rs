//! User commands
//!
//! `msgraph user get <USER> [PROPERTY...]` fetches a single user and prints
//! the properties Graph returned.

use anyhow::{Context, Result};
use clap::Subcommand;
use msgraph::GraphApi;
use tracing::debug;

use crate::output::{get_formatter, OutputFormat};

#[derive(Debug, Subcommand)]
pub enum UserCommand {
    /// Get a user by ID or user principal name
    Get {
        /// Object ID or user principal name
        user: String,
        /// Properties to select; all default properties when omitted
        properties: Vec<String>,
    },
}

impl UserCommand {
    pub async fn execute(&self, api: &GraphApi, format: OutputFormat) -> Result<()> {
        match self {
            UserCommand::Get { user, properties } => {
                let properties: Vec<&str> = properties.iter().map(String::as_str).collect();
                debug!(user = %user, properties = ?properties, "Getting user");

                let record = api
                    .get_user(user, &properties)
                    .await
                    .with_context(|| format!("Failed to get user {}", user))?;
                let value = serde_json::to_value(&record).context("Failed to encode user")?;

                get_formatter(format).print_record(&value);
                Ok(())
            }
        }
    }
}
