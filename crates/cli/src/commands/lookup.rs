//! Lookup command handler.

use super::services;
use clap::Args;
use docqa_core::{config::AppConfig, AppResult};

/// Look up a row of the configured reference table
#[derive(Args, Debug)]
pub struct LookupCommand {
    /// Exact row key
    pub key: String,
}

impl LookupCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing lookup command");

        let table = services::lookup_table(config)?;
        println!("{}", table.lookup(&self.key));
        Ok(())
    }
}
