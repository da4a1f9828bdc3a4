//! Prompts command handler.

use clap::Args;
use docqa_core::{config::AppConfig, AppResult};
use docqa_prompt::list_prompts;

/// List prompt definitions in the workspace
#[derive(Args, Debug)]
pub struct PromptsCommand {}

impl PromptsCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        let ids = list_prompts(&config.workspace)?;
        if ids.is_empty() {
            tracing::info!("No prompt definitions in {:?}", config.docqa_dir());
        }
        for id in ids {
            println!("{}", id);
        }
        Ok(())
    }
}
