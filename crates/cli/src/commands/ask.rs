//! Ask command handler.
//!
//! Answers one question with retrieve-then-read or the iterative agent.

use super::request::RequestArgs;
use super::services;
use clap::{Args, ValueEnum};
use docqa_approaches::{AskApproach, ReadRetrieveRead, RetrieveThenRead};
use docqa_core::{config::AppConfig, AppResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum AskStrategy {
    /// Retrieve once, then answer
    Rtr,
    /// Iterate over search and lookup tools
    Rrr,
}

/// Ask a question about the indexed documents
#[derive(Args, Debug)]
pub struct AskCommand {
    /// The question to ask
    pub question: String,

    /// Answer strategy
    #[arg(short, long, value_enum, default_value = "rtr")]
    pub approach: AskStrategy,

    #[command(flatten)]
    pub request: RequestArgs,
}

impl AskCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing ask command");
        tracing::debug!("Ask command options: {:?}", self);

        let retrieval = self.request.retrieval_config(config)?;
        let llm = services::llm_client(config)?;

        let approach: Box<dyn AskApproach> = match self.approach {
            AskStrategy::Rtr => Box::new(RetrieveThenRead::new(
                services::retriever(config)?,
                llm,
                config.gpt_deployment(),
            )),
            AskStrategy::Rrr => Box::new(ReadRetrieveRead::new(
                services::agent_tools(config)?,
                llm,
                config.gpt_deployment(),
                config.agent.max_iterations,
            )?),
        };

        let result = approach.run(&self.question, &retrieval).await?;
        self.request.print_result(&result)
    }
}
