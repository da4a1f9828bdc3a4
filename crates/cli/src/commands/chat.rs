//! Chat command handler.

use super::request::RequestArgs;
use super::services;
use clap::Args;
use docqa_approaches::{ChatApproach, ChatReadRetrieveRead, ConversationTurn};
use docqa_core::{config::AppConfig, AppError, AppResult};

/// Separates the user message from the assistant reply in `--turn`.
const TURN_SEPARATOR: &str = "=>";

/// Answer the last turn of a conversation
#[derive(Args, Debug)]
pub struct ChatCommand {
    /// Conversation turn as USER or USER=>BOT, oldest first; the last turn is the question
    #[arg(long = "turn", value_name = "TURN", required = true)]
    pub turns: Vec<String>,

    #[command(flatten)]
    pub request: RequestArgs,
}

impl ChatCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing chat command");

        let history = parse_turns(&self.turns)?;
        let retrieval = self.request.retrieval_config(config)?;

        let approach = ChatReadRetrieveRead::new(
            services::retriever(config)?,
            services::llm_client(config)?,
            config.gpt_deployment(),
            config.chatgpt_deployment(),
        );

        let result = approach.run(&history, &retrieval).await?;
        self.request.print_result(&result)
    }
}

fn parse_turns(raw: &[String]) -> AppResult<Vec<ConversationTurn>> {
    raw.iter()
        .map(|turn| {
            let turn = match turn.split_once(TURN_SEPARATOR) {
                Some((user, bot)) => ConversationTurn::exchange(user.trim(), bot.trim()),
                None => ConversationTurn::question(turn.trim()),
            };
            if turn.user.is_empty() {
                return Err(AppError::Config("Conversation turns need a user message".to_string()));
            }
            Ok(turn)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_turns() {
        let turns = parse_turns(&[
            "What is covered? => Eye exams.".to_string(),
            "How often?".to_string(),
        ])
        .unwrap();

        assert_eq!(
            turns,
            vec![
                ConversationTurn::exchange("What is covered?", "Eye exams."),
                ConversationTurn::question("How often?"),
            ]
        );
    }

    #[test]
    fn test_parse_turns_rejects_empty_user() {
        assert!(parse_turns(&["=> reply".to_string()]).is_err());
    }
}
