//! Multi-turn approach: rewrite the latest question into a search query,
//! retrieve, then answer with the conversation in the prompt.

use crate::options::RetrievalConfig;
use crate::types::{html_lines, AnswerResult, ChatApproach, ConversationTurn};
use docqa_core::{AppError, AppResult};
use docqa_llm::{LlmClient, LlmRequest};
use docqa_prompt::{
    build_prompt, format_chat_history, render_template, templates, PromptVars,
    DEFAULT_HISTORY_TOKENS,
};
use docqa_retrieval::{format_snippets, join_snippets, DocumentRetriever, SnippetStyle};
use std::sync::Arc;

const QUERY_MAX_TOKENS: u32 = 256;
const ANSWER_MAX_TOKENS: u32 = 1024;
const CHAT_STOP: [&str; 2] = ["<|im_end|>", "<|im_start|>"];

pub struct ChatReadRetrieveRead {
    retriever: DocumentRetriever,
    llm: Arc<dyn LlmClient>,
    /// Serves the query rewrite
    gpt_deployment: String,
    /// Serves the chat answer
    chatgpt_deployment: String,
}

impl ChatReadRetrieveRead {
    pub fn new(
        retriever: DocumentRetriever,
        llm: Arc<dyn LlmClient>,
        gpt_deployment: impl Into<String>,
        chatgpt_deployment: impl Into<String>,
    ) -> Self {
        Self {
            retriever,
            llm,
            gpt_deployment: gpt_deployment.into(),
            chatgpt_deployment: chatgpt_deployment.into(),
        }
    }

    async fn rewrite_query(&self, history: &[ConversationTurn], question: &str) -> AppResult<String> {
        let mut variables = PromptVars::new();
        variables.insert(
            "chat_history",
            format_chat_history(history, false, DEFAULT_HISTORY_TOKENS),
        );
        variables.insert("question", question.to_string());
        let prompt = render_template(templates::QUERY_REWRITE, &variables)?;

        let request = LlmRequest::new(prompt, self.gpt_deployment.as_str())
            .with_temperature(0.0)
            .with_max_tokens(QUERY_MAX_TOKENS)
            .with_n(1)
            .with_stop(["\n"]);
        let response = self.llm.complete(&request).await?;

        let query = response.content.trim();
        if query.is_empty() {
            tracing::warn!("Query rewrite was empty, searching with the question itself");
            return Ok(question.to_string());
        }
        Ok(query.to_string())
    }
}

#[async_trait::async_trait]
impl ChatApproach for ChatReadRetrieveRead {
    async fn run(
        &self,
        history: &[ConversationTurn],
        config: &RetrievalConfig,
    ) -> AppResult<AnswerResult> {
        let last = history
            .last()
            .ok_or_else(|| AppError::Prompt("Chat history has no turns".to_string()))?;

        tracing::info!("Answering turn {} with chat-read-retrieve-read", history.len());

        let query = self.rewrite_query(history, &last.user).await?;
        tracing::debug!(query = %query, "Rewritten search query");

        let snippets = self
            .retriever
            .retrieve(&query, &config.search, &SnippetStyle::FULL)
            .await?;

        let follow_up = if config.suggest_followup_questions {
            templates::FOLLOW_UP_QUESTIONS.to_string()
        } else {
            String::new()
        };

        let mut variables = PromptVars::new();
        variables.insert("sources", join_snippets(&snippets));
        variables.insert(
            "chat_history",
            format_chat_history(history, true, DEFAULT_HISTORY_TOKENS),
        );
        variables.insert("follow_up_questions_prompt", follow_up);
        let prompt = build_prompt(&config.prompt_override, templates::CHAT_ANSWER, variables)?;

        let request = LlmRequest::new(prompt.as_str(), self.chatgpt_deployment.as_str())
            .with_temperature(config.temperature)
            .with_max_tokens(ANSWER_MAX_TOKENS)
            .with_n(1)
            .with_stop(CHAT_STOP);
        let response = self.llm.complete(&request).await?;

        Ok(AnswerResult {
            answer: response.content,
            data_points: format_snippets(&snippets),
            thoughts: format!(
                "Searched for:<br>{}<br><br>Prompt:<br>{}",
                query,
                html_lines(&prompt)
            ),
        })
    }
}
