//! Single-turn approach: search once, then answer from the results.

use crate::options::RetrievalConfig;
use crate::types::{html_lines, AnswerResult, AskApproach};
use docqa_core::AppResult;
use docqa_llm::{LlmClient, LlmRequest};
use docqa_prompt::{build_prompt, templates, PromptVars};
use docqa_retrieval::{format_snippets, join_snippets, DocumentRetriever, SnippetStyle};
use std::sync::Arc;

const ANSWER_MAX_TOKENS: u32 = 1024;

pub struct RetrieveThenRead {
    retriever: DocumentRetriever,
    llm: Arc<dyn LlmClient>,
    deployment: String,
}

impl RetrieveThenRead {
    pub fn new(
        retriever: DocumentRetriever,
        llm: Arc<dyn LlmClient>,
        deployment: impl Into<String>,
    ) -> Self {
        Self {
            retriever,
            llm,
            deployment: deployment.into(),
        }
    }
}

#[async_trait::async_trait]
impl AskApproach for RetrieveThenRead {
    async fn run(&self, question: &str, config: &RetrievalConfig) -> AppResult<AnswerResult> {
        tracing::info!("Answering with retrieve-then-read");

        let snippets = self
            .retriever
            .retrieve(question, &config.search, &SnippetStyle::FULL)
            .await?;

        let mut variables = PromptVars::new();
        variables.insert("question", question.to_string());
        variables.insert("sources", join_snippets(&snippets));
        let prompt = build_prompt(
            &config.prompt_override,
            templates::RETRIEVE_THEN_READ,
            variables,
        )?;

        let request = LlmRequest::new(prompt.as_str(), self.deployment.as_str())
            .with_temperature(config.temperature)
            .with_max_tokens(ANSWER_MAX_TOKENS)
            .with_n(1)
            .with_stop(["\n"]);
        let response = self.llm.complete(&request).await?;

        Ok(AnswerResult {
            answer: response.content,
            data_points: format_snippets(&snippets),
            thoughts: format!(
                "Question:<br>{}<br><br>Prompt:<br>{}",
                question,
                html_lines(&prompt)
            ),
        })
    }
}
