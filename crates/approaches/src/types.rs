//! Answer result and the approach traits.

use crate::options::RetrievalConfig;
use docqa_core::AppResult;
use serde::{Deserialize, Serialize};

pub use docqa_prompt::ConversationTurn;

/// What every approach returns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerResult {
    /// Generated answer text
    pub answer: String,

    /// Snippets given to the generator, as `source: text`
    pub data_points: Vec<String>,

    /// HTML-flavored trace of the search query and the prompt or reasoning
    pub thoughts: String,
}

/// Convert newlines to `<br>` for the thoughts trace.
pub(crate) fn html_lines(text: &str) -> String {
    text.replace('\n', "<br>")
}

/// Single-question approach.
#[async_trait::async_trait]
pub trait AskApproach: Send + Sync {
    async fn run(&self, question: &str, config: &RetrievalConfig) -> AppResult<AnswerResult>;
}

/// Multi-turn approach. The last turn holds the question being asked.
#[async_trait::async_trait]
pub trait ChatApproach: Send + Sync {
    async fn run(
        &self,
        history: &[ConversationTurn],
        config: &RetrievalConfig,
    ) -> AppResult<AnswerResult>;
}
