//! Test doubles shared by the approach tests.

use docqa_core::{AppError, AppResult};
use docqa_llm::{LlmClient, LlmRequest, LlmResponse, LlmUsage};
use docqa_retrieval::{MemorySearchClient, SearchDocument};
use std::collections::VecDeque;
use std::sync::Mutex;

enum Script {
    Queue(VecDeque<String>),
    Repeat(String),
    Fail,
}

/// Generator returning scripted completions and recording every request.
pub struct ScriptedLlm {
    script: Mutex<Script>,
    requests: Mutex<Vec<LlmRequest>>,
}

impl ScriptedLlm {
    pub fn new<I, S>(responses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::with_script(Script::Queue(responses.into_iter().map(Into::into).collect()))
    }

    pub fn repeating(response: impl Into<String>) -> Self {
        Self::with_script(Script::Repeat(response.into()))
    }

    pub fn failing() -> Self {
        Self::with_script(Script::Fail)
    }

    fn with_script(script: Script) -> Self {
        Self {
            script: Mutex::new(script),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<LlmRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl LlmClient for ScriptedLlm {
    fn provider_name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, request: &LlmRequest) -> AppResult<LlmResponse> {
        self.requests.lock().unwrap().push(request.clone());

        let content = match &mut *self.script.lock().unwrap() {
            Script::Queue(queue) => queue
                .pop_front()
                .ok_or_else(|| AppError::Llm("Script exhausted".to_string()))?,
            Script::Repeat(text) => text.clone(),
            Script::Fail => return Err(AppError::Llm("Generator unavailable".to_string())),
        };

        Ok(LlmResponse {
            content,
            model: request.model.clone(),
            usage: LlmUsage::default(),
        })
    }
}

pub fn doc(source: &str, content: &str) -> SearchDocument {
    SearchDocument::from_fields([("sourcepage", source), ("content", content)])
}

/// Index with two benefit documents.
pub fn benefits_index() -> MemorySearchClient {
    MemorySearchClient::new(vec![
        doc("benefits-1.pdf", "The deductible is $500 per year."),
        doc("benefits-2.pdf", "Eye exams are covered once a year."),
    ])
}
