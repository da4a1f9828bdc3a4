//! Per-request options.
//!
//! Callers pass a loose JSON options map with every request. It is parsed
//! into a fresh `RetrievalConfig`; unknown keys are ignored and absent or
//! falsy keys take their defaults.

use docqa_core::{AppError, AppResult};
use docqa_prompt::PromptTemplate;
use docqa_retrieval::{SearchOptions, DEFAULT_TOP_K};
use serde::Deserialize;
use serde_json::{Map, Value};

/// Parsed request options.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RetrievalConfig {
    /// Ranking, caption, filter, and result-cap settings
    pub search: SearchOptions,

    /// Sampling temperature for answer generation
    pub temperature: f32,

    /// Answer prompt selection
    pub prompt_override: PromptTemplate,

    /// Ask the chat answer for follow-up question suggestions
    pub suggest_followup_questions: bool,

    /// Agent instruction prefix replacing the built-in one
    pub prompt_template_prefix: Option<String>,

    /// Agent suffix replacing the built-in one
    pub prompt_template_suffix: Option<String>,

    /// Agent iteration budget overriding the configured one
    pub max_iterations: Option<usize>,
}

/// Options map as sent by callers.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawOptions {
    semantic_captions: Option<bool>,
    top: Option<i64>,
    exclude_category: Option<String>,
    semantic_ranker: Option<bool>,
    temperature: Option<f32>,
    prompt_template: Option<PromptTemplate>,
    suggest_followup_questions: Option<bool>,
    prompt_template_prefix: Option<String>,
    prompt_template_suffix: Option<String>,
    max_iterations: Option<usize>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}

impl RetrievalConfig {
    /// Parse an options map.
    ///
    /// # Errors
    /// Returns `AppError::Config` when a recognized key has the wrong type.
    pub fn from_options(options: &Map<String, Value>) -> AppResult<Self> {
        let raw: RawOptions = serde_json::from_value(Value::Object(options.clone()))
            .map_err(|e| AppError::Config(format!("Invalid request options: {}", e)))?;

        let top_k = raw
            .top
            .filter(|top| *top >= 1)
            .map(|top| top as usize)
            .unwrap_or(DEFAULT_TOP_K);

        let prompt_override = match raw.prompt_template {
            Some(PromptTemplate::Replace(text)) if text.is_empty() => PromptTemplate::Default,
            Some(template) => template,
            None => PromptTemplate::Default,
        };

        Ok(Self {
            search: SearchOptions {
                use_semantic_captions: raw.semantic_captions.unwrap_or(false),
                top_k,
                exclude_category: non_empty(raw.exclude_category),
                semantic_ranker: raw.semantic_ranker.unwrap_or(false),
            },
            temperature: raw.temperature.unwrap_or(0.0),
            prompt_override,
            suggest_followup_questions: raw.suggest_followup_questions.unwrap_or(false),
            prompt_template_prefix: non_empty(raw.prompt_template_prefix),
            prompt_template_suffix: non_empty(raw.prompt_template_suffix),
            max_iterations: raw.max_iterations.filter(|n| *n >= 1),
        })
    }

    /// Parse any JSON value; `null` yields the defaults.
    pub fn from_value(value: &Value) -> AppResult<Self> {
        match value {
            Value::Null => Ok(Self::default()),
            Value::Object(map) => Self::from_options(map),
            other => Err(AppError::Config(format!(
                "Request options must be a JSON object, got: {}",
                other
            ))),
        }
    }
}
