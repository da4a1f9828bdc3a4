//! Prompt types for docqa.

use serde::{Deserialize, Deserializer, Serialize};

/// Marker that turns a raw `prompt_template` string into an addendum.
pub const INJECT_MARKER: &str = ">>>";

/// How a caller-supplied template combines with a built-in one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemplateMode {
    /// Text is appended into the built-in template's injection slot
    Inject,
    /// Text replaces the built-in template entirely
    Replace,
}

/// Prompt selection for one request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "mode", content = "text", rename_all = "lowercase")]
pub enum PromptTemplate {
    /// The built-in template, nothing injected
    #[default]
    Default,
    /// The built-in template with an addendum in its `{{injected_prompt}}` slot
    Inject(String),
    /// A full caller template rendered with the same variables
    Replace(String),
}

impl PromptTemplate {
    /// Interpret a raw options string: a leading `>>>` injects, anything else replaces.
    pub fn from_raw(raw: &str) -> Self {
        match raw.strip_prefix(INJECT_MARKER) {
            Some(addendum) => Self::Inject(addendum.to_string()),
            None => Self::Replace(raw.to_string()),
        }
    }

    /// Build from an explicit mode and text.
    pub fn with_mode(mode: TemplateMode, text: impl Into<String>) -> Self {
        match mode {
            TemplateMode::Inject => Self::Inject(text.into()),
            TemplateMode::Replace => Self::Replace(text.into()),
        }
    }
}

/// Wire forms accepted for `prompt_template` in an options map.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawPromptTemplate {
    Tagged { mode: TemplateMode, text: String },
    Raw(String),
}

impl<'de> Deserialize<'de> for PromptTemplate {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match RawPromptTemplate::deserialize(deserializer)? {
            RawPromptTemplate::Tagged { mode, text } => Self::with_mode(mode, text),
            RawPromptTemplate::Raw(raw) => Self::from_raw(&raw),
        })
    }
}

/// A prompt definition loaded from YAML.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptDefinition {
    /// Unique prompt identifier
    pub id: String,

    /// Human-readable title
    pub title: String,

    /// API version for schema evolution
    #[serde(rename = "apiVersion")]
    pub api_version: String,

    /// How the template combines with the built-in one
    #[serde(default = "default_mode")]
    pub mode: TemplateMode,

    /// Template string with Handlebars syntax
    pub template: String,
}

fn default_mode() -> TemplateMode {
    TemplateMode::Replace
}

impl PromptDefinition {
    /// Convert into the per-request template selection.
    pub fn into_template(self) -> PromptTemplate {
        PromptTemplate::with_mode(self.mode, self.template)
    }
}
