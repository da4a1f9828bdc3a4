//! Prompt system for docqa.
//!
//! This crate provides:
//! - Built-in answer, query-rewrite, and agent templates
//! - Handlebars template rendering with default/inject/replace selection
//! - Conversation history serialization under a size budget
//! - YAML prompt definitions loaded from the workspace

pub mod builder;
pub mod history;
pub mod loader;
pub mod templates;
pub mod types;

// Re-export main types
pub use builder::{
    assemble_agent_template, build_prompt, injected_text, render_template, PromptVars,
};
pub use history::{format_chat_history, ConversationTurn, DEFAULT_HISTORY_TOKENS};
pub use loader::{list_prompts, load_prompt};
pub use types::{PromptDefinition, PromptTemplate, TemplateMode, INJECT_MARKER};
