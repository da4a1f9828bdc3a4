//! Prompt rendering.

use crate::types::PromptTemplate;
use docqa_core::{AppError, AppResult};
use handlebars::Handlebars;
use std::collections::HashMap;

/// Template variables keyed by placeholder name.
pub type PromptVars<'a> = HashMap<&'a str, String>;

/// Render a prompt for one request.
///
/// `Default` renders `builtin` with an empty injection slot, `Inject` renders
/// `builtin` with the addendum in `{{injected_prompt}}`, and `Replace` renders
/// the caller template with the same variables.
///
/// # Example
/// ```
/// use docqa_prompt::{build_prompt, PromptTemplate, PromptVars};
///
/// let mut vars = PromptVars::new();
/// vars.insert("question", "What is covered?".to_string());
///
/// let prompt = build_prompt(&PromptTemplate::Default, "Q: {{question}}{{injected_prompt}}", vars)?;
/// assert_eq!(prompt, "Q: What is covered?");
/// # Ok::<(), docqa_core::AppError>(())
/// ```
pub fn build_prompt(
    template: &PromptTemplate,
    builtin: &str,
    mut variables: PromptVars<'_>,
) -> AppResult<String> {
    match template {
        PromptTemplate::Default => {
            variables.insert("injected_prompt", String::new());
            render_template(builtin, &variables)
        }
        PromptTemplate::Inject(addendum) => {
            tracing::debug!("Injecting {} chars into built-in prompt", addendum.len());
            variables.insert("injected_prompt", injected_text(template));
            render_template(builtin, &variables)
        }
        PromptTemplate::Replace(custom) => {
            tracing::debug!("Rendering caller-supplied prompt template");
            variables.entry("injected_prompt").or_default();
            render_template(custom, &variables)
        }
    }
}

/// Value of the `{{injected_prompt}}` slot: the addendum plus a newline for
/// `Inject`, empty otherwise.
pub fn injected_text(template: &PromptTemplate) -> String {
    match template {
        PromptTemplate::Inject(addendum) => format!("{}\n", addendum),
        PromptTemplate::Default | PromptTemplate::Replace(_) => String::new(),
    }
}

/// Render a Handlebars template with variables.
///
/// Missing variables render as empty strings; values are never escaped.
pub fn render_template(template: &str, variables: &PromptVars<'_>) -> AppResult<String> {
    let mut handlebars = Handlebars::new();

    handlebars.register_escape_fn(handlebars::no_escape);

    handlebars
        .register_template_string("prompt", template)
        .map_err(|e| AppError::Prompt(format!("Failed to register template: {}", e)))?;

    handlebars
        .render("prompt", variables)
        .map_err(|e| AppError::Prompt(format!("Failed to render template: {}", e)))
}

/// Assemble the agent template from its prefix, tool list, and suffix.
///
/// The result still contains the `{{question}}` and `{{scratchpad}}`
/// placeholders of the suffix plus `{{tool_names}}` from the format block.
pub fn assemble_agent_template(
    prefix: &str,
    tools: &[(&str, &str)],
    format_instructions: &str,
    suffix: &str,
) -> String {
    let tool_lines = tools
        .iter()
        .map(|(name, description)| format!("{}: {}", name, description))
        .collect::<Vec<_>>()
        .join("\n");

    [prefix, tool_lines.as_str(), format_instructions, suffix].join("\n\n")
}
