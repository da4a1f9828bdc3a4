//! Request options shared by the answering commands.

use clap::Args;
use docqa_approaches::{AnswerResult, RetrievalConfig};
use docqa_core::{config::AppConfig, AppError, AppResult};
use docqa_prompt::load_prompt;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

#[derive(Args, Debug, Default)]
pub struct RequestArgs {
    /// Request option as key=value; values are read as JSON, else as text
    #[arg(long = "option", value_name = "KEY=VALUE")]
    pub options: Vec<String>,

    /// JSON file holding the options map
    #[arg(long)]
    pub options_file: Option<PathBuf>,

    /// Prompt definition ID under .docqa/prompts used as prompt_template
    #[arg(long)]
    pub prompt: Option<String>,

    /// Print the full result as JSON
    #[arg(long)]
    pub json: bool,
}

impl RequestArgs {
    /// Build the options map: file first, then `--option` pairs, then `--prompt`.
    pub fn options_map(&self, config: &AppConfig) -> AppResult<Map<String, Value>> {
        let mut options = match &self.options_file {
            Some(path) => read_options_file(path)?,
            None => Map::new(),
        };

        for pair in &self.options {
            let (key, value) = parse_option(pair)?;
            options.insert(key, value);
        }

        if let Some(prompt_id) = &self.prompt {
            let definition = load_prompt(&config.workspace, prompt_id)?;
            tracing::debug!("Using prompt definition '{}'", definition.id);
            let template = serde_json::to_value(definition.into_template())?;
            options.insert("prompt_template".to_string(), template);
        }

        Ok(options)
    }

    pub fn retrieval_config(&self, config: &AppConfig) -> AppResult<RetrievalConfig> {
        RetrievalConfig::from_options(&self.options_map(config)?)
    }

    /// Print the answer, or the whole result with `--json`.
    pub fn print_result(&self, result: &AnswerResult) -> AppResult<()> {
        if self.json {
            let json = serde_json::to_string_pretty(result)?;
            println!("{}", json);
        } else {
            println!("{}", result.answer);
            tracing::debug!("Data points: {:?}", result.data_points);
            tracing::debug!("Thoughts: {}", result.thoughts);
        }
        Ok(())
    }
}

fn read_options_file(path: &Path) -> AppResult<Map<String, Value>> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| AppError::Config(format!("Failed to read options file {:?}: {}", path, e)))?;

    match serde_json::from_str::<Value>(&contents)? {
        Value::Object(map) => Ok(map),
        _ => Err(AppError::Config(format!(
            "Options file {:?} must hold a JSON object",
            path
        ))),
    }
}

/// Split `key=value`; the value is JSON when it parses, otherwise a string.
fn parse_option(pair: &str) -> AppResult<(String, Value)> {
    let (key, raw) = pair
        .split_once('=')
        .ok_or_else(|| AppError::Config(format!("Option must be KEY=VALUE: {}", pair)))?;

    let key = key.trim();
    if key.is_empty() {
        return Err(AppError::Config(format!("Option has an empty key: {}", pair)));
    }

    let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
    Ok((key.to_string(), value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use docqa_prompt::PromptTemplate;
    use serde_json::json;

    fn config_in(dir: &std::path::Path) -> AppConfig {
        AppConfig {
            workspace: dir.to_path_buf(),
            ..AppConfig::default()
        }
    }

    #[test]
    fn test_parse_option_typed_values() {
        assert_eq!(parse_option("top=5").unwrap(), ("top".to_string(), json!(5)));
        assert_eq!(
            parse_option("semantic_ranker=true").unwrap(),
            ("semantic_ranker".to_string(), json!(true))
        );
        assert_eq!(
            parse_option("exclude_category=forms").unwrap(),
            ("exclude_category".to_string(), json!("forms"))
        );
        assert_eq!(
            parse_option("prompt_template=>>>a=b").unwrap(),
            ("prompt_template".to_string(), json!(">>>a=b"))
        );
    }

    #[test]
    fn test_parse_option_errors() {
        assert!(parse_option("no-equals").is_err());
        assert!(parse_option("=5").is_err());
    }

    #[test]
    fn test_options_file_then_flags() {
        let temp = tempfile::TempDir::new().unwrap();
        let file = temp.path().join("options.json");
        std::fs::write(&file, r#"{"top": 2, "temperature": 0.5}"#).unwrap();

        let args = RequestArgs {
            options: vec!["top=4".to_string()],
            options_file: Some(file),
            ..RequestArgs::default()
        };

        let config = args.retrieval_config(&config_in(temp.path())).unwrap();
        assert_eq!(config.search.top_k, 4);
        assert_eq!(config.temperature, 0.5);
    }

    #[test]
    fn test_options_file_must_be_object() {
        let temp = tempfile::TempDir::new().unwrap();
        let file = temp.path().join("options.json");
        std::fs::write(&file, "[1, 2]").unwrap();

        let args = RequestArgs {
            options_file: Some(file),
            ..RequestArgs::default()
        };
        assert!(args.options_map(&config_in(temp.path())).is_err());
    }

    #[test]
    fn test_prompt_definition_becomes_template() {
        let temp = tempfile::TempDir::new().unwrap();
        let prompts = temp.path().join(".docqa/prompts");
        std::fs::create_dir_all(&prompts).unwrap();
        std::fs::write(
            prompts.join("answer.french.yml"),
            "id: answer.french\ntitle: French answers\napiVersion: \"1.0\"\nmode: inject\ntemplate: Answer in French.\n",
        )
        .unwrap();

        let args = RequestArgs {
            prompt: Some("answer.french".to_string()),
            ..RequestArgs::default()
        };

        let config = args.retrieval_config(&config_in(temp.path())).unwrap();
        assert_eq!(
            config.prompt_override,
            PromptTemplate::Inject("Answer in French.".to_string())
        );
    }
}
