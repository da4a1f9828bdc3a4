//! Configuration management for docqa.
//!
//! Configuration is merged from several sources, lowest precedence first:
//! - Built-in defaults
//! - Config file (`.docqa/config.yaml` or `DOCQA_CONFIG`)
//! - Environment variables
//! - Command-line flags
//!
//! Per-request answer options (top, temperature, prompt overrides...) are not
//! part of this configuration; they arrive with every call as an options map.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::{AppError, AppResult};

/// Providers the LLM factory knows how to build.
pub const KNOWN_PROVIDERS: [&str; 2] = ["ollama", "azure-openai"];

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Path to the workspace root (contains .docqa/)
    pub workspace: PathBuf,

    /// Optional config file path
    pub config_file: Option<PathBuf>,

    /// Completion provider ("ollama" or "azure-openai")
    pub provider: String,

    /// Default model identifier, used when no deployment is configured
    pub model: String,

    /// API key for the completion provider
    pub api_key: Option<String>,

    /// Log level override
    pub log_level: Option<String>,

    /// Verbose mode (enables debug logging)
    pub verbose: bool,

    /// Disable colored output
    pub no_color: bool,

    /// LLM provider configurations
    pub llm: Option<LlmConfig>,

    /// Model references per generation role
    pub deployments: DeploymentsConfig,

    /// Search service settings
    pub search: Option<SearchConfig>,

    /// Static lookup table settings
    pub lookup: Option<LookupConfig>,

    /// Iterative agent settings
    pub agent: AgentConfig,
}

/// LLM configuration from config.yaml.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(rename = "activeProvider")]
    pub active_provider: String,

    pub providers: HashMap<String, ProviderConfig>,
}

/// Provider-specific configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProviderConfig {
    AzureOpenAI {
        #[serde(rename = "apiKeyEnv")]
        api_key_env: String,
        endpoint: String,
        #[serde(rename = "apiVersion")]
        api_version: Option<String>,
    },
    Ollama {
        endpoint: String,
        model: String,
        timeout: Option<u64>,
    },
}

impl ProviderConfig {
    /// Endpoint URL for this provider.
    pub fn endpoint(&self) -> &str {
        match self {
            Self::AzureOpenAI { endpoint, .. } => endpoint,
            Self::Ollama { endpoint, .. } => endpoint,
        }
    }
}

/// Model references for the two generation roles.
///
/// `gpt` serves single-turn answers, query rewriting, and the agent loop;
/// `chatgpt` serves the chat answer. Both fall back to `AppConfig::model`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeploymentsConfig {
    pub gpt: Option<String>,
    pub chatgpt: Option<String>,
}

/// Search service configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    pub endpoint: String,

    pub index: String,

    #[serde(rename = "apiKeyEnv")]
    pub api_key_env: String,

    #[serde(rename = "apiVersion", default = "default_search_api_version")]
    pub api_version: String,

    /// Document field holding the citation name
    #[serde(rename = "sourcepageField", default = "default_sourcepage_field")]
    pub sourcepage_field: String,

    /// Document field holding the passage text
    #[serde(rename = "contentField", default = "default_content_field")]
    pub content_field: String,

    /// Field used by the exclusion filter
    #[serde(rename = "categoryField", default = "default_category_field")]
    pub category_field: String,
}

/// Preview version: semantic queries send `queryLanguage` and `speller`.
fn default_search_api_version() -> String {
    "2023-10-01-Preview".to_string()
}

fn default_sourcepage_field() -> String {
    "sourcepage".to_string()
}

fn default_content_field() -> String {
    "content".to_string()
}

fn default_category_field() -> String {
    "category".to_string()
}

/// Lookup table configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LookupConfig {
    /// CSV file, relative paths resolve against the workspace
    pub path: PathBuf,

    #[serde(rename = "keyField", default = "default_key_field")]
    pub key_field: String,

    #[serde(rename = "toolName", default = "default_lookup_tool_name")]
    pub tool_name: String,

    #[serde(rename = "toolDescription", default = "default_lookup_tool_description")]
    pub tool_description: String,

    /// Row key the agent's lookup tool is bound to
    pub entity: String,
}

fn default_key_field() -> String {
    "name".to_string()
}

fn default_lookup_tool_name() -> String {
    "Lookup".to_string()
}

fn default_lookup_tool_description() -> String {
    "useful for answering questions about the reference entity and its published facts".to_string()
}

/// Iterative agent configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    #[serde(rename = "maxIterations", default = "default_max_iterations")]
    pub max_iterations: usize,

    #[serde(rename = "searchToolName", default = "default_search_tool_name")]
    pub search_tool_name: String,

    #[serde(
        rename = "searchToolDescription",
        default = "default_search_tool_description"
    )]
    pub search_tool_description: String,
}

fn default_max_iterations() -> usize {
    15
}

fn default_search_tool_name() -> String {
    "Search".to_string()
}

fn default_search_tool_description() -> String {
    "useful for searching the indexed documents for facts relevant to the question".to_string()
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            max_iterations: default_max_iterations(),
            search_tool_name: default_search_tool_name(),
            search_tool_description: default_search_tool_description(),
        }
    }
}

/// Full configuration file structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ConfigFile {
    llm: Option<LlmConfig>,
    workspace: Option<WorkspaceConfig>,
    logging: Option<LoggingConfig>,
    deployments: Option<DeploymentsConfig>,
    search: Option<SearchConfig>,
    lookup: Option<LookupConfig>,
    agent: Option<AgentConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct WorkspaceConfig {
    path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LoggingConfig {
    level: Option<String>,
    color: Option<bool>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            workspace: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            config_file: None,
            provider: "ollama".to_string(),
            model: "llama3.2".to_string(),
            api_key: None,
            log_level: None,
            verbose: false,
            no_color: false,
            llm: None,
            deployments: DeploymentsConfig::default(),
            search: None,
            lookup: None,
            agent: AgentConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables and defaults.
    ///
    /// Environment variables:
    /// - `DOCQA_WORKSPACE`: Override workspace path
    /// - `DOCQA_CONFIG`: Path to config file
    /// - `DOCQA_PROVIDER`: Completion provider
    /// - `DOCQA_MODEL`: Model identifier
    /// - `DOCQA_API_KEY`: API key
    /// - `RUST_LOG`: Log level
    /// - `NO_COLOR`: Disable colored output
    ///
    /// # Example
    /// ```no_run
    /// use docqa_core::config::AppConfig;
    ///
    /// let config = AppConfig::load().expect("Failed to load config");
    /// println!("Workspace: {:?}", config.workspace);
    /// ```
    pub fn load() -> AppResult<Self> {
        Self::load_with(None, None)
    }

    /// Load configuration, with workspace and config file paths taken from
    /// the arguments before the environment.
    pub fn load_with(workspace: Option<PathBuf>, config_file: Option<PathBuf>) -> AppResult<Self> {
        let mut config = Self::default();

        if let Some(workspace) =
            workspace.or_else(|| std::env::var("DOCQA_WORKSPACE").ok().map(PathBuf::from))
        {
            config.workspace = workspace;
        }

        if let Some(config_file) =
            config_file.or_else(|| std::env::var("DOCQA_CONFIG").ok().map(PathBuf::from))
        {
            config.config_file = Some(config_file);
        }

        if !config.workspace.exists() {
            return Err(AppError::Config(format!(
                "Workspace directory does not exist: {:?}",
                config.workspace
            )));
        }

        let config_path = match config.config_file {
            Some(ref cf) => cf.clone(),
            None => config.docqa_dir().join("config.yaml"),
        };

        if config_path.exists() {
            config = config.merge_yaml(&config_path)?;
        }

        // Environment variables override YAML config
        if let Ok(provider) = std::env::var("DOCQA_PROVIDER") {
            config.provider = provider;
        }

        if let Ok(model) = std::env::var("DOCQA_MODEL") {
            config.model = model;
        }

        config.api_key = std::env::var("DOCQA_API_KEY").ok();
        if let Ok(level) = std::env::var("RUST_LOG") {
            config.log_level = Some(level);
        }

        if std::env::var("NO_COLOR").is_ok() {
            config.no_color = true;
        }

        Ok(config)
    }

    /// Merge a YAML configuration file into this config.
    fn merge_yaml(&self, path: &Path) -> AppResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        self.merge_yaml_str(&contents)
            .map_err(|e| AppError::Config(format!("Failed to parse config file {:?}: {}", path, e)))
    }

    fn merge_yaml_str(&self, contents: &str) -> AppResult<Self> {
        let config_file: ConfigFile = serde_yaml::from_str(contents)?;

        let mut result = self.clone();

        if let Some(path) = config_file.workspace.and_then(|ws| ws.path) {
            result.workspace = PathBuf::from(path);
        }

        if let Some(logging) = config_file.logging {
            if let Some(level) = logging.level {
                result.log_level = Some(level);
            }
            if let Some(color) = logging.color {
                result.no_color = !color;
            }
        }

        if let Some(llm) = config_file.llm {
            result.provider = llm.active_provider.clone();

            if let Some(ProviderConfig::Ollama { model, .. }) =
                llm.providers.get(&llm.active_provider)
            {
                result.model = model.clone();
            }

            result.llm = Some(llm);
        }

        if let Some(deployments) = config_file.deployments {
            result.deployments = deployments;
        }

        if let Some(search) = config_file.search {
            result.search = Some(search);
        }

        if let Some(lookup) = config_file.lookup {
            result.lookup = Some(lookup);
        }

        if let Some(agent) = config_file.agent {
            result.agent = agent;
        }

        Ok(result)
    }

    /// Apply CLI overrides to the configuration.
    ///
    /// CLI flags take precedence over environment variables and YAML.
    #[allow(clippy::too_many_arguments)]
    pub fn with_overrides(
        mut self,
        workspace: Option<PathBuf>,
        config_file: Option<PathBuf>,
        provider: Option<String>,
        model: Option<String>,
        log_level: Option<String>,
        verbose: bool,
        no_color: bool,
    ) -> Self {
        if let Some(workspace) = workspace {
            self.workspace = workspace;
        }

        if let Some(config_file) = config_file {
            self.config_file = Some(config_file);
        }

        if let Some(provider) = provider {
            self.provider = provider;
        }

        if let Some(model) = model {
            self.model = model;
        }

        if let Some(log_level) = log_level {
            self.log_level = Some(log_level);
        }

        if verbose {
            self.verbose = true;
            if self.log_level.is_none() {
                self.log_level = Some("debug".to_string());
            }
        }

        if no_color {
            self.no_color = true;
        }

        self
    }

    /// Get the path to the .docqa directory.
    pub fn docqa_dir(&self) -> PathBuf {
        self.workspace.join(".docqa")
    }

    /// Model reference for single-turn answers, query rewriting, and the agent.
    pub fn gpt_deployment(&self) -> &str {
        self.deployments.gpt.as_deref().unwrap_or(&self.model)
    }

    /// Model reference for the chat answer.
    pub fn chatgpt_deployment(&self) -> &str {
        self.deployments.chatgpt.as_deref().unwrap_or(&self.model)
    }

    /// Get the configuration block for a provider.
    pub fn get_provider_config(&self, provider: &str) -> Option<&ProviderConfig> {
        self.llm.as_ref().and_then(|llm| llm.providers.get(provider))
    }

    /// Resolve the completion API key, explicit `DOCQA_API_KEY` first.
    pub fn resolve_api_key(&self, provider: &str) -> Option<String> {
        if let Some(ref key) = self.api_key {
            return Some(key.clone());
        }

        match self.get_provider_config(provider) {
            Some(ProviderConfig::AzureOpenAI { api_key_env, .. }) => std::env::var(api_key_env).ok(),
            _ => None,
        }
    }

    /// Search service settings, or a configuration error if absent.
    pub fn search_config(&self) -> AppResult<&SearchConfig> {
        self.search
            .as_ref()
            .ok_or_else(|| AppError::Config("No 'search' section configured".to_string()))
    }

    /// Resolve the search service API key from its environment variable.
    pub fn resolve_search_api_key(&self) -> AppResult<String> {
        let search = self.search_config()?;
        std::env::var(&search.api_key_env).map_err(|_| {
            AppError::Config(format!(
                "Search API key not found in environment variable: {}",
                search.api_key_env
            ))
        })
    }

    /// Absolute path of the lookup table, resolved against the workspace.
    pub fn lookup_table_path(&self) -> Option<PathBuf> {
        self.lookup.as_ref().map(|lookup| {
            if lookup.path.is_absolute() {
                lookup.path.clone()
            } else {
                self.workspace.join(&lookup.path)
            }
        })
    }

    /// Validate configuration for the active provider.
    pub fn validate(&self) -> AppResult<()> {
        let provider = &self.provider;

        if !KNOWN_PROVIDERS.contains(&provider.as_str()) {
            return Err(AppError::Config(format!(
                "Unknown provider: {}. Supported: {}",
                provider,
                KNOWN_PROVIDERS.join(", ")
            )));
        }

        if let Some(ProviderConfig::AzureOpenAI { api_key_env, .. }) =
            self.get_provider_config(provider)
        {
            if self.api_key.is_none() && std::env::var(api_key_env).is_err() {
                return Err(AppError::Config(format!(
                    "API key not found in environment variable: {}",
                    api_key_env
                )));
            }
        }

        if self.agent.max_iterations == 0 {
            return Err(AppError::Config(
                "agent.maxIterations must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}
