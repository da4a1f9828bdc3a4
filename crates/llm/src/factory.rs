//! Completion provider factory.
//!
//! Builds an `LlmClient` from a provider name, an optional endpoint, and an
//! optional API key.

use crate::client::LlmClient;
use crate::providers::{AzureOpenAiClient, OllamaClient};
use crate::types::ProviderType;
use docqa_core::config::{AppConfig, ProviderConfig};
use std::sync::Arc;
use std::time::Duration;

/// Create a completion client based on the provider name.
///
/// # Arguments
/// * `provider` - Provider identifier ("ollama", "azure-openai")
/// * `endpoint` - Optional custom endpoint URL (required for Azure OpenAI)
/// * `api_key` - Optional API key (required for Azure OpenAI)
///
/// # Errors
/// Returns an error message if the provider is unknown or a required
/// endpoint or key is missing.
pub fn create_client(
    provider: &str,
    endpoint: Option<&str>,
    api_key: Option<&str>,
) -> Result<Arc<dyn LlmClient>, String> {
    match ProviderType::parse(provider) {
        Some(ProviderType::Ollama) => {
            let base_url = endpoint.unwrap_or("http://localhost:11434");
            Ok(Arc::new(OllamaClient::with_base_url(base_url)))
        }
        Some(ProviderType::AzureOpenAI) => {
            let api_key = api_key.ok_or("Azure OpenAI provider requires API key")?;
            let endpoint = endpoint.ok_or("Azure OpenAI provider requires an endpoint")?;
            Ok(Arc::new(AzureOpenAiClient::new(endpoint, api_key)))
        }
        None => Err(format!("Unknown provider: {}", provider)),
    }
}

/// Create the completion client for the configured active provider.
///
/// Applies provider-specific settings (Ollama timeout, Azure API version)
/// that `create_client` does not take.
pub fn create_client_from_config(config: &AppConfig) -> Result<Arc<dyn LlmClient>, String> {
    let api_key = config.resolve_api_key(&config.provider);

    match config.get_provider_config(&config.provider) {
        Some(ProviderConfig::Ollama {
            endpoint,
            timeout: Some(secs),
            ..
        }) => {
            let client = OllamaClient::with_timeout(endpoint.as_str(), Duration::from_secs(*secs))
                .map_err(|e| e.to_string())?;
            Ok(Arc::new(client))
        }
        Some(ProviderConfig::AzureOpenAI {
            endpoint,
            api_version: Some(version),
            ..
        }) => {
            let api_key = api_key.ok_or("Azure OpenAI provider requires API key")?;
            let client = AzureOpenAiClient::new(endpoint.as_str(), api_key)
                .with_api_version(version.as_str());
            Ok(Arc::new(client))
        }
        other => create_client(
            &config.provider,
            other.map(ProviderConfig::endpoint),
            api_key.as_deref(),
        ),
    }
}
