//! Azure OpenAI completions provider.
//!
//! Calls the legacy `completions` endpoint of a named deployment; the
//! request's `model` field is the deployment name.

use crate::client::{LlmClient, LlmRequest, LlmResponse, LlmUsage};
use docqa_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};

/// Default REST API version for completions.
pub const DEFAULT_API_VERSION: &str = "2022-12-01";

#[derive(Debug, Serialize)]
struct CompletionBody {
    prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    n: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    stop: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    model: Option<String>,
    choices: Vec<CompletionChoice>,
    #[serde(default)]
    usage: Option<CompletionUsage>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    text: String,
}

#[derive(Debug, Deserialize)]
struct CompletionUsage {
    #[serde(default)]
    prompt_tokens: u32,
    #[serde(default)]
    completion_tokens: u32,
}

/// Azure OpenAI completion client.
pub struct AzureOpenAiClient {
    endpoint: String,
    api_key: String,
    api_version: String,
    client: reqwest::Client,
}

impl AzureOpenAiClient {
    /// Create a client for `endpoint` (e.g. `https://myres.openai.azure.com`).
    pub fn new(endpoint: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            api_version: DEFAULT_API_VERSION.to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// Override the REST API version.
    pub fn with_api_version(mut self, api_version: impl Into<String>) -> Self {
        self.api_version = api_version.into();
        self
    }

    fn completions_url(&self, deployment: &str) -> String {
        format!(
            "{}/openai/deployments/{}/completions?api-version={}",
            self.endpoint, deployment, self.api_version
        )
    }

    fn to_body(request: &LlmRequest) -> CompletionBody {
        CompletionBody {
            prompt: request.prompt.clone(),
            max_tokens: request.max_tokens,
            temperature: request.temperature,
            n: request.n,
            stop: if request.stop.is_empty() {
                None
            } else {
                Some(request.stop.clone())
            },
        }
    }

    fn convert_response(deployment: &str, response: CompletionResponse) -> AppResult<LlmResponse> {
        let usage = response
            .usage
            .map(|u| LlmUsage::new(u.prompt_tokens, u.completion_tokens))
            .unwrap_or_default();

        let first = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| AppError::Llm("Completion returned no choices".to_string()))?;

        Ok(LlmResponse {
            content: first.text,
            model: response.model.unwrap_or_else(|| deployment.to_string()),
            usage,
        })
    }
}

#[async_trait::async_trait]
impl LlmClient for AzureOpenAiClient {
    fn provider_name(&self) -> &str {
        "azure-openai"
    }

    async fn complete(&self, request: &LlmRequest) -> AppResult<LlmResponse> {
        tracing::debug!(deployment = %request.model, "Sending completion request to Azure OpenAI");

        let response = self
            .client
            .post(self.completions_url(&request.model))
            .header("api-key", &self.api_key)
            .json(&Self::to_body(request))
            .send()
            .await
            .map_err(|e| AppError::Llm(format!("Failed to send request to Azure OpenAI: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::Llm(format!(
                "Azure OpenAI API error ({}): {}",
                status, error_text
            )));
        }

        let parsed: CompletionResponse = response
            .json()
            .await
            .map_err(|e| AppError::Llm(format!("Failed to parse Azure OpenAI response: {}", e)))?;

        Self::convert_response(&request.model, parsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completions_url() {
        let client = AzureOpenAiClient::new("https://res.openai.azure.com/", "key");
        assert_eq!(
            client.completions_url("davinci"),
            "https://res.openai.azure.com/openai/deployments/davinci/completions?api-version=2022-12-01"
        );
    }

    #[test]
    fn test_body_omits_empty_stop() {
        let request = LlmRequest::new("prompt", "davinci").with_max_tokens(1024);
        let json = serde_json::to_value(AzureOpenAiClient::to_body(&request)).unwrap();
        assert!(json.get("stop").is_none());
        assert_eq!(json["n"], 1);
        assert_eq!(json["max_tokens"], 1024);
    }

    #[test]
    fn test_convert_takes_first_choice() {
        let parsed: CompletionResponse = serde_json::from_str(
            r#"{"choices":[{"text":"first"},{"text":"second"}],"usage":{"prompt_tokens":3,"completion_tokens":1}}"#,
        )
        .unwrap();

        let response = AzureOpenAiClient::convert_response("davinci", parsed).unwrap();
        assert_eq!(response.content, "first");
        assert_eq!(response.model, "davinci");
        assert_eq!(response.usage.total_tokens, 4);
    }

    #[test]
    fn test_convert_no_choices_is_error() {
        let parsed: CompletionResponse = serde_json::from_str(r#"{"choices":[]}"#).unwrap();
        assert!(AzureOpenAiClient::convert_response("davinci", parsed).is_err());
    }
}
