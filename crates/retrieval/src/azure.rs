//! Azure Cognitive Search client.
//!
//! REST API: https://learn.microsoft.com/rest/api/searchservice/documents/search-post

use crate::search::{QueryMode, SearchClient, SearchDocument, SearchRequest};
use docqa_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SearchBody<'a> {
    search: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    filter: Option<&'a str>,
    top: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    query_type: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    query_language: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    speller: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    semantic_configuration: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    captions: Option<&'a str>,
}

impl<'a> SearchBody<'a> {
    /// `queryLanguage` and `speller` exist only in preview API versions.
    fn from_request(request: &'a SearchRequest, preview: bool) -> Self {
        let mut body = Self {
            search: &request.query,
            filter: request.filter.as_deref(),
            top: request.top,
            query_type: None,
            query_language: None,
            speller: None,
            semantic_configuration: None,
            captions: None,
        };

        if let QueryMode::Semantic(semantic) = &request.mode {
            body.query_type = Some("semantic");
            if preview {
                body.query_language = Some(&semantic.language);
                body.speller = Some(&semantic.speller);
            }
            body.semantic_configuration = Some(&semantic.configuration);
            body.captions = semantic.captions.as_deref();
        }

        body
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    value: Vec<SearchDocument>,
}

/// Client for one Azure Cognitive Search index.
pub struct AzureSearchClient {
    endpoint: String,
    index: String,
    api_key: String,
    api_version: String,
    client: reqwest::Client,
}

impl AzureSearchClient {
    pub fn new(
        endpoint: impl Into<String>,
        index: impl Into<String>,
        api_key: impl Into<String>,
        api_version: impl Into<String>,
    ) -> Self {
        Self {
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            index: index.into(),
            api_key: api_key.into(),
            api_version: api_version.into(),
            client: reqwest::Client::new(),
        }
    }

    fn is_preview(&self) -> bool {
        self.api_version.to_ascii_lowercase().ends_with("-preview")
    }

    fn search_url(&self) -> String {
        format!(
            "{}/indexes/{}/docs/search?api-version={}",
            self.endpoint, self.index, self.api_version
        )
    }
}

#[async_trait::async_trait]
impl SearchClient for AzureSearchClient {
    async fn search(&self, request: &SearchRequest) -> AppResult<Vec<SearchDocument>> {
        tracing::debug!(index = %self.index, top = request.top, "Querying search index");

        let response = self
            .client
            .post(self.search_url())
            .header("api-key", &self.api_key)
            .json(&SearchBody::from_request(request, self.is_preview()))
            .send()
            .await
            .map_err(|e| AppError::Retrieval(format!("Failed to send search request: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::Retrieval(format!(
                "Search API error ({}): {}",
                status, error_text
            )));
        }

        let parsed: SearchResponse = response
            .json()
            .await
            .map_err(|e| AppError::Retrieval(format!("Failed to parse search response: {}", e)))?;

        tracing::debug!("Search returned {} documents", parsed.value.len());

        Ok(parsed.value)
    }
}
