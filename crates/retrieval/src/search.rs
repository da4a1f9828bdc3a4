//! Search capability abstraction.
//!
//! A `SearchClient` runs one ranked query against a document index. The
//! request shape mirrors what the answer approaches need: an optional filter
//! expression, plain or semantic ranking, and a result cap.

use docqa_core::AppResult;
use serde::{Deserialize, Serialize};

/// Language used for semantic ranking.
pub const SEMANTIC_LANGUAGE: &str = "en-us";

/// Speller applied to semantic queries.
pub const SEMANTIC_SPELLER: &str = "lexicon";

/// Semantic ranking profile configured on the index.
pub const SEMANTIC_CONFIGURATION: &str = "default";

/// Caption mode requesting plain extractive captions.
pub const EXTRACTIVE_CAPTIONS: &str = "extractive|highlight-false";

/// Semantic ranking parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SemanticOptions {
    pub language: String,
    pub speller: String,
    pub configuration: String,
    /// Caption mode, `None` when captions are not requested
    pub captions: Option<String>,
}

impl SemanticOptions {
    /// The fixed semantic profile, optionally with extractive captions.
    pub fn standard(with_captions: bool) -> Self {
        Self {
            language: SEMANTIC_LANGUAGE.to_string(),
            speller: SEMANTIC_SPELLER.to_string(),
            configuration: SEMANTIC_CONFIGURATION.to_string(),
            captions: with_captions.then(|| EXTRACTIVE_CAPTIONS.to_string()),
        }
    }
}

/// Ranking mode for a query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum QueryMode {
    /// Plain keyword ranking
    Simple,
    /// Language-aware re-ranking
    Semantic(SemanticOptions),
}

/// One search call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchRequest {
    pub query: String,
    pub filter: Option<String>,
    pub mode: QueryMode,
    pub top: usize,
}

/// An extractive highlight returned by semantic ranking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Caption {
    pub text: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub highlights: Option<String>,
}

/// A ranked document: its raw fields plus any captions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchDocument {
    #[serde(rename = "@search.captions", default, skip_serializing_if = "Option::is_none")]
    pub captions: Option<Vec<Caption>>,

    #[serde(flatten)]
    pub fields: serde_json::Map<String, serde_json::Value>,
}

impl SearchDocument {
    /// Build a document from `(field, value)` string pairs.
    pub fn from_fields<'a>(fields: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        Self {
            captions: None,
            fields: fields
                .into_iter()
                .map(|(k, v)| (k.to_string(), serde_json::Value::String(v.to_string())))
                .collect(),
        }
    }

    /// Attach captions.
    pub fn with_captions<'a>(mut self, captions: impl IntoIterator<Item = &'a str>) -> Self {
        self.captions = Some(
            captions
                .into_iter()
                .map(|text| Caption {
                    text: text.to_string(),
                    highlights: None,
                })
                .collect(),
        );
        self
    }

    /// A field rendered as text: strings verbatim, other JSON values serialized.
    pub fn field_text(&self, name: &str) -> Option<String> {
        self.fields.get(name).map(|value| match value {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        })
    }
}

/// Build the exclusion filter for a category value.
///
/// Single quotes are doubled so the value cannot terminate the string literal.
pub fn exclusion_filter(category_field: &str, excluded: &str) -> String {
    format!("{} ne '{}'", category_field, excluded.replace('\'', "''"))
}

/// The search capability consumed by the document retriever.
#[async_trait::async_trait]
pub trait SearchClient: Send + Sync {
    /// Run one query and return documents in ranking order.
    ///
    /// # Errors
    /// Transport, auth, and malformed-filter failures surface as
    /// `AppError::Retrieval`.
    async fn search(&self, request: &SearchRequest) -> AppResult<Vec<SearchDocument>>;
}

/// In-memory search client returning a fixed result list.
///
/// Every request is recorded; results are truncated to `top`.
#[cfg(any(test, feature = "testing"))]
#[derive(Debug, Default)]
pub struct MemorySearchClient {
    documents: Vec<SearchDocument>,
    requests: std::sync::Mutex<Vec<SearchRequest>>,
}

#[cfg(any(test, feature = "testing"))]
impl MemorySearchClient {
    pub fn new(documents: Vec<SearchDocument>) -> Self {
        Self {
            documents,
            requests: std::sync::Mutex::new(Vec::new()),
        }
    }

    /// Requests received so far, oldest first.
    pub fn requests(&self) -> Vec<SearchRequest> {
        self.requests
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }
}

#[cfg(any(test, feature = "testing"))]
#[async_trait::async_trait]
impl SearchClient for MemorySearchClient {
    async fn search(&self, request: &SearchRequest) -> AppResult<Vec<SearchDocument>> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request.clone());
        }
        Ok(self.documents.iter().take(request.top).cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exclusion_filter_plain() {
        assert_eq!(exclusion_filter("category", "forms"), "category ne 'forms'");
    }

    #[test]
    fn test_exclusion_filter_doubles_quotes() {
        let excluded = "it's a 'test'";
        let filter = exclusion_filter("category", excluded);

        assert_eq!(filter, "category ne 'it''s a ''test'''");

        let quotes_in = excluded.matches('\'').count();
        let literal = &filter["category ne '".len()..filter.len() - 1];
        assert_eq!(literal.matches('\'').count(), quotes_in * 2);

        // Outside of doubled pairs, no lone quote remains inside the literal.
        assert!(!literal.replace("''", "").contains('\''));
    }

    #[test]
    fn test_semantic_options() {
        let with = SemanticOptions::standard(true);
        assert_eq!(with.captions.as_deref(), Some(EXTRACTIVE_CAPTIONS));
        assert_eq!(with.language, "en-us");

        let without = SemanticOptions::standard(false);
        assert!(without.captions.is_none());
    }

    #[test]
    fn test_document_deserialization() {
        let json = r#"{
            "@search.score": 1.5,
            "sourcepage": "plan.pdf#page=2",
            "content": "Coverage text",
            "@search.captions": [{"text": "Coverage", "highlights": ""}]
        }"#;

        let doc: SearchDocument = serde_json::from_str(json).unwrap();
        assert_eq!(doc.field_text("sourcepage").as_deref(), Some("plan.pdf#page=2"));
        assert_eq!(doc.field_text("@search.score").as_deref(), Some("1.5"));
        assert_eq!(doc.captions.unwrap()[0].text, "Coverage");
    }

    #[tokio::test]
    async fn test_memory_client_records_and_truncates() {
        let client = MemorySearchClient::new(vec![
            SearchDocument::from_fields([("sourcepage", "a")]),
            SearchDocument::from_fields([("sourcepage", "b")]),
        ]);

        let request = SearchRequest {
            query: "q".to_string(),
            filter: None,
            mode: QueryMode::Simple,
            top: 1,
        };
        let docs = client.search(&request).await.unwrap();

        assert_eq!(docs.len(), 1);
        assert_eq!(client.requests(), vec![request]);
    }
}
