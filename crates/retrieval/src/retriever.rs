//! Document retriever shared by every answer approach.
//!
//! Turns per-request search options into a `SearchRequest`, runs it, and
//! formats each ranked document as a `source: text` snippet.

use crate::search::{
    exclusion_filter, QueryMode, SearchClient, SearchDocument, SearchRequest, SemanticOptions,
};
use crate::text::nonewlines;
use docqa_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Result cap used when a request does not set one.
pub const DEFAULT_TOP_K: usize = 3;

/// Per-request search options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchOptions {
    pub use_semantic_captions: bool,
    /// Always at least 1
    pub top_k: usize,
    pub exclude_category: Option<String>,
    pub semantic_ranker: bool,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            use_semantic_captions: false,
            top_k: DEFAULT_TOP_K,
            exclude_category: None,
            semantic_ranker: false,
        }
    }
}

impl SearchOptions {
    /// Set the result cap; zero falls back to the default.
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = if top_k == 0 { DEFAULT_TOP_K } else { top_k };
        self
    }
}

/// Index field names read from each document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldMapping {
    pub sourcepage: String,
    pub content: String,
    pub category: String,
}

impl Default for FieldMapping {
    fn default() -> Self {
        Self {
            sourcepage: "sourcepage".to_string(),
            content: "content".to_string(),
            category: "category".to_string(),
        }
    }
}

/// How document text becomes snippet text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnippetStyle {
    /// Joins caption fragments
    pub caption_separator: &'static str,
    /// Character cap on full document text
    pub max_content_chars: Option<usize>,
}

impl SnippetStyle {
    /// Full text, captions joined with " . ".
    pub const FULL: SnippetStyle = SnippetStyle {
        caption_separator: " . ",
        max_content_chars: None,
    };

    /// Short text for tool observations: 250 chars, captions joined with " -.- ".
    pub const COMPACT: SnippetStyle = SnippetStyle {
        caption_separator: " -.- ",
        max_content_chars: Some(250),
    };
}

/// One ranked document excerpt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetrievedSnippet {
    pub source_id: String,
    /// Single-line text
    pub text: String,
}

impl RetrievedSnippet {
    pub fn new(source_id: impl Into<String>, text: &str) -> Self {
        Self {
            source_id: source_id.into(),
            text: nonewlines(text),
        }
    }
}

impl fmt::Display for RetrievedSnippet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.source_id, self.text)
    }
}

/// Format snippets for `data_points`.
pub fn format_snippets(snippets: &[RetrievedSnippet]) -> Vec<String> {
    snippets.iter().map(ToString::to_string).collect()
}

/// Join formatted snippets into the prompt's sources block.
pub fn join_snippets(snippets: &[RetrievedSnippet]) -> String {
    format_snippets(snippets).join("\n")
}

/// Search adapter with a fixed field mapping.
#[derive(Clone)]
pub struct DocumentRetriever {
    client: Arc<dyn SearchClient>,
    fields: FieldMapping,
}

impl DocumentRetriever {
    pub fn new(client: Arc<dyn SearchClient>, fields: FieldMapping) -> Self {
        Self { client, fields }
    }

    /// Translate options into the search call.
    pub fn build_request(&self, query: &str, options: &SearchOptions) -> SearchRequest {
        let filter = options
            .exclude_category
            .as_deref()
            .filter(|c| !c.is_empty())
            .map(|c| exclusion_filter(&self.fields.category, c));

        let mode = if options.semantic_ranker {
            QueryMode::Semantic(SemanticOptions::standard(options.use_semantic_captions))
        } else {
            QueryMode::Simple
        };

        SearchRequest {
            query: query.to_string(),
            filter,
            mode,
            top: options.top_k.max(1),
        }
    }

    /// Retrieve ranked snippets for `query`, in the order the index returned them.
    ///
    /// # Errors
    /// Search failures propagate unchanged; a document without the source
    /// field is an `AppError::Retrieval`.
    pub async fn retrieve(
        &self,
        query: &str,
        options: &SearchOptions,
        style: &SnippetStyle,
    ) -> AppResult<Vec<RetrievedSnippet>> {
        let request = self.build_request(query, options);
        tracing::debug!(
            query = %request.query,
            filter = ?request.filter,
            semantic = options.semantic_ranker,
            "Retrieving documents"
        );

        let documents = self.client.search(&request).await?;

        let snippets = documents
            .iter()
            .map(|doc| self.to_snippet(doc, options.use_semantic_captions, style))
            .collect::<AppResult<Vec<_>>>()?;

        tracing::info!("Retrieved {} snippets", snippets.len());
        Ok(snippets)
    }

    fn to_snippet(
        &self,
        doc: &SearchDocument,
        use_captions: bool,
        style: &SnippetStyle,
    ) -> AppResult<RetrievedSnippet> {
        let source = doc.field_text(&self.fields.sourcepage).ok_or_else(|| {
            AppError::Retrieval(format!(
                "Search document is missing field '{}'",
                self.fields.sourcepage
            ))
        })?;

        let captions = doc
            .captions
            .as_ref()
            .filter(|captions| use_captions && !captions.is_empty());

        let text = match captions {
            Some(captions) => captions
                .iter()
                .map(|c| c.text.as_str())
                .collect::<Vec<_>>()
                .join(style.caption_separator),
            None => {
                let content = doc.field_text(&self.fields.content).unwrap_or_default();
                match style.max_content_chars {
                    Some(limit) => content.chars().take(limit).collect(),
                    None => content,
                }
            }
        };

        Ok(RetrievedSnippet::new(source, &text))
    }
}
