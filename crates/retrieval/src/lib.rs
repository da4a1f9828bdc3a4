//! Document retrieval for docqa.
//!
//! Provides the search capability abstraction, an Azure Cognitive Search
//! client, the shared `DocumentRetriever` that formats ranked snippets, and
//! the static CSV lookup table used by the agent.

pub mod azure;
pub mod lookup;
pub mod retriever;
pub mod search;
pub mod text;

// Re-export commonly used types
pub use azure::AzureSearchClient;
pub use lookup::{LookupTable, LOOKUP_NOT_FOUND};
pub use retriever::{
    format_snippets, join_snippets, DocumentRetriever, FieldMapping, RetrievedSnippet,
    SearchOptions, SnippetStyle, DEFAULT_TOP_K,
};
pub use search::{
    exclusion_filter, Caption, QueryMode, SearchClient, SearchDocument, SearchRequest,
    SemanticOptions,
};

#[cfg(any(test, feature = "testing"))]
pub use search::MemorySearchClient;
pub use text::nonewlines;
