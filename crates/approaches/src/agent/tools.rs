//! Tools the agent can call.

use docqa_core::AppResult;
use docqa_retrieval::{
    join_snippets, DocumentRetriever, LookupTable, RetrievedSnippet, SearchOptions, SnippetStyle,
};
use std::sync::Arc;

/// Name and description shown to the agent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolSpec {
    pub name: String,
    pub description: String,
}

impl ToolSpec {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
        }
    }
}

/// Result of one tool call.
pub struct ToolOutput {
    pub observation: String,
    /// Set by the search tool only
    pub snippets: Option<Vec<RetrievedSnippet>>,
}

/// The search tool and the lookup tool bound to one entity.
pub struct AgentTools {
    search: ToolSpec,
    retriever: DocumentRetriever,
    lookup: ToolSpec,
    table: Arc<LookupTable>,
    entity: String,
}

impl AgentTools {
    pub fn new(
        search: ToolSpec,
        retriever: DocumentRetriever,
        lookup: ToolSpec,
        table: Arc<LookupTable>,
        entity: impl Into<String>,
    ) -> Self {
        Self {
            search,
            retriever,
            lookup,
            table,
            entity: entity.into(),
        }
    }

    pub fn specs(&self) -> [&ToolSpec; 2] {
        [&self.search, &self.lookup]
    }

    pub fn names(&self) -> Vec<String> {
        self.specs().iter().map(|spec| spec.name.clone()).collect()
    }

    /// Run the tool called `name`. Returns `None` for an unregistered name.
    pub async fn invoke(
        &self,
        name: &str,
        input: &str,
        options: &SearchOptions,
    ) -> AppResult<Option<ToolOutput>> {
        if name == self.search.name {
            let snippets = self
                .retriever
                .retrieve(input, options, &SnippetStyle::COMPACT)
                .await?;
            return Ok(Some(ToolOutput {
                observation: join_snippets(&snippets),
                snippets: Some(snippets),
            }));
        }

        if name == self.lookup.name {
            tracing::debug!(entity = %self.entity, input = %input, "Looking up entity");
            return Ok(Some(ToolOutput {
                observation: self.table.lookup(&self.entity),
                snippets: None,
            }));
        }

        Ok(None)
    }
}
