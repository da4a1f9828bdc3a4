//! Builds the search, completion, and lookup services from configuration.

use docqa_approaches::{AgentTools, ToolSpec};
use docqa_core::{config::AppConfig, AppError, AppResult};
use docqa_llm::{create_client_from_config, LlmClient};
use docqa_retrieval::{AzureSearchClient, DocumentRetriever, FieldMapping, LookupTable};
use std::sync::Arc;

pub fn llm_client(config: &AppConfig) -> AppResult<Arc<dyn LlmClient>> {
    tracing::debug!("Creating {} completion client", config.provider);
    create_client_from_config(config).map_err(AppError::Config)
}

pub fn retriever(config: &AppConfig) -> AppResult<DocumentRetriever> {
    let search = config.search_config()?;
    let api_key = config.resolve_search_api_key()?;

    let client = AzureSearchClient::new(
        search.endpoint.as_str(),
        search.index.as_str(),
        api_key,
        search.api_version.as_str(),
    );
    let fields = FieldMapping {
        sourcepage: search.sourcepage_field.clone(),
        content: search.content_field.clone(),
        category: search.category_field.clone(),
    };

    Ok(DocumentRetriever::new(Arc::new(client), fields))
}

pub fn lookup_table(config: &AppConfig) -> AppResult<LookupTable> {
    let lookup = config
        .lookup
        .as_ref()
        .ok_or_else(|| AppError::Config("No 'lookup' section configured".to_string()))?;
    let path = config
        .lookup_table_path()
        .ok_or_else(|| AppError::Config("No lookup table path configured".to_string()))?;

    LookupTable::from_path(&path, &lookup.key_field)
}

/// Search and lookup tools for the agent, named as configured.
pub fn agent_tools(config: &AppConfig) -> AppResult<AgentTools> {
    let lookup = config
        .lookup
        .as_ref()
        .ok_or_else(|| AppError::Config("The agent needs a 'lookup' section".to_string()))?;

    Ok(AgentTools::new(
        ToolSpec::new(
            config.agent.search_tool_name.as_str(),
            config.agent.search_tool_description.as_str(),
        ),
        retriever(config)?,
        ToolSpec::new(lookup.tool_name.as_str(), lookup.tool_description.as_str()),
        Arc::new(lookup_table(config)?),
        lookup.entity.as_str(),
    ))
}
