//! Completion generator crate for docqa.
//!
//! This crate provides a provider-agnostic abstraction over text-completion
//! models through the `LlmClient` trait.
//!
//! # Providers
//! - **Ollama**: Local LLM runtime (default)
//! - **Azure OpenAI**: Hosted completions deployments
//!
//! # Example
//! ```no_run
//! use docqa_llm::{LlmClient, LlmRequest, providers::OllamaClient};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = OllamaClient::new();
//! let request = LlmRequest::new("Hello, world!", "llama3").with_stop(["\n"]);
//! let response = client.complete(&request).await?;
//! println!("{}", response.content);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod factory;
pub mod providers;
pub mod types;

// Re-export main types
pub use client::{LlmClient, LlmRequest, LlmResponse, LlmUsage};
pub use factory::{create_client, create_client_from_config};
pub use providers::{AzureOpenAiClient, OllamaClient};
pub use types::ProviderType;
