//! Completion provider implementations.

pub mod azure_openai;
pub mod ollama;

pub use azure_openai::AzureOpenAiClient;
pub use ollama::OllamaClient;
