//! Command handlers for the docqa CLI.

pub mod ask;
pub mod chat;
pub mod lookup;
pub mod prompts;
pub mod request;
pub mod services;

// Re-export command types for convenience
pub use ask::AskCommand;
pub use chat::ChatCommand;
pub use lookup::LookupCommand;
pub use prompts::PromptsCommand;
