//! Answer approaches for docqa.
//!
//! - `RetrieveThenRead`: search once, answer once
//! - `ChatReadRetrieveRead`: rewrite the latest chat turn into a query, then answer
//! - `ReadRetrieveRead`: iterate over search and lookup tools until a final answer
//!
//! Every approach takes a `RetrievalConfig` parsed from the request's options
//! map and returns an `AnswerResult`.

pub mod agent;
pub mod chat_read_retrieve_read;
pub mod options;
pub mod retrieve_then_read;
pub mod types;

#[cfg(test)]
pub(crate) mod testing;

// Re-export main types
pub use agent::{
    AgentStep, AgentTools, ReadRetrieveRead, ToolSpec, ITERATION_LIMIT_ANSWER,
};
pub use chat_read_retrieve_read::ChatReadRetrieveRead;
pub use options::RetrievalConfig;
pub use retrieve_then_read::RetrieveThenRead;
pub use types::{AnswerResult, AskApproach, ChatApproach, ConversationTurn};
