//! Conversation history serialization.

use serde::{Deserialize, Serialize};

/// Approximate prompt budget for serialized history, in tokens.
pub const DEFAULT_HISTORY_TOKENS: usize = 1000;

/// Characters counted per token when estimating history size.
const CHARS_PER_TOKEN: usize = 4;

/// One user/assistant exchange. The assistant reply is absent on the turn
/// currently being answered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub user: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bot: Option<String>,
}

impl ConversationTurn {
    /// A turn that has not been answered yet.
    pub fn question(user: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            bot: None,
        }
    }

    /// An answered turn.
    pub fn exchange(user: impl Into<String>, bot: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            bot: Some(bot.into()),
        }
    }

    fn render(&self) -> String {
        let mut text = format!("<|im_start|>user\n{}\n<|im_end|>\n", self.user);
        if let Some(bot) = self.bot.as_deref().filter(|b| !b.is_empty()) {
            text.push_str("<|im_start|>assistant\n");
            text.push_str(bot);
            text.push_str("<|im_end|>\n");
        }
        text
    }
}

/// Serialize turns into chat-markup text, newest turns kept first.
///
/// Turns are prepended from newest to oldest; once the text exceeds
/// `approx_max_tokens` (at four characters per token) no older turn is
/// added. The newest included turn is always present, whatever its length.
pub fn format_chat_history(
    history: &[ConversationTurn],
    include_last_turn: bool,
    approx_max_tokens: usize,
) -> String {
    let turns = if include_last_turn {
        history
    } else {
        &history[..history.len().saturating_sub(1)]
    };

    let budget = approx_max_tokens * CHARS_PER_TOKEN;
    let mut rendered: Vec<String> = Vec::new();
    let mut chars = 0usize;

    for turn in turns.iter().rev() {
        let text = turn.render();
        chars += text.chars().count();
        rendered.push(text);
        if chars > budget {
            break;
        }
    }

    if rendered.len() < turns.len() {
        tracing::debug!(
            "History truncated to {} of {} turns",
            rendered.len(),
            turns.len()
        );
    }

    rendered.reverse();
    rendered.concat()
}
