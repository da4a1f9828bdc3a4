//! Reads agent completions in the Thought/Action/Final Answer format.

use docqa_core::{AppError, AppResult};
use regex::Regex;

const FINAL_ANSWER_MARKER: &str = "Final Answer:";
const ACTION_PATTERN: &str = r"(?s)Action\s*\d*\s*:(.*?)\n\s*Action\s*\d*\s*Input\s*\d*\s*:\s*(.*)";

/// One parsed completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AgentOutput {
    /// The agent is done
    FinalAnswer { thought: String, answer: String },
    /// The agent wants to call a registered tool
    ToolInvocation {
        thought: String,
        tool: String,
        input: String,
    },
    /// Neither form could be read, or the tool is not registered
    ParseFailure { reason: String },
}

pub struct AgentOutputParser {
    action: Regex,
    tool_names: Vec<String>,
}

impl AgentOutputParser {
    pub fn new<I, S>(tool_names: I) -> AppResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let action = Regex::new(ACTION_PATTERN)
            .map_err(|e| AppError::Agent(format!("Invalid action pattern: {}", e)))?;

        Ok(Self {
            action,
            tool_names: tool_names.into_iter().map(Into::into).collect(),
        })
    }

    pub fn parse(&self, text: &str) -> AgentOutput {
        if let Some(pos) = text.rfind(FINAL_ANSWER_MARKER) {
            return AgentOutput::FinalAnswer {
                thought: text[..pos].trim().to_string(),
                answer: text[pos + FINAL_ANSWER_MARKER.len()..].trim().to_string(),
            };
        }

        let Some(captures) = self.action.captures(text) else {
            return AgentOutput::ParseFailure {
                reason: "no action or final answer found".to_string(),
            };
        };

        let (Some(whole), Some(tool), Some(input)) = (captures.get(0), captures.get(1), captures.get(2))
        else {
            return AgentOutput::ParseFailure {
                reason: "incomplete action".to_string(),
            };
        };

        let tool = tool.as_str().trim();
        if !self.tool_names.iter().any(|name| name == tool) {
            return AgentOutput::ParseFailure {
                reason: format!("unknown tool '{}'", tool),
            };
        }

        AgentOutput::ToolInvocation {
            thought: text[..whole.start()].trim().to_string(),
            tool: tool.to_string(),
            input: clean_input(input.as_str()),
        }
    }
}

/// Drop a hallucinated observation, surrounding whitespace, and quotes.
fn clean_input(raw: &str) -> String {
    let input = raw.split("\nObservation").next().unwrap_or(raw).trim();
    input.trim_matches('"').trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parser() -> AgentOutputParser {
        AgentOutputParser::new(["Search", "Lookup"]).unwrap()
    }

    #[test]
    fn test_final_answer() {
        let output = parser().parse(" I now know the final answer.\nFinal Answer: It is $500 [a.pdf].");
        assert_eq!(
            output,
            AgentOutput::FinalAnswer {
                thought: "I now know the final answer.".to_string(),
                answer: "It is $500 [a.pdf].".to_string(),
            }
        );
    }

    #[test]
    fn test_repeated_final_answer_uses_last() {
        let output = parser().parse("Final Answer: draft\nThought: better\nFinal Answer: It is $500.");
        match output {
            AgentOutput::FinalAnswer { answer, .. } => assert_eq!(answer, "It is $500."),
            other => panic!("unexpected output: {:?}", other),
        }
    }

    #[test]
    fn test_tool_invocation() {
        let output = parser().parse(" I should search.\nAction: Search\nAction Input: deductible");
        assert_eq!(
            output,
            AgentOutput::ToolInvocation {
                thought: "I should search.".to_string(),
                tool: "Search".to_string(),
                input: "deductible".to_string(),
            }
        );
    }

    #[test]
    fn test_numbered_action_and_quoted_input() {
        let output = parser().parse("Action 1: Lookup\nAction 1 Input: \"Bank A\"\n");
        match output {
            AgentOutput::ToolInvocation { tool, input, .. } => {
                assert_eq!(tool, "Lookup");
                assert_eq!(input, "Bank A");
            }
            other => panic!("unexpected output: {:?}", other),
        }
    }

    #[test]
    fn test_hallucinated_observation_is_dropped() {
        let output = parser().parse("Action: Search\nAction Input: vision\nObservation: made up");
        match output {
            AgentOutput::ToolInvocation { input, .. } => assert_eq!(input, "vision"),
            other => panic!("unexpected output: {:?}", other),
        }
    }

    #[test]
    fn test_unknown_tool() {
        let output = parser().parse("Action: Calculator\nAction Input: 2+2");
        assert!(matches!(output, AgentOutput::ParseFailure { reason } if reason.contains("Calculator")));
    }

    #[test]
    fn test_unreadable_output() {
        let output = parser().parse("I am not sure what to do.");
        assert!(matches!(output, AgentOutput::ParseFailure { .. }));
    }
}
