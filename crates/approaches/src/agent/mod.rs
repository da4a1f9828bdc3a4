//! Iterative tool-using agent.
//!
//! Each iteration renders the agent template with the question and the
//! scratchpad so far, asks the generator for the next step, and either runs
//! the named tool or stops at a final answer. All run state lives in
//! `AgentRun`, created per request, so one `ReadRetrieveRead` can serve
//! concurrent requests.

pub mod parser;
pub mod tools;

pub use parser::{AgentOutput, AgentOutputParser};
pub use tools::{AgentTools, ToolOutput, ToolSpec};

use crate::options::RetrievalConfig;
use crate::types::{html_lines, AnswerResult, AskApproach};
use docqa_core::{AppError, AppResult};
use docqa_llm::{LlmClient, LlmRequest};
use docqa_prompt::{
    assemble_agent_template, injected_text, render_template, templates, PromptTemplate, PromptVars,
};
use docqa_retrieval::{format_snippets, RetrievedSnippet};
use std::fmt;
use std::sync::Arc;

/// Answer returned when the iteration budget runs out.
pub const ITERATION_LIMIT_ANSWER: &str = "Agent stopped due to iteration limit.";

const STEP_MAX_TOKENS: u32 = 1024;
const OBSERVATION_STOP: &str = "\nObservation:";

/// One recorded reasoning step.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AgentStep {
    pub thought: String,
    pub action: Option<String>,
    pub action_input: Option<String>,
    pub observation: Option<String>,
    pub final_answer: Option<String>,
}

impl fmt::Display for AgentStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut lines = Vec::new();
        if !self.thought.is_empty() {
            lines.push(format!("Thought: {}", self.thought));
        }
        if let Some(action) = &self.action {
            lines.push(format!("Action: {}", action));
        }
        if let Some(input) = &self.action_input {
            lines.push(format!("Action Input: {}", input));
        }
        if let Some(observation) = &self.observation {
            lines.push(format!("Observation: {}", observation));
        }
        if let Some(answer) = &self.final_answer {
            lines.push(format!("Final Answer: {}", answer));
        }
        write!(f, "{}", lines.join("\n"))
    }
}

/// Per-request state.
#[derive(Default)]
struct AgentRun {
    steps: Vec<AgentStep>,
    scratchpad: String,
    last_search: Vec<RetrievedSnippet>,
}

impl AgentRun {
    fn finish(self, question: &str, answer: String) -> AnswerResult {
        let mut trace = format!("Question: {}", question);
        for step in &self.steps {
            trace.push_str("\n\n");
            trace.push_str(&step.to_string());
        }

        AnswerResult {
            answer,
            data_points: format_snippets(&self.last_search),
            thoughts: html_lines(&trace),
        }
    }
}

pub struct ReadRetrieveRead {
    tools: AgentTools,
    parser: AgentOutputParser,
    llm: Arc<dyn LlmClient>,
    deployment: String,
    max_iterations: usize,
}

impl ReadRetrieveRead {
    /// # Errors
    /// Returns `AppError::Agent` if the output grammar cannot be compiled.
    pub fn new(
        tools: AgentTools,
        llm: Arc<dyn LlmClient>,
        deployment: impl Into<String>,
        max_iterations: usize,
    ) -> AppResult<Self> {
        let parser = AgentOutputParser::new(tools.names())?;
        Ok(Self {
            tools,
            parser,
            llm,
            deployment: deployment.into(),
            max_iterations: max_iterations.max(1),
        })
    }

    /// The agent template for this request. It keeps the `{{injected_prompt}}`,
    /// `{{question}}`, `{{scratchpad}}` and `{{tool_names}}` placeholders,
    /// which are filled on every iteration.
    fn template(&self, config: &RetrievalConfig) -> String {
        match (&config.prompt_override, &config.prompt_template_prefix) {
            (PromptTemplate::Replace(_), _) => tracing::warn!(
                "Replacement prompt templates do not apply to the agent, use prompt_template_prefix"
            ),
            (PromptTemplate::Inject(_), Some(_)) => tracing::warn!(
                "prompt_template_prefix replaces the agent prefix, injected instructions only apply if it has an {{{{injected_prompt}}}} slot"
            ),
            _ => {}
        }

        let prefix = config
            .prompt_template_prefix
            .as_deref()
            .unwrap_or(templates::AGENT_PREFIX);
        let suffix = config
            .prompt_template_suffix
            .as_deref()
            .unwrap_or(templates::AGENT_SUFFIX);

        let specs = self.tools.specs();
        let tools = specs
            .iter()
            .map(|spec| (spec.name.as_str(), spec.description.as_str()))
            .collect::<Vec<_>>();

        assemble_agent_template(prefix, &tools, templates::AGENT_FORMAT_INSTRUCTIONS, suffix)
    }

    fn strip_tool_names(&self, answer: &str) -> String {
        let mut answer = answer.to_string();
        for name in self.tools.names() {
            answer = answer.replace(&format!("[{}]", name), "");
        }
        answer.trim().to_string()
    }
}

#[async_trait::async_trait]
impl AskApproach for ReadRetrieveRead {
    async fn run(&self, question: &str, config: &RetrievalConfig) -> AppResult<AnswerResult> {
        let max_iterations = config.max_iterations.unwrap_or(self.max_iterations);
        let template = self.template(config);
        let injected_prompt = injected_text(&config.prompt_override);
        let tool_names = self.tools.names().join(", ");
        let mut run = AgentRun::default();

        tracing::info!("Running agent with up to {} iterations", max_iterations);

        for iteration in 1..=max_iterations {
            let mut variables = PromptVars::new();
            variables.insert("question", question.to_string());
            variables.insert("scratchpad", run.scratchpad.clone());
            variables.insert("tool_names", tool_names.clone());
            variables.insert("injected_prompt", injected_prompt.clone());
            let prompt = render_template(&template, &variables)?;

            let request = LlmRequest::new(prompt, self.deployment.as_str())
                .with_temperature(config.temperature)
                .with_max_tokens(STEP_MAX_TOKENS)
                .with_n(1)
                .with_stop([OBSERVATION_STOP]);
            let output = self.llm.complete(&request).await?.content;

            match self.parser.parse(&output) {
                AgentOutput::FinalAnswer { thought, answer } => {
                    tracing::info!("Agent finished after {} iterations", iteration);
                    run.steps.push(AgentStep {
                        thought,
                        final_answer: Some(answer.clone()),
                        ..AgentStep::default()
                    });
                    let answer = self.strip_tool_names(&answer);
                    return Ok(run.finish(question, answer));
                }
                AgentOutput::ToolInvocation { thought, tool, input } => {
                    tracing::debug!(iteration, tool = %tool, input = %input, "Agent tool call");

                    let result = self
                        .tools
                        .invoke(&tool, &input, &config.search)
                        .await?
                        .ok_or_else(|| AppError::Agent(format!("Unknown tool '{}'", tool)))?;

                    if let Some(snippets) = result.snippets {
                        run.last_search = snippets;
                    }

                    run.scratchpad.push_str(output.trim_end());
                    run.scratchpad.push_str("\nObservation: ");
                    run.scratchpad.push_str(&result.observation);
                    run.scratchpad.push_str("\nThought:");

                    run.steps.push(AgentStep {
                        thought,
                        action: Some(tool),
                        action_input: Some(input),
                        observation: Some(result.observation),
                        final_answer: None,
                    });
                }
                AgentOutput::ParseFailure { reason } => {
                    return Err(AppError::Agent(format!(
                        "Could not parse agent output ({}): {}",
                        reason, output
                    )));
                }
            }
        }

        tracing::warn!("Agent stopped after {} iterations without an answer", max_iterations);
        Ok(run.finish(question, ITERATION_LIMIT_ANSWER.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{benefits_index, ScriptedLlm};
    use docqa_retrieval::{DocumentRetriever, FieldMapping, LookupTable, MemorySearchClient};

    const TABLE: &str = "name,limit,rate\nBank A,1000,5%\nBank B,2000,6%\n";

    fn agent(llm: Arc<ScriptedLlm>, max_iterations: usize) -> (Arc<MemorySearchClient>, ReadRetrieveRead) {
        let search = Arc::new(benefits_index());
        let retriever = DocumentRetriever::new(search.clone(), FieldMapping::default());
        let table = Arc::new(LookupTable::from_reader(TABLE.as_bytes(), "name").unwrap());
        let tools = AgentTools::new(
            ToolSpec::new("Search", "search the documents"),
            retriever,
            ToolSpec::new("Lookup", "look up Bank A"),
            table,
            "Bank A",
        );
        (
            search,
            ReadRetrieveRead::new(tools, llm, "davinci", max_iterations).unwrap(),
        )
    }

    #[tokio::test]
    async fn test_lookup_then_final_answer() {
        let llm = Arc::new(ScriptedLlm::new([
            " I should check the table.\nAction: Lookup\nAction Input: Bank A",
            " I now know the final answer.\nFinal Answer: The limit is 1000 [Lookup].",
        ]));
        let (search, agent) = agent(llm.clone(), 15);

        let result = agent
            .run("What is the limit?", &RetrievalConfig::default())
            .await
            .unwrap();

        assert_eq!(result.answer, "The limit is 1000 .");
        assert!(result.data_points.is_empty());
        assert!(search.requests().is_empty());
        assert_eq!(result.thoughts.matches("Observation:").count(), 1);
        assert!(result.thoughts.starts_with("Question: What is the limit?<br><br>Thought: I should check the table."));

        let requests = llm.requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].stop, vec!["\nObservation:".to_string()]);
        assert!(requests[0].prompt.ends_with("Question: What is the limit?\nThought:"));
        assert!(requests[0].prompt.contains("Search: search the documents\nLookup: look up Bank A"));
        assert!(requests[0].prompt.contains("should be one of [Search, Lookup]"));
        assert!(requests[1].prompt.ends_with(
            "Thought: I should check the table.\nAction: Lookup\nAction Input: Bank A\n\
             Observation: name: Bank A\nlimit: 1000\nrate: 5%\nThought:"
        ));
    }

    #[tokio::test]
    async fn test_search_results_become_data_points() {
        let llm = Arc::new(ScriptedLlm::new([
            "Action: Search\nAction Input: \"deductible\"",
            "Final Answer: $500 [benefits-1.pdf][Search]",
        ]));
        let (search, agent) = agent(llm.clone(), 15);

        let result = agent
            .run("What is the deductible?", &RetrievalConfig::default())
            .await
            .unwrap();

        assert_eq!(result.answer, "$500 [benefits-1.pdf]");
        assert_eq!(result.data_points.len(), 2);
        assert_eq!(search.requests()[0].query, "deductible");
        assert!(llm.requests()[1]
            .prompt
            .contains("Observation: benefits-1.pdf: The deductible is $500 per year.\nbenefits-2.pdf:"));
    }

    #[tokio::test]
    async fn test_iteration_budget() {
        let llm = Arc::new(ScriptedLlm::repeating("Action: Search\nAction Input: anything"));
        let (search, agent) = agent(llm.clone(), 3);

        let result = agent.run("Q?", &RetrievalConfig::default()).await.unwrap();

        assert_eq!(result.answer, ITERATION_LIMIT_ANSWER);
        assert_eq!(llm.requests().len(), 3);
        assert_eq!(search.requests().len(), 3);
        assert_eq!(result.data_points.len(), 2);
        assert_eq!(result.thoughts.matches("Observation:").count(), 3);
    }

    #[tokio::test]
    async fn test_request_budget_overrides_configured_one() {
        let llm = Arc::new(ScriptedLlm::repeating("Action: Lookup\nAction Input: x"));
        let (_, agent) = agent(llm.clone(), 15);
        let config = RetrievalConfig {
            max_iterations: Some(2),
            ..RetrievalConfig::default()
        };

        let result = agent.run("Q?", &config).await.unwrap();

        assert_eq!(result.answer, ITERATION_LIMIT_ANSWER);
        assert_eq!(llm.requests().len(), 2);
    }

    #[tokio::test]
    async fn test_unparseable_output_is_error() {
        let llm = Arc::new(ScriptedLlm::new(["I have no idea."]));
        let (_, agent) = agent(llm, 15);

        let result = agent.run("Q?", &RetrievalConfig::default()).await;
        assert!(matches!(result, Err(AppError::Agent(_))));
    }

    #[tokio::test]
    async fn test_unknown_tool_is_error() {
        let llm = Arc::new(ScriptedLlm::new(["Action: Calculator\nAction Input: 2+2"]));
        let (search, agent) = agent(llm.clone(), 15);

        let result = agent.run("Q?", &RetrievalConfig::default()).await;

        assert!(matches!(result, Err(AppError::Agent(msg)) if msg.contains("Calculator")));
        assert_eq!(llm.requests().len(), 1);
        assert!(search.requests().is_empty());
    }

    #[tokio::test]
    async fn test_prefix_and_suffix_overrides() {
        let llm = Arc::new(ScriptedLlm::new(["Final Answer: done"]));
        let (_, agent) = agent(llm.clone(), 15);
        let config = RetrievalConfig {
            prompt_template_prefix: Some("Be brief.".to_string()),
            prompt_template_suffix: Some("Go!\nQ: {{question}}\nThought:{{scratchpad}}".to_string()),
            ..RetrievalConfig::default()
        };

        agent.run("Why?", &config).await.unwrap();

        let requests = llm.requests();
        let prompt = &requests[0].prompt;
        assert!(prompt.starts_with("Be brief.\n\nSearch: search the documents"));
        assert!(prompt.ends_with("Go!\nQ: Why?\nThought:"));
    }

    #[tokio::test]
    async fn test_injected_instructions_reach_prefix() {
        let llm = Arc::new(ScriptedLlm::new(["Final Answer: done"]));
        let (_, agent) = agent(llm.clone(), 15);
        let config = RetrievalConfig {
            prompt_override: PromptTemplate::from_raw(">>>Answer in one sentence."),
            ..RetrievalConfig::default()
        };

        agent.run("Why?", &config).await.unwrap();

        assert!(llm.requests()[0].prompt.contains("Answer in one sentence.\n"));
    }

    #[tokio::test]
    async fn test_injected_instructions_stay_literal() {
        let llm = Arc::new(ScriptedLlm::new(["Final Answer: done"]));
        let (_, agent) = agent(llm.clone(), 15);
        let config = RetrievalConfig {
            prompt_override: PromptTemplate::from_raw(
                ">>>Write the literal text {{question}} as a heading.",
            ),
            ..RetrievalConfig::default()
        };

        agent.run("Why?", &config).await.unwrap();

        let requests = llm.requests();
        let prompt = &requests[0].prompt;
        assert!(prompt.contains("Write the literal text {{question}} as a heading.\n"));
        assert!(!prompt.contains("literal text Why?"));
    }

    #[tokio::test]
    async fn test_prefix_override_takes_precedence_over_injection() {
        let llm = Arc::new(ScriptedLlm::new(["Final Answer: done"]));
        let (_, agent) = agent(llm.clone(), 15);
        let config = RetrievalConfig {
            prompt_override: PromptTemplate::from_raw(">>>Answer in one sentence."),
            prompt_template_prefix: Some("Be brief.".to_string()),
            ..RetrievalConfig::default()
        };

        agent.run("Why?", &config).await.unwrap();

        let requests = llm.requests();
        assert!(requests[0].prompt.starts_with("Be brief.\n\n"));
        assert!(!requests[0].prompt.contains("Answer in one sentence."));
    }

    #[tokio::test]
    async fn test_agent_serves_repeated_requests() {
        let llm = Arc::new(ScriptedLlm::new([
            "Action: Lookup\nAction Input: Bank A",
            "Final Answer: first",
            "Final Answer: second",
        ]));
        let (_, agent) = agent(llm.clone(), 15);

        let first = agent.run("Q1?", &RetrievalConfig::default()).await.unwrap();
        let second = agent.run("Q2?", &RetrievalConfig::default()).await.unwrap();

        assert_eq!(first.answer, "first");
        assert_eq!(second.answer, "second");
        assert_eq!(llm.requests().len(), 3);
    }

    #[test]
    fn test_step_display() {
        let step = AgentStep {
            thought: "look it up".to_string(),
            action: Some("Lookup".to_string()),
            action_input: Some("Bank A".to_string()),
            observation: Some("Not found.".to_string()),
            final_answer: None,
        };
        assert_eq!(
            step.to_string(),
            "Thought: look it up\nAction: Lookup\nAction Input: Bank A\nObservation: Not found."
        );
    }
}
