//! Plan generation - goal + duration in, weekly habit plan out
//!
//! One prompt, one completion, one parse. Failures at any point are
//! absorbed: the caller gets an empty plan plus diagnostics, never an
//! error, so the surrounding session can keep going.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::domain::Plan;
use crate::llm::{CompletionRequest, LlmClient, Message};
use crate::prompts::{PromptContext, PromptLoader};

mod extract;

pub use extract::{extract_json, strip_code_fences};

/// System prompt for the plan generation call
const SYSTEM_PROMPT: &str = "You are a helpful assistant that converts a user's goal into a week-wise habit plan.";

/// Result of one generation attempt
///
/// An empty plan with diagnostics means the attempt produced nothing
/// usable; the diagnostics say why in human terms.
#[derive(Debug, Clone)]
pub struct PlanOutcome {
    pub plan: Plan,
    pub diagnostics: Vec<String>,
}

impl PlanOutcome {
    fn ok(plan: Plan) -> Self {
        Self {
            plan,
            diagnostics: Vec::new(),
        }
    }

    fn failed(goal: &str, weeks: u32, diagnostic: String) -> Self {
        warn!(%goal, %weeks, %diagnostic, "plan generation produced nothing usable");
        Self {
            plan: Plan::empty(goal, weeks),
            diagnostics: vec![diagnostic],
        }
    }
}

/// Generates weekly habit plans through the configured LLM
pub struct PlanGenerator {
    llm: Arc<dyn LlmClient>,
    prompts: PromptLoader,
    max_tokens: u32,
}

impl PlanGenerator {
    pub fn new(llm: Arc<dyn LlmClient>, prompts: PromptLoader, max_tokens: u32) -> Self {
        Self {
            llm,
            prompts,
            max_tokens,
        }
    }

    /// Generate a plan for the goal over the given number of weeks
    pub async fn generate(&self, goal: &str, weeks: u32) -> PlanOutcome {
        debug!(%goal, %weeks, "generate: called");

        let context = PromptContext::new(goal, weeks);
        let prompt = match self.prompts.habit_plan_prompt(&context) {
            Ok(p) => p,
            Err(e) => return PlanOutcome::failed(goal, weeks, format!("Failed to render prompt: {}", e)),
        };

        let request = CompletionRequest {
            system_prompt: SYSTEM_PROMPT.to_string(),
            messages: vec![Message::user(prompt)],
            max_tokens: self.max_tokens,
        };

        let response = match self.llm.complete(request).await {
            Ok(r) => r,
            Err(e) => return PlanOutcome::failed(goal, weeks, format!("LLM request failed: {}", e)),
        };

        let Some(content) = response.content else {
            return PlanOutcome::failed(goal, weeks, "LLM reply contained no text".to_string());
        };

        debug!(
            input_tokens = response.usage.input_tokens,
            output_tokens = response.usage.output_tokens,
            "generate: got reply"
        );

        self.parse_plan(goal, weeks, &content)
    }

    /// Carve the JSON object out of the reply and shape it into a Plan
    fn parse_plan(&self, goal: &str, weeks: u32, raw: &str) -> PlanOutcome {
        let cleaned = strip_code_fences(raw);
        let json = extract_json(cleaned);
        if json.is_empty() {
            return PlanOutcome::failed(goal, weeks, "No JSON object found in model reply".to_string());
        }

        let mapping: serde_json::Map<String, serde_json::Value> = match serde_json::from_str(json) {
            Ok(m) => m,
            Err(e) => {
                return PlanOutcome::failed(goal, weeks, format!("Failed to parse model reply as JSON: {}", e));
            }
        };

        match Plan::from_mapping(goal, weeks, mapping) {
            Ok(plan) => {
                info!(
                    %goal,
                    week_count = plan.weeks.len(),
                    task_count = plan.task_count(),
                    "Generated habit plan"
                );
                PlanOutcome::ok(plan)
            }
            Err(e) => PlanOutcome::failed(goal, weeks, format!("Model reply has the wrong shape: {}", e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::client::mock::MockLlmClient;

    fn generator(client: MockLlmClient) -> PlanGenerator {
        PlanGenerator::new(Arc::new(client), PromptLoader::embedded_only(), 1024)
    }

    #[tokio::test]
    async fn test_generate_parses_mocked_reply_in_order() {
        let client = MockLlmClient::replying(r#"{"week_1": ["A", "B"], "week_2": ["C"]}"#);
        let outcome = generator(client).generate("X", 2).await;

        assert!(outcome.diagnostics.is_empty());
        let plan = outcome.plan;
        assert_eq!(plan.goal, "X");
        assert_eq!(plan.duration_weeks, 2);
        assert_eq!(plan.weeks.len(), 2);
        assert_eq!(plan.weeks[0].label, "week_1");
        assert_eq!(plan.weeks[0].tasks, vec!["A", "B"]);
        assert_eq!(plan.weeks[1].label, "week_2");
        assert_eq!(plan.weeks[1].tasks, vec!["C"]);
    }

    #[tokio::test]
    async fn test_generate_handles_noisy_reply() {
        let client = MockLlmClient::replying("Here is your plan:\n```json\n{\"week_1\": [\"A\"]}\n```\nEnjoy!");
        let outcome = generator(client).generate("X", 1).await;

        assert!(outcome.diagnostics.is_empty());
        assert_eq!(outcome.plan.weeks[0].tasks, vec!["A"]);
    }

    #[tokio::test]
    async fn test_generate_non_json_reply_yields_empty_plan() {
        let client = MockLlmClient::replying("I cannot help with that.");
        let outcome = generator(client).generate("X", 2).await;

        assert!(outcome.plan.is_empty());
        assert_eq!(outcome.diagnostics.len(), 1);
        assert!(outcome.diagnostics[0].contains("No JSON object"));
    }

    #[tokio::test]
    async fn test_generate_transport_failure_yields_empty_plan() {
        let client = MockLlmClient::failing("connection refused");
        let outcome = generator(client).generate("X", 2).await;

        assert!(outcome.plan.is_empty());
        assert_eq!(outcome.diagnostics.len(), 1);
        assert!(outcome.diagnostics[0].contains("LLM request failed"));
        assert!(outcome.diagnostics[0].contains("connection refused"));
    }

    #[tokio::test]
    async fn test_generate_wrong_shape_yields_empty_plan() {
        let client = MockLlmClient::replying(r#"{"week_1": 42}"#);
        let outcome = generator(client).generate("X", 1).await;

        assert!(outcome.plan.is_empty());
        assert!(outcome.diagnostics[0].contains("wrong shape"));
    }
}
