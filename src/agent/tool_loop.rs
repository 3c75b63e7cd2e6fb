//! Tool-calling agent loop
//!
//! Drives a tool-calling model through rounds of "request tools, run them,
//! feed results back" until it calls the registry's terminal tool or the
//! iteration budget runs out.

use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::agent::conversation::ConversationState;
use crate::agent::loop_state::{AgentLoopState, StopReason};
use crate::core::{ToolCall, ToolResult};
use crate::llm::{GenerateOptions, LLMProvider};
use crate::tools::ToolRegistry;

/// Outcome of one agent run
#[derive(Debug, Clone)]
pub struct AgentRun {
    /// Input of the terminal tool call, if the model made one
    pub result: Option<Value>,
    /// Why the loop stopped
    pub stop_reason: StopReason,
    /// Model invocations made
    pub iterations: usize,
    /// Tool calls answered
    pub tool_calls: usize,
    /// Full turn history
    pub conversation: ConversationState,
}

/// Mediates between a tool-calling model and a tool registry
#[derive(Clone)]
pub struct ToolAgentLoop {
    llm: Arc<dyn LLMProvider>,
    options: GenerateOptions,
}

impl ToolAgentLoop {
    /// Create a loop over a model provider
    pub fn new(llm: Arc<dyn LLMProvider>) -> Self {
        Self {
            llm,
            options: GenerateOptions {
                temperature: Some(0.2),
                ..Default::default()
            },
        }
    }

    /// Override generation options for every model call
    pub fn with_options(mut self, options: GenerateOptions) -> Self {
        self.options = options;
        self
    }

    /// Run to completion and return the terminal tool's input, if any.
    ///
    /// `None` covers both "the model stopped without reporting" and "the
    /// iteration budget ran out"; this never returns an error.
    pub async fn run(
        &self,
        system_prompt: &str,
        initial_user_message: &str,
        registry: &ToolRegistry,
        max_iterations: usize,
    ) -> Option<Value> {
        self.run_detailed(system_prompt, initial_user_message, registry, max_iterations)
            .await
            .result
    }

    /// Like [`run`](Self::run), but also reports why the loop stopped and the
    /// full conversation.
    pub async fn run_detailed(
        &self,
        system_prompt: &str,
        initial_user_message: &str,
        registry: &ToolRegistry,
        max_iterations: usize,
    ) -> AgentRun {
        let definitions = registry.definitions();
        let mut conversation = ConversationState::new(initial_user_message);
        let mut state = AgentLoopState::new(max_iterations);

        info!(
            provider = self.llm.name(),
            tools = definitions.len(),
            max_iterations,
            "Starting agent run"
        );

        while state.should_continue() {
            state.next_iteration();
            debug!(iteration = state.iteration, "Requesting model turn");

            let response = match self
                .llm
                .chat_with_tools(
                    system_prompt,
                    conversation.turns(),
                    &definitions,
                    Some(self.options.clone()),
                )
                .await
            {
                Ok(response) => response,
                Err(e) => {
                    warn!(iteration = state.iteration, error = %e, "Model call failed");
                    state.stop(StopReason::ModelError(e.to_string()));
                    break;
                }
            };

            if response.tool_calls.is_empty() {
                conversation.push_assistant_text(&response.content);
                state.stop(StopReason::ModelFinished);
                break;
            }

            conversation.push_tool_calls(&response.content, &response.tool_calls);
            let results = Self::dispatch(&response.tool_calls, registry, &mut conversation).await;
            state.record_tool_calls(results.len());
            conversation.push_tool_results(&results);

            if conversation.has_final_result() {
                state.stop(StopReason::Completed);
            }
        }

        let iterations = state.iteration;
        let tool_calls = state.tool_calls;
        let stop_reason = state.finish();

        if conversation.has_final_result() {
            info!(iterations, tool_calls, "Agent run produced a report");
        } else {
            warn!(
                iterations,
                tool_calls,
                reason = %stop_reason,
                "Agent run ended without a report"
            );
        }

        AgentRun {
            result: conversation.final_result().cloned(),
            stop_reason,
            iterations,
            tool_calls,
            conversation,
        }
    }

    /// Answer every call of one assistant turn, strictly in request order.
    ///
    /// Once the terminal tool has been seen, later calls in the batch are not
    /// executed; they get a "skipped" result so every call id is answered.
    async fn dispatch(
        calls: &[ToolCall],
        registry: &ToolRegistry,
        conversation: &mut ConversationState,
    ) -> Vec<ToolResult> {
        let mut results = Vec::with_capacity(calls.len());

        for call in calls {
            if conversation.has_final_result() {
                results.push(ToolResult::failure(
                    call,
                    "Skipped: the report was already submitted",
                ));
                continue;
            }

            match registry.get(&call.name) {
                Some(entry) if entry.is_terminal() => {
                    conversation.set_final_result(call.arguments.clone());
                    info!(tool = %call.name, "Terminal tool called");
                    results.push(ToolResult::success(
                        call,
                        json!({ "status": "accepted", "message": "Report received." })
                            .to_string(),
                    ));
                }
                Some(_) => {
                    debug!(tool = %call.name, id = %call.id, "Executing tool");
                    let result = registry.execute(call).await;
                    if !result.success {
                        debug!(
                            tool = %call.name,
                            output = %result.output,
                            "Tool returned an error"
                        );
                    }
                    results.push(result);
                }
                None => {
                    warn!(tool = %call.name, "Model requested an unknown tool");
                    results.push(registry.execute(call).await);
                }
            }
        }

        results
    }
}
