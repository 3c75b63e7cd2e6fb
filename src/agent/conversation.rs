//! Conversation state for one agent run
//!
//! Append-only turn history, the tool calls awaiting results, and the set-once
//! final result.

use serde_json::Value;

use crate::core::{Message, ToolCall, ToolResult};

/// Turn history and result of a single agent run
#[derive(Debug, Clone)]
pub struct ConversationState {
    /// Turns in the order they happened
    turns: Vec<Message>,
    /// Calls from the latest assistant turn that have no results yet
    pending_tool_calls: Vec<ToolCall>,
    /// Input of the terminal tool call, once observed
    final_result: Option<Value>,
}

impl ConversationState {
    /// Start a conversation with one user turn
    pub fn new(initial_user_message: impl Into<String>) -> Self {
        Self {
            turns: vec![Message::user(initial_user_message)],
            pending_tool_calls: Vec::new(),
            final_result: None,
        }
    }

    /// All turns so far
    pub fn turns(&self) -> &[Message] {
        &self.turns
    }

    /// Calls still waiting for results
    pub fn pending_tool_calls(&self) -> &[ToolCall] {
        &self.pending_tool_calls
    }

    /// Append an assistant turn that requests tool calls
    pub fn push_tool_calls(&mut self, text: &str, calls: &[ToolCall]) {
        self.turns.push(Message::assistant_tool_calls(text, calls));
        self.pending_tool_calls = calls.to_vec();
    }

    /// Append one user turn carrying the results for the pending calls
    pub fn push_tool_results(&mut self, results: &[ToolResult]) {
        debug_assert!(
            results
                .iter()
                .map(|r| r.call_id.as_str())
                .eq(self.pending_tool_calls.iter().map(|c| c.id.as_str())),
            "tool results must answer the pending calls in order"
        );
        self.turns.push(Message::tool_results(results));
        self.pending_tool_calls.clear();
    }

    /// Append a plain assistant turn
    pub fn push_assistant_text(&mut self, text: &str) {
        self.turns.push(Message::assistant(text));
    }

    /// Record the final result. Returns `false` and keeps the existing value
    /// if one was already recorded.
    pub fn set_final_result(&mut self, value: Value) -> bool {
        if self.final_result.is_some() {
            return false;
        }
        self.final_result = Some(value);
        true
    }

    pub fn final_result(&self) -> Option<&Value> {
        self.final_result.as_ref()
    }

    pub fn has_final_result(&self) -> bool {
        self.final_result.is_some()
    }
}
