//! Shared types used across Trendwatch modules
//!
//! Contains conversation turns, tool calls, tool definitions, and tool results.

use serde::{Deserialize, Serialize};

/// Who produced a turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// User prompt or bundled tool results
    User,
    /// Model output
    Assistant,
}

/// One content block inside a turn
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    /// Plain text
    Text { text: String },
    /// A tool invocation requested by the model
    ToolUse {
        id: String,
        name: String,
        input: serde_json::Value,
    },
    /// The result of a tool invocation, keyed by the call id
    ToolResult {
        tool_use_id: String,
        content: String,
        #[serde(default, skip_serializing_if = "std::ops::Not::not")]
        is_error: bool,
    },
}

/// A turn in a conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Role of the turn's author
    pub role: Role,
    /// Ordered content blocks
    pub content: Vec<ContentBlock>,
}

impl Message {
    /// Create a new user message
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: vec![ContentBlock::Text {
                text: content.into(),
            }],
        }
    }

    /// Create a new assistant text message
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: vec![ContentBlock::Text {
                text: content.into(),
            }],
        }
    }

    /// Create an assistant turn carrying tool calls (and any text preceding them)
    pub fn assistant_tool_calls(text: &str, calls: &[ToolCall]) -> Self {
        let mut content = Vec::with_capacity(calls.len() + 1);
        if !text.is_empty() {
            content.push(ContentBlock::Text {
                text: text.to_string(),
            });
        }
        content.extend(calls.iter().map(|call| ContentBlock::ToolUse {
            id: call.id.clone(),
            name: call.name.clone(),
            input: call.arguments.clone(),
        }));

        Self {
            role: Role::Assistant,
            content,
        }
    }

    /// Create a user turn bundling tool results
    pub fn tool_results(results: &[ToolResult]) -> Self {
        Self {
            role: Role::User,
            content: results
                .iter()
                .map(|result| ContentBlock::ToolResult {
                    tool_use_id: result.call_id.clone(),
                    content: result.output.clone(),
                    is_error: !result.success,
                })
                .collect(),
        }
    }

    /// Concatenated text blocks of this turn
    pub fn text(&self) -> String {
        self.content
            .iter()
            .filter_map(|block| match block {
                ContentBlock::Text { text } => Some(text.as_str()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("")
    }
}

/// A tool call made by the LLM
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Correlation id assigned by the model service
    pub id: String,
    /// Name of the tool to invoke
    pub name: String,
    /// JSON arguments for the tool
    pub arguments: serde_json::Value,
}

impl ToolCall {
    /// Create a new tool call
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        arguments: serde_json::Value,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            arguments,
        }
    }

    /// Get a string argument by key
    pub fn get_string(&self, key: &str) -> Option<String> {
        self.arguments
            .get(key)
            .and_then(|v| v.as_str())
            .map(|s| s.to_string())
    }

    /// Get an unsigned integer argument by key
    pub fn get_u64(&self, key: &str) -> Option<u64> {
        self.arguments.get(key).and_then(|v| v.as_u64())
    }
}

/// Definition of a tool that can be called by the LLM
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Unique tool name
    pub name: String,
    /// Description shown to the model
    pub description: String,
    /// JSON Schema for the input
    pub input_schema: serde_json::Value,
    /// Whether invoking this tool ends the run
    #[serde(skip)]
    pub terminal: bool,
}

impl ToolDefinition {
    /// Create a new tool definition
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        input_schema: serde_json::Value,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            input_schema,
            terminal: false,
        }
    }

    /// Mark this definition as the run's terminal tool
    pub fn terminal(mut self) -> Self {
        self.terminal = true;
        self
    }
}

/// Result of executing a tool
#[derive(Debug, Clone)]
pub struct ToolResult {
    /// Id of the call this result answers
    pub call_id: String,
    /// Name of the tool that was executed
    pub tool_name: String,
    /// Whether the execution was successful
    pub success: bool,
    /// Serialized output fed back to the model
    pub output: String,
}

impl ToolResult {
    /// Create a successful result
    pub fn success(call: &ToolCall, output: impl Into<String>) -> Self {
        Self {
            call_id: call.id.clone(),
            tool_name: call.name.clone(),
            success: true,
            output: output.into(),
        }
    }

    /// Create a failed result carrying an `{"error": ...}` payload
    pub fn failure(call: &ToolCall, error: impl Into<String>) -> Self {
        Self {
            call_id: call.id.clone(),
            tool_name: call.name.clone(),
            success: false,
            output: serde_json::json!({ "error": error.into() }).to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_tool_use_block_serialization() {
        let call = ToolCall::new("toolu_1", "search_videos", json!({"query": "cats"}));
        let message = Message::assistant_tool_calls("", &[call]);

        let value = serde_json::to_value(&message).unwrap();
        assert_eq!(value["role"], "assistant");
        assert_eq!(value["content"][0]["type"], "tool_use");
        assert_eq!(value["content"][0]["id"], "toolu_1");
        assert_eq!(value["content"][0]["input"]["query"], "cats");
    }

    #[test]
    fn test_tool_result_block_keeps_call_id() {
        let call = ToolCall::new("toolu_9", "missing", json!({}));
        let message = Message::tool_results(&[ToolResult::failure(&call, "Unknown tool: missing")]);

        let value = serde_json::to_value(&message).unwrap();
        assert_eq!(value["role"], "user");
        assert_eq!(value["content"][0]["type"], "tool_result");
        assert_eq!(value["content"][0]["tool_use_id"], "toolu_9");
        assert_eq!(value["content"][0]["is_error"], true);
        assert!(value["content"][0]["content"]
            .as_str()
            .unwrap()
            .contains("Unknown tool: missing"));
    }

    #[test]
    fn test_terminal_flag_not_serialized() {
        let def =
            ToolDefinition::new("submit_report", "Submit", json!({"type": "object"})).terminal();
        assert!(def.terminal);
        let value = serde_json::to_value(&def).unwrap();
        assert!(value.get("terminal").is_none());
        assert!(value.get("input_schema").is_some());
    }

    #[test]
    fn test_message_text_joins_text_blocks() {
        let message = Message::assistant("done");
        assert_eq!(message.text(), "done");
    }
}
