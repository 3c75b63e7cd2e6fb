//! Tool registry - manages and dispatches tool calls
//!
//! Built once before a run: maps each tool name to its definition, input
//! validator, and either a handler or the terminal marker.

use async_trait::async_trait;
use futures::future::BoxFuture;
use jsonschema::JSONSchema;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

use crate::core::{Result, ToolCall, ToolDefinition, ToolResult, TrendwatchError};

/// A callable tool
#[async_trait]
pub trait Tool: Send + Sync {
    /// Definition advertised to the model
    fn definition(&self) -> ToolDefinition;

    /// Run the tool on validated input
    async fn execute(&self, input: Value) -> Result<Value>;
}

type ToolFn = dyn Fn(Value) -> BoxFuture<'static, Result<Value>> + Send + Sync;

/// Adapts a closure into a [`Tool`]
pub struct FnTool {
    definition: ToolDefinition,
    handler: Box<ToolFn>,
}

impl FnTool {
    pub fn new<F>(definition: ToolDefinition, handler: F) -> Self
    where
        F: Fn(Value) -> BoxFuture<'static, Result<Value>> + Send + Sync + 'static,
    {
        Self {
            definition,
            handler: Box::new(handler),
        }
    }
}

#[async_trait]
impl Tool for FnTool {
    fn definition(&self) -> ToolDefinition {
        self.definition.clone()
    }

    async fn execute(&self, input: Value) -> Result<Value> {
        (self.handler)(input).await
    }
}

/// How a registered tool is dispatched
#[derive(Clone)]
pub enum ToolKind {
    /// Runs a handler on input that passed the compiled schema
    Action {
        tool: Arc<dyn Tool>,
        schema: Arc<JSONSchema>,
    },
    /// Ends the run; its input becomes the final result
    Terminal,
}

/// A registered tool
#[derive(Clone)]
pub struct ToolEntry {
    pub definition: ToolDefinition,
    pub kind: ToolKind,
}

impl ToolEntry {
    pub fn is_terminal(&self) -> bool {
        matches!(self.kind, ToolKind::Terminal)
    }
}

/// Registry of available tools
#[derive(Clone, Default)]
pub struct ToolRegistry {
    /// Entries in registration order
    entries: Vec<ToolEntry>,
    /// Name to position in `entries`
    index: HashMap<String, usize>,
}

impl ToolRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler-backed tool; its input schema is compiled here
    pub fn register(&mut self, tool: impl Tool + 'static) -> Result<()> {
        let mut definition = tool.definition();
        definition.terminal = false;
        let schema = compile_schema(&definition)?;
        self.insert(ToolEntry {
            definition,
            kind: ToolKind::Action {
                tool: Arc::new(tool),
                schema: Arc::new(schema),
            },
        })
    }

    /// Register the terminal tool; at most one per registry
    pub fn register_terminal(&mut self, definition: ToolDefinition) -> Result<()> {
        if let Some(existing) = self.terminal_tool() {
            return Err(TrendwatchError::config(format!(
                "Terminal tool already registered: {}",
                existing.definition.name
            )));
        }
        self.insert(ToolEntry {
            definition: definition.terminal(),
            kind: ToolKind::Terminal,
        })
    }

    fn insert(&mut self, entry: ToolEntry) -> Result<()> {
        let name = entry.definition.name.clone();
        if self.index.contains_key(&name) {
            return Err(TrendwatchError::config(format!(
                "Duplicate tool name: {}",
                name
            )));
        }
        self.index.insert(name, self.entries.len());
        self.entries.push(entry);
        Ok(())
    }

    /// Look up a tool by name
    pub fn get(&self, name: &str) -> Option<&ToolEntry> {
        self.index.get(name).map(|&i| &self.entries[i])
    }

    /// The terminal tool, if one is registered
    pub fn terminal_tool(&self) -> Option<&ToolEntry> {
        self.entries.iter().find(|e| e.is_terminal())
    }

    /// All tool definitions, in registration order
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.entries.iter().map(|e| e.definition.clone()).collect()
    }

    /// Execute a non-terminal tool call.
    ///
    /// Never fails: unknown names, invalid input and handler errors all become
    /// error-marked results for the model to read.
    pub async fn execute(&self, call: &ToolCall) -> ToolResult {
        let entry = match self.get(&call.name) {
            Some(entry) => entry,
            None => return ToolResult::failure(call, format!("Unknown tool: {}", call.name)),
        };

        let (handler, schema) = match &entry.kind {
            ToolKind::Action { tool, schema } => (tool, schema),
            ToolKind::Terminal => {
                return ToolResult::failure(
                    call,
                    format!("{} ends the run and cannot be executed", call.name),
                )
            }
        };

        if let Err(reason) = validate_input(schema, &call.arguments) {
            debug!(tool = %call.name, %reason, "Rejected tool input");
            return ToolResult::failure(
                call,
                format!("Invalid input for {}: {}", call.name, reason),
            );
        }

        match handler.execute(call.arguments.clone()).await {
            Ok(output) => ToolResult::success(call, output.to_string()),
            Err(e) => ToolResult::failure(call, format!("{} failed: {}", call.name, e)),
        }
    }
}

fn compile_schema(definition: &ToolDefinition) -> Result<JSONSchema> {
    JSONSchema::compile(&definition.input_schema).map_err(|e| {
        TrendwatchError::config(format!(
            "Invalid input schema for tool {}: {}",
            definition.name, e
        ))
    })
}

/// Check `input` against a compiled tool schema.
///
/// On failure, returns every violation as `path: message`, joined with `; `.
pub fn validate_input(schema: &JSONSchema, input: &Value) -> std::result::Result<(), String> {
    schema.validate(input).map_err(|errors| {
        errors
            .map(|error| {
                let path = error.instance_path.to_string();
                if path.is_empty() {
                    error.to_string()
                } else {
                    format!("{}: {}", path, error)
                }
            })
            .collect::<Vec<_>>()
            .join("; ")
    })
}
