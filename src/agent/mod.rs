//! Agent module - the tool-calling research loop
//!
//! Contains the loop that drives the model, its per-run conversation state,
//! and the iteration budget bookkeeping.

pub mod conversation;
pub mod loop_state;
pub mod tool_loop;

pub use conversation::ConversationState;
pub use loop_state::{AgentLoopState, StopReason};
pub use tool_loop::{AgentRun, ToolAgentLoop};
