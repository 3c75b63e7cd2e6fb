//! Agent loop state management
//!
//! Tracks the iteration budget of the tool loop and why it stopped.

use std::fmt;

/// Why an agent run ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopReason {
    /// The terminal tool was called
    Completed,
    /// The model answered without calling any tool
    ModelFinished,
    /// `max_iterations` model invocations without a terminal call
    BudgetExhausted,
    /// The model service failed
    ModelError(String),
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StopReason::Completed => write!(f, "completed"),
            StopReason::ModelFinished => write!(f, "model finished without a report"),
            StopReason::BudgetExhausted => write!(f, "iteration budget exhausted"),
            StopReason::ModelError(e) => write!(f, "model error: {}", e),
        }
    }
}

/// State of the agent tool loop
#[derive(Debug, Clone)]
pub struct AgentLoopState {
    /// Model invocations made so far
    pub iteration: usize,
    /// Maximum allowed model invocations
    pub max_iterations: usize,
    /// Tool calls answered so far, including rejected ones
    pub tool_calls: usize,
    /// Set once the loop has decided to stop
    pub stop_reason: Option<StopReason>,
}

impl AgentLoopState {
    /// Create a new loop state with the given budget
    pub fn new(max_iterations: usize) -> Self {
        Self {
            iteration: 0,
            max_iterations,
            tool_calls: 0,
            stop_reason: None,
        }
    }

    /// Check if the loop should make another model call
    pub fn should_continue(&self) -> bool {
        self.stop_reason.is_none() && self.iteration < self.max_iterations
    }

    /// Count one model invocation
    pub fn next_iteration(&mut self) {
        self.iteration += 1;
    }

    /// Count answered tool calls
    pub fn record_tool_calls(&mut self, count: usize) {
        self.tool_calls += count;
    }

    /// Stop with `reason` unless a reason was already recorded
    pub fn stop(&mut self, reason: StopReason) {
        if self.stop_reason.is_none() {
            self.stop_reason = Some(reason);
        }
    }

    /// Final stop reason; a loop that ran out of iterations is budget-exhausted
    pub fn finish(mut self) -> StopReason {
        self.stop_reason.take().unwrap_or(StopReason::BudgetExhausted)
    }
}
