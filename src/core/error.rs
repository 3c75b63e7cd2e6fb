//! Custom error types for Trendwatch
//!
//! Provides a unified error handling system across all modules, plus the
//! dedicated taxonomy for remote job execution.

use thiserror::Error;

use crate::jobs::JobStatus;

/// Main error type for Trendwatch operations
#[derive(Error, Debug)]
pub enum TrendwatchError {
    /// Scraping service errors (transport or non-success HTTP status)
    #[error("Scraper error: {0}")]
    Scraper(String),

    /// Remote job failures surfaced by the job waiter
    #[error(transparent)]
    Job(#[from] JobError),

    /// LLM connection or API errors
    #[error("LLM error: {0}")]
    Llm(String),

    /// Model output could not be parsed into the expected structure
    #[error("Failed to parse model response: {0}")]
    ResponseParse(String),

    /// Tool execution errors
    #[error("Tool execution error: {0}")]
    ToolExecution(String),

    /// Report delivery errors
    #[error("Report sink error: {0}")]
    Sink(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON parsing errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP request errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error for other cases
    #[error("{0}")]
    Other(String),
}

/// Convenience Result type for Trendwatch operations
pub type Result<T> = std::result::Result<T, TrendwatchError>;

impl TrendwatchError {
    /// Create a scraper error
    pub fn scraper(msg: impl Into<String>) -> Self {
        Self::Scraper(msg.into())
    }

    /// Create an LLM error
    pub fn llm(msg: impl Into<String>) -> Self {
        Self::Llm(msg.into())
    }

    /// Create a response parse error
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::ResponseParse(msg.into())
    }

    /// Create a tool execution error
    pub fn tool(msg: impl Into<String>) -> Self {
        Self::ToolExecution(msg.into())
    }

    /// Create a sink error
    pub fn sink(msg: impl Into<String>) -> Self {
        Self::Sink(msg.into())
    }

    /// Create a config error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

/// Terminal failures of a single remote job run.
///
/// Every variant ends the call; nothing is retried internally.
#[derive(Error, Debug)]
pub enum JobError {
    /// The remote system rejected job creation
    #[error("job submission failed: {0}")]
    Submission(String),

    /// The remote system marked the job as failed
    #[error("job {job_id} finished with status {status}")]
    Execution { job_id: String, status: JobStatus },

    /// The attempt budget ran out while the job was still non-terminal
    #[error("job {job_id} still {last_status} after {attempts} status checks")]
    Timeout {
        job_id: String,
        last_status: JobStatus,
        attempts: u32,
    },

    /// The job succeeded but its results could not be read
    #[error("job {job_id} succeeded but results are unreadable: {reason}")]
    ResultFetch { job_id: String, reason: String },

    /// A status query failed in transit
    #[error("status query for job {job_id} failed: {reason}")]
    StatusQuery { job_id: String, reason: String },
}
