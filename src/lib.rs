//! Trendwatch - scheduled short-video trend reports
//!
//! Runs scraping jobs on a remote actor service, summarizes what is trending,
//! and posts reports to a chat webhook. A tool-calling research agent can also
//! be pointed at a free-form brief.
//!
//! # Architecture
//!
//! - **Core**: Shared types, configuration, and error handling
//! - **Jobs**: Submit-then-poll remote jobs behind one awaitable call
//! - **LLM**: Model provider abstraction with a Messages API client
//! - **Tools**: Tool registry and the research tools
//! - **Agent**: The tool-calling loop and its conversation state
//! - **Report**: Report formatting and webhook delivery
//! - **Pipelines**: The trend digest and research runs
//! - **CLI**: Command-line interface
//!
//! # Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use trendwatch::agent::ToolAgentLoop;
//! use trendwatch::jobs::{AsyncJobWaiter, ScraperClient, TokioTimer};
//! use trendwatch::llm::AnthropicClient;
//! use trendwatch::tools::research_registry;
//! use trendwatch::Config;
//!
//! #[tokio::main]
//! async fn main() -> trendwatch::Result<()> {
//!     let config = Config::load();
//!     let waiter = AsyncJobWaiter::new(
//!         Arc::new(ScraperClient::from_config(&config)?),
//!         Arc::new(TokioTimer),
//!     );
//!     let registry = research_registry(waiter, &config)?;
//!     let agent = ToolAgentLoop::new(Arc::new(AnthropicClient::from_config(&config)?));
//!
//!     let report = agent
//!         .run("You research short-video trends.", "Who is driving #rustlang?", &registry, 10)
//!         .await;
//!     println!("{:?}", report);
//!     Ok(())
//! }
//! ```

pub mod agent;
pub mod cli;
pub mod core;
pub mod jobs;
pub mod llm;
pub mod pipelines;
pub mod report;
pub mod tools;

// Re-export commonly used items
pub use agent::ToolAgentLoop;
pub use core::{Config, JobError, Result, TrendwatchError};
pub use jobs::AsyncJobWaiter;
pub use tools::ToolRegistry;
