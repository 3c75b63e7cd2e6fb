//! Tools module - tools the research agent can call
//!
//! Contains the tool registry, the research tools, and scraper item reshaping.

pub mod registry;
pub mod research;
pub mod social;

pub use registry::{FnTool, Tool, ToolEntry, ToolKind, ToolRegistry};
pub use research::{research_registry, submit_report_definition};
