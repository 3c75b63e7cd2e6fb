//! Scheduled pipelines: the hashtag trend digest and the research agent run

pub mod research;
pub mod trends;

use std::fmt;

pub use research::{ResearchPipeline, DEFAULT_RESEARCH_PROMPT};
pub use trends::TrendPipeline;

/// How a pipeline run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineOutcome {
    /// A full report was sent
    Delivered,
    /// No usable data; a notice was sent instead
    NoData,
    /// The research agent ended without a report; a notice was sent instead
    Incomplete,
    /// The report was built but the sink rejected it
    DeliveryFailed,
}

impl fmt::Display for PipelineOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineOutcome::Delivered => write!(f, "delivered"),
            PipelineOutcome::NoData => write!(f, "no data"),
            PipelineOutcome::Incomplete => write!(f, "incomplete"),
            PipelineOutcome::DeliveryFailed => write!(f, "delivery failed"),
        }
    }
}
