//! Research agent pipeline
//!
//! Hands a research brief to the tool loop and sends whatever report the model
//! submits.

use std::sync::Arc;
use tracing::{info, warn};

use crate::agent::ToolAgentLoop;
use crate::core::Config;
use crate::pipelines::PipelineOutcome;
use crate::report::{deliver, research_report, text_payload, ReportSink};
use crate::tools::ToolRegistry;

pub const DEFAULT_RESEARCH_PROMPT: &str = "You are a short-video trend researcher. \
Use search_videos to find relevant videos and get_profiles to look up the creators \
behind them. Base every finding on data returned by the tools and include video or \
profile URLs where you have them. When the research is done, call submit_report \
exactly once with the finished report. Do not answer in plain text.";

/// Runs the research agent and delivers its report
pub struct ResearchPipeline {
    agent: ToolAgentLoop,
    registry: ToolRegistry,
    sink: Arc<dyn ReportSink>,
    system_prompt: String,
    max_iterations: usize,
}

impl ResearchPipeline {
    pub fn new(
        agent: ToolAgentLoop,
        registry: ToolRegistry,
        sink: Arc<dyn ReportSink>,
        config: &Config,
    ) -> Self {
        Self {
            agent,
            registry,
            sink,
            system_prompt: config
                .agent
                .system_prompt
                .clone()
                .unwrap_or_else(|| DEFAULT_RESEARCH_PROMPT.to_string()),
            max_iterations: config.agent.max_iterations,
        }
    }

    /// Research `brief` and send the report, or a notice if none was produced
    pub async fn run(&self, brief: &str) -> PipelineOutcome {
        info!(brief, "Starting research run");

        let run = self
            .agent
            .run_detailed(&self.system_prompt, brief, &self.registry, self.max_iterations)
            .await;

        let Some(report) = run.result else {
            warn!(
                reason = %run.stop_reason,
                iterations = run.iterations,
                "Research did not complete"
            );
            let notice = format!("Research did not complete: {}", brief);
            return self.send(notice, PipelineOutcome::Incomplete).await;
        };

        let text = research_report(brief, &report);
        self.send(text, PipelineOutcome::Delivered).await
    }

    /// `outcome` if the sink accepted `text`, otherwise `DeliveryFailed`
    async fn send(&self, text: String, outcome: PipelineOutcome) -> PipelineOutcome {
        if deliver(self.sink.as_ref(), &text_payload(text)).await {
            outcome
        } else {
            PipelineOutcome::DeliveryFailed
        }
    }
}
