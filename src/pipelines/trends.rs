//! Daily hashtag trend digest

use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::core::{Config, Message};
use crate::jobs::{AsyncJobWaiter, JobSpec, PollSettings};
use crate::llm::{extract_json, GenerateOptions, LLMProvider};
use crate::pipelines::PipelineOutcome;
use crate::report::{deliver, text_payload, trend_digest, HashtagSection, ReportSink};
use crate::tools::social::top_videos;

const TOP_PER_HASHTAG: usize = 5;

const INSIGHTS_PROMPT: &str = "You are a social media analyst. Given the most viewed \
short videos for a set of hashtags, point out what is driving engagement. Reply with \
JSON only, in the form {\"insights\": [\"...\", \"...\"]}, with at most five short insights.";

#[derive(Debug, Deserialize)]
struct InsightsReply {
    insights: Vec<String>,
}

/// Scrapes each hashtag, ranks videos and sends one digest
pub struct TrendPipeline {
    waiter: AsyncJobWaiter,
    llm: Arc<dyn LLMProvider>,
    sink: Arc<dyn ReportSink>,
    actor: String,
    results_per_hashtag: u32,
    settings: PollSettings,
}

impl TrendPipeline {
    pub fn new(
        waiter: AsyncJobWaiter,
        llm: Arc<dyn LLMProvider>,
        sink: Arc<dyn ReportSink>,
        config: &Config,
    ) -> Self {
        Self {
            waiter,
            llm,
            sink,
            actor: config.scraper.search_actor.clone(),
            results_per_hashtag: config.scraper.results_per_hashtag,
            settings: config.poll_settings(),
        }
    }

    /// Run the digest for `hashtags` dated `date`.
    ///
    /// A hashtag whose job fails is skipped; remote failures never abort the run.
    pub async fn run(&self, hashtags: &[String], date: NaiveDate) -> PipelineOutcome {
        info!(hashtags = hashtags.len(), "Starting trend digest");

        let mut sections = Vec::new();
        for hashtag in hashtags {
            if let Some(section) = self.collect(hashtag).await {
                sections.push(section);
            }
        }

        if sections.iter().all(|s| s.videos.is_empty()) {
            warn!("No trend data collected");
            return self.send(no_data_notice(hashtags, date), PipelineOutcome::NoData).await;
        }

        let insights = self.insights(&sections).await;
        let text = trend_digest(date, &sections, &insights);
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

    async fn collect(&self, hashtag: &str) -> Option<HashtagSection> {
        let spec = JobSpec::new(
            &self.actor,
            json!({
                "hashtags": [hashtag],
                "resultsPerPage": self.results_per_hashtag,
            }),
        );

        match self.waiter.run_job(&spec, self.settings).await {
            Ok(items) => {
                let videos = top_videos(&items, TOP_PER_HASHTAG);
                debug!(hashtag, items = items.len(), kept = videos.len(), "Collected hashtag");
                Some(HashtagSection {
                    hashtag: hashtag.to_string(),
                    videos,
                })
            }
            Err(e) => {
                warn!(hashtag, error = %e, "Skipping hashtag");
                None
            }
        }
    }

    /// Short insights from the model; empty when the call or the parse fails
    async fn insights(&self, sections: &[HashtagSection]) -> Vec<String> {
        let data: Vec<_> = sections
            .iter()
            .map(|s| json!({ "hashtag": s.hashtag, "videos": s.videos }))
            .collect();
        let prompt = format!(
            "Top videos by hashtag:\n{}",
            serde_json::to_string_pretty(&data).unwrap_or_default()
        );

        let options = GenerateOptions {
            temperature: Some(0.3),
            max_tokens: Some(1024),
        };
        let reply = match self
            .llm
            .chat(INSIGHTS_PROMPT, &[Message::user(prompt)], Some(options))
            .await
        {
            Ok(reply) => reply,
            Err(e) => {
                warn!(error = %e, "Insight generation failed");
                return Vec::new();
            }
        };

        match extract_json::<InsightsReply>(&reply.content) {
            Ok(parsed) => parsed.insights,
            Err(e) => {
                warn!(error = %e, "Could not parse insights");
                Vec::new()
            }
        }
    }
}

fn no_data_notice(hashtags: &[String], date: NaiveDate) -> String {
    let date = date.format("%b %-d, %Y");
    if hashtags.is_empty() {
        return format!("Trend digest for {}: no hashtags were configured.", date);
    }
    let tags = hashtags
        .iter()
        .map(|h| format!("#{}", h))
        .collect::<Vec<_>>()
        .join(", ");
    format!("Trend digest for {}: no data was collected for {}.", date, tags)
}
