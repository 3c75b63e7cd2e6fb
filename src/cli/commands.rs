//! CLI commands
//!
//! Wires configuration into clients and pipelines for each subcommand.

use chrono::Local;
use std::future::Future;
use std::sync::Arc;
use tracing::info;

use crate::agent::ToolAgentLoop;
use crate::cli::{Command, ConfigAction};
use crate::core::{Config, Result, TrendwatchError};
use crate::jobs::{AsyncJobWaiter, ScraperClient, TokioTimer};
use crate::llm::{AnthropicClient, LLMProvider};
use crate::pipelines::{PipelineOutcome, ResearchPipeline, TrendPipeline};
use crate::report::{ReportSink, StdoutSink, WebhookSink};
use crate::tools::research_registry;

/// Run one subcommand against the loaded configuration
pub async fn execute(command: Command, config: Config, dry_run: bool) -> Result<()> {
    match command {
        Command::Trends { hashtags } => {
            let hashtags = if hashtags.is_empty() {
                config.scraper.hashtags.clone()
            } else {
                hashtags
                    .iter()
                    .map(|h| h.trim_start_matches('#').to_string())
                    .collect()
            };
            if hashtags.is_empty() {
                return Err(TrendwatchError::config(
                    "No hashtags given; pass --hashtag or set scraper.hashtags",
                ));
            }

            config.validate()?;
            let pipeline = TrendPipeline::new(
                job_waiter(&config)?,
                llm(&config)?,
                sink(&config, dry_run)?,
                &config,
            );
            let today = Local::now().date_naive();
            let outcome = with_deadline(&config, pipeline.run(&hashtags, today)).await?;
            finish(outcome)
        }

        Command::Research {
            brief,
            max_iterations,
        } => {
            let mut config = config;
            if let Some(max) = max_iterations {
                config.agent.max_iterations = max;
            }

            config.validate()?;
            let registry = research_registry(job_waiter(&config)?, &config)?;
            let pipeline = ResearchPipeline::new(
                ToolAgentLoop::new(llm(&config)?),
                registry,
                sink(&config, dry_run)?,
                &config,
            );
            let outcome = with_deadline(&config, pipeline.run(&brief)).await?;
            finish(outcome)
        }

        Command::Config { action } => config_command(action, &config),
    }
}

fn config_command(action: ConfigAction, config: &Config) -> Result<()> {
    match action {
        ConfigAction::Show => {
            let mut shown = config.clone();
            shown.scraper.api_token = mask(&shown.scraper.api_token);
            shown.llm.api_key = mask(&shown.llm.api_key);
            let text = toml::to_string_pretty(&shown)
                .map_err(|e| TrendwatchError::config(format!("Failed to serialize config: {}", e)))?;
            println!("{}", text);
        }
        ConfigAction::Init { force } => {
            if Config::config_exists() && !force {
                return Err(TrendwatchError::config(format!(
                    "{} already exists; use --force to overwrite",
                    Config::config_file().display()
                )));
            }
            let mut fresh = Config::default();
            // Secrets stay in the environment
            fresh.scraper.api_token.clear();
            fresh.llm.api_key.clear();
            let path = fresh.save()?;
            println!("Wrote {}", path.display());
        }
        ConfigAction::Path => println!("{}", Config::config_file().display()),
    }
    Ok(())
}

fn job_waiter(config: &Config) -> Result<AsyncJobWaiter> {
    let scraper = ScraperClient::from_config(config)?;
    Ok(AsyncJobWaiter::new(Arc::new(scraper), Arc::new(TokioTimer)))
}

fn llm(config: &Config) -> Result<Arc<dyn LLMProvider>> {
    Ok(Arc::new(AnthropicClient::from_config(config)?))
}

fn sink(config: &Config, dry_run: bool) -> Result<Arc<dyn ReportSink>> {
    if dry_run {
        return Ok(Arc::new(StdoutSink));
    }
    match config.webhook.url {
        Some(ref url) => Ok(Arc::new(WebhookSink::new(url)?)),
        None => Err(TrendwatchError::config(
            "REPORT_WEBHOOK_URL is not set (webhook.url); use --dry-run to print instead",
        )),
    }
}

async fn with_deadline<F>(config: &Config, run: F) -> Result<PipelineOutcome>
where
    F: Future<Output = PipelineOutcome>,
{
    let deadline = config.deadline();
    tokio::time::timeout(deadline, run).await.map_err(|_| {
        TrendwatchError::Other(format!(
            "Pipeline exceeded its {}s deadline",
            deadline.as_secs()
        ))
    })
}

fn finish(outcome: PipelineOutcome) -> Result<()> {
    info!(%outcome, "Pipeline finished");
    match outcome {
        PipelineOutcome::DeliveryFailed => {
            Err(TrendwatchError::sink("Report could not be delivered"))
        }
        _ => Ok(()),
    }
}

fn mask(secret: &str) -> String {
    if secret.is_empty() {
        String::new()
    } else {
        "********".to_string()
    }
}
