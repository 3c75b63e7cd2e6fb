//! Scraping service client
//!
//! Talks to an actor-run style scraping API: start a run, poll the run, then
//! read the run's default dataset.

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::Deserialize;
use std::time::Duration;
use url::Url;

use crate::core::{Config, Result, TrendwatchError};
use crate::jobs::waiter::{JobService, JobSpec, JobStatus, ResultSet, Submission};

/// HTTP client for the scraping service
#[derive(Clone)]
pub struct ScraperClient {
    client: Client,
    base_url: Url,
    api_token: String,
}

/// Envelope used by every run endpoint
#[derive(Debug, Deserialize)]
struct RunEnvelope {
    data: RunData,
}

/// Run object
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RunData {
    id: String,
    status: String,
    #[serde(default)]
    default_dataset_id: Option<String>,
}

/// Map a remote run status onto the four job states.
///
/// Transitional states (`TIMING-OUT`, `ABORTING`) count as still running.
pub fn map_run_status(status: &str) -> JobStatus {
    match status {
        "READY" => JobStatus::Pending,
        "SUCCEEDED" => JobStatus::Succeeded,
        "FAILED" | "TIMED-OUT" | "ABORTED" => JobStatus::Failed,
        _ => JobStatus::Running,
    }
}

impl ScraperClient {
    /// Create a new client from configuration
    pub fn from_config(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.scraper.timeout_secs))
            .build()
            .map_err(|e| TrendwatchError::scraper(format!("Failed to create HTTP client: {}", e)))?;

        Self::with_client(client, &config.scraper.base_url, &config.scraper.api_token)
    }

    /// Create a client with a custom base URL
    pub fn with_base_url(base_url: &str, api_token: impl Into<String>) -> Result<Self> {
        Self::with_client(Client::new(), base_url, &api_token.into())
    }

    fn with_client(client: Client, base_url: &str, api_token: &str) -> Result<Self> {
        // Relative joins replace the last path segment unless it ends in '/'
        let base_url = Url::parse(&format!("{}/", base_url.trim_end_matches('/')))
            .map_err(|e| TrendwatchError::config(format!("Invalid scraper URL: {}", e)))?;

        Ok(Self {
            client,
            base_url,
            api_token: api_token.to_string(),
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .map_err(|e| TrendwatchError::scraper(format!("Invalid endpoint {}: {}", path, e)))
    }

    async fn check(response: Response, action: &str) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(TrendwatchError::scraper(format!(
            "{} failed (HTTP {}): {}",
            action, status, body
        )))
    }
}

#[async_trait]
impl JobService for ScraperClient {
    async fn submit(&self, spec: &JobSpec) -> Result<Submission> {
        let url = self.endpoint(&format!("v2/acts/{}/runs", spec.actor))?;
        let response = self
            .client
            .post(url)
            .bearer_auth(&self.api_token)
            .json(&spec.input)
            .send()
            .await?;
        let run: RunEnvelope = Self::check(response, "Run submission")
            .await?
            .json()
            .await?;

        let result_locator = run.data.default_dataset_id.ok_or_else(|| {
            TrendwatchError::scraper(format!("Run {} has no default dataset", run.data.id))
        })?;

        Ok(Submission {
            status: map_run_status(&run.data.status),
            job_id: run.data.id,
            result_locator,
        })
    }

    async fn get_status(&self, job_id: &str) -> Result<JobStatus> {
        let url = self.endpoint(&format!("v2/actor-runs/{}", job_id))?;
        let response = self
            .client
            .get(url)
            .bearer_auth(&self.api_token)
            .send()
            .await?;
        let run: RunEnvelope = Self::check(response, "Status query")
            .await?
            .json()
            .await?;

        Ok(map_run_status(&run.data.status))
    }

    async fn fetch_results(&self, result_locator: &str) -> Result<ResultSet> {
        let mut url = self.endpoint(&format!("v2/datasets/{}/items", result_locator))?;
        url.query_pairs_mut()
            .append_pair("format", "json")
            .append_pair("clean", "true");

        let response = self
            .client
            .get(url)
            .bearer_auth(&self.api_token)
            .send()
            .await?;
        let items: ResultSet = Self::check(response, "Dataset read")
            .await?
            .json()
            .await?;

        Ok(items)
    }
}
