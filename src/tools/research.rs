//! Research tools
//!
//! Tools the research agent can call. The lookups run scraper jobs through the
//! job waiter; `submit_report` is the terminal tool that carries the final
//! structured report.

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::core::{Config, Result, ToolDefinition, TrendwatchError};
use crate::jobs::{AsyncJobWaiter, JobSpec, PollSettings};
use crate::tools::registry::{Tool, ToolRegistry};
use crate::tools::social::{distinct_profiles, top_videos};

pub const SEARCH_VIDEOS: &str = "search_videos";
pub const GET_PROFILES: &str = "get_profiles";
pub const SUBMIT_REPORT: &str = "submit_report";

const MAX_RESULTS: u64 = 50;
const MAX_PROFILES: usize = 10;

/// Search short videos by hashtag or keyword
pub struct SearchVideosTool {
    waiter: AsyncJobWaiter,
    actor: String,
    settings: PollSettings,
}

impl SearchVideosTool {
    pub fn new(waiter: AsyncJobWaiter, actor: impl Into<String>, settings: PollSettings) -> Self {
        Self {
            waiter,
            actor: actor.into(),
            settings,
        }
    }

    /// Scraper input for a query; `#tag` searches a hashtag, anything else is a keyword
    fn job_input(query: &str, limit: u64) -> Value {
        match query.strip_prefix('#') {
            Some(tag) => json!({ "hashtags": [tag], "resultsPerPage": limit }),
            None => json!({ "searchQueries": [query], "resultsPerPage": limit }),
        }
    }
}

#[async_trait]
impl Tool for SearchVideosTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new(
            SEARCH_VIDEOS,
            "Search recent short videos. Prefix the query with # to search a hashtag. \
             Returns the most viewed videos with author, caption, URL and engagement counts.",
            json!({
                "type": "object",
                "properties": {
                    "query": {
                        "type": "string",
                        "description": "Keyword or #hashtag to search"
                    },
                    "limit": {
                        "type": "integer",
                        "minimum": 1,
                        "description": "Maximum videos to return (default 20, max 50)"
                    }
                },
                "required": ["query"]
            }),
        )
    }

    async fn execute(&self, input: Value) -> Result<Value> {
        let query = input["query"].as_str().unwrap_or_default().trim();
        if query.is_empty() || query == "#" {
            return Err(TrendwatchError::tool("query must not be empty"));
        }
        // Integral floats such as 5.0 pass the schema's integer check
        let limit = input["limit"]
            .as_u64()
            .or_else(|| input["limit"].as_f64().map(|n| n as u64))
            .unwrap_or(20)
            .clamp(1, MAX_RESULTS);

        let spec = JobSpec::new(&self.actor, Self::job_input(query, limit));
        let items = self.waiter.run_job(&spec, self.settings).await?;
        let videos = top_videos(&items, limit as usize);

        Ok(json!({
            "query": query,
            "count": videos.len(),
            "videos": videos,
        }))
    }
}

/// Look up creator profiles by username
pub struct GetProfilesTool {
    waiter: AsyncJobWaiter,
    actor: String,
    settings: PollSettings,
}

impl GetProfilesTool {
    pub fn new(waiter: AsyncJobWaiter, actor: impl Into<String>, settings: PollSettings) -> Self {
        Self {
            waiter,
            actor: actor.into(),
            settings,
        }
    }
}

#[async_trait]
impl Tool for GetProfilesTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new(
            GET_PROFILES,
            "Get follower counts, total likes, video counts and bios for up to 10 creators. \
             Use usernames exactly as returned by search_videos.",
            json!({
                "type": "object",
                "properties": {
                    "usernames": {
                        "type": "array",
                        "items": { "type": "string" },
                        "minItems": 1,
                        "description": "Creator usernames without the @ prefix"
                    }
                },
                "required": ["usernames"]
            }),
        )
    }

    async fn execute(&self, input: Value) -> Result<Value> {
        let usernames: Vec<String> = input["usernames"]
            .as_array()
            .map(|names| {
                names
                    .iter()
                    .filter_map(Value::as_str)
                    .map(|name| name.trim().trim_start_matches('@').to_string())
                    .filter(|name| !name.is_empty())
                    .take(MAX_PROFILES)
                    .collect()
            })
            .unwrap_or_default();
        if usernames.is_empty() {
            return Err(TrendwatchError::tool("usernames must contain at least one name"));
        }

        let spec = JobSpec::new(
            &self.actor,
            json!({ "profiles": usernames, "resultsPerPage": 1 }),
        );
        let items = self.waiter.run_job(&spec, self.settings).await?;
        let profiles = distinct_profiles(&items);

        let found: Vec<String> = profiles.iter().map(|p| p.username.to_lowercase()).collect();
        let missing: Vec<&String> = usernames
            .iter()
            .filter(|name| !found.contains(&name.to_lowercase()))
            .collect();

        Ok(json!({
            "profiles": profiles,
            "not_found": missing,
        }))
    }
}

/// Definition of the terminal report tool
pub fn submit_report_definition() -> ToolDefinition {
    ToolDefinition::new(
        SUBMIT_REPORT,
        "Submit the final research report. Call this exactly once, when the research is done.",
        json!({
            "type": "object",
            "properties": {
                "title": { "type": "string", "description": "Short report title" },
                "summary": { "type": "string", "description": "Two or three sentence overview" },
                "findings": {
                    "type": "array",
                    "description": "Key findings, most important first",
                    "items": {
                        "type": "object",
                        "properties": {
                            "headline": { "type": "string" },
                            "detail": { "type": "string" },
                            "url": { "type": "string" }
                        },
                        "required": ["headline", "detail"]
                    }
                },
                "recommendations": {
                    "type": "array",
                    "items": { "type": "string" }
                }
            },
            "required": ["title", "summary", "findings"]
        }),
    )
    .terminal()
}

/// Registry with the lookup tools and the terminal report tool
pub fn research_registry(waiter: AsyncJobWaiter, config: &Config) -> Result<ToolRegistry> {
    let settings = config.poll_settings();
    let mut registry = ToolRegistry::new();

    registry.register(SearchVideosTool::new(
        waiter.clone(),
        &config.scraper.search_actor,
        settings,
    ))?;
    registry.register(GetProfilesTool::new(
        waiter,
        &config.scraper.profile_actor,
        settings,
    ))?;
    registry.register_terminal(submit_report_definition())?;

    Ok(registry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ToolCall;
    use crate::jobs::{JobService, JobStatus, ManualTimer, ResultSet, Submission};
    use std::sync::{Arc, Mutex};

    /// Finishes every job immediately and records submitted inputs
    struct InstantService {
        items: ResultSet,
        inputs: Mutex<Vec<JobSpec>>,
    }

    #[async_trait]
    impl JobService for InstantService {
        async fn submit(&self, spec: &JobSpec) -> Result<Submission> {
            self.inputs.lock().unwrap().push(spec.clone());
            Ok(Submission {
                job_id: "run".to_string(),
                result_locator: "ds".to_string(),
                status: JobStatus::Succeeded,
            })
        }

        async fn get_status(&self, _job_id: &str) -> Result<JobStatus> {
            Ok(JobStatus::Succeeded)
        }

        async fn fetch_results(&self, _locator: &str) -> Result<ResultSet> {
            Ok(self.items.clone())
        }
    }

    fn video(author: &str, views: u64) -> Value {
        json!({
            "text": "clip",
            "playCount": views,
            "authorMeta": { "name": author, "fans": views * 10 }
        })
    }

    fn registry_with(items: ResultSet) -> (ToolRegistry, Arc<InstantService>) {
        let service = Arc::new(InstantService {
            items,
            inputs: Mutex::new(Vec::new()),
        });
        let waiter = AsyncJobWaiter::new(service.clone(), Arc::new(ManualTimer::new()));
        let mut config = Config::default();
        config.polling.interval_ms = 1;
        config.scraper.search_actor = "search".to_string();
        config.scraper.profile_actor = "profiles".to_string();
        (research_registry(waiter, &config).unwrap(), service)
    }

    #[test]
    fn test_job_input_for_hashtag_and_keyword() {
        assert_eq!(
            SearchVideosTool::job_input("#rustlang", 5),
            json!({ "hashtags": ["rustlang"], "resultsPerPage": 5 })
        );
        assert_eq!(
            SearchVideosTool::job_input("rust memes", 5),
            json!({ "searchQueries": ["rust memes"], "resultsPerPage": 5 })
        );
    }

    #[test]
    fn test_registry_layout() {
        let (registry, _) = registry_with(vec![]);
        let names: Vec<_> = registry.definitions().into_iter().map(|d| d.name).collect();
        assert_eq!(names, vec![SEARCH_VIDEOS, GET_PROFILES, SUBMIT_REPORT]);
        assert_eq!(registry.terminal_tool().unwrap().definition.name, SUBMIT_REPORT);
    }

    #[tokio::test]
    async fn test_search_videos_ranks_results() {
        let (registry, service) = registry_with(vec![video("a", 1), video("b", 99)]);
        let result = registry
            .execute(&ToolCall::new(
                "c1",
                SEARCH_VIDEOS,
                json!({ "query": "#crabs", "limit": 500 }),
            ))
            .await;

        assert!(result.success);
        let output: Value = serde_json::from_str(&result.output).unwrap();
        assert_eq!(output["count"], 2);
        assert_eq!(output["videos"][0]["author"], "b");

        let inputs = service.inputs.lock().unwrap();
        assert_eq!(inputs[0].actor, "search");
        assert_eq!(inputs[0].input["resultsPerPage"], MAX_RESULTS);
    }

    #[tokio::test]
    async fn test_get_profiles_reports_missing_names() {
        let (registry, _) = registry_with(vec![video("ferris", 3)]);
        let result = registry
            .execute(&ToolCall::new(
                "c2",
                GET_PROFILES,
                json!({ "usernames": ["@Ferris", "ghost"] }),
            ))
            .await;

        assert!(result.success);
        let output: Value = serde_json::from_str(&result.output).unwrap();
        assert_eq!(output["profiles"][0]["followers"], 30);
        assert_eq!(output["not_found"], json!(["ghost"]));
    }

    #[tokio::test]
    async fn test_empty_query_becomes_error_result() {
        let (registry, service) = registry_with(vec![]);
        let result = registry
            .execute(&ToolCall::new("c3", SEARCH_VIDEOS, json!({ "query": "  " })))
            .await;

        assert!(!result.success);
        assert!(result.output.contains("query must not be empty"));
        assert!(service.inputs.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_schema_rejects_bad_limit_and_usernames() {
        let (registry, service) = registry_with(vec![video("ferris", 3)]);

        let zero = registry
            .execute(&ToolCall::new("c4", SEARCH_VIDEOS, json!({ "query": "#crabs", "limit": 0 })))
            .await;
        assert!(!zero.success);
        assert!(zero.output.contains("/limit"));

        let numbers = registry
            .execute(&ToolCall::new("c5", GET_PROFILES, json!({ "usernames": [1, 2] })))
            .await;
        assert!(!numbers.success);
        assert!(numbers.output.contains("/usernames/0"));

        assert!(service.inputs.lock().unwrap().is_empty());

        let float_limit = registry
            .execute(&ToolCall::new(
                "c6",
                SEARCH_VIDEOS,
                json!({ "query": "#crabs", "limit": 5.0 }),
            ))
            .await;
        assert!(float_limit.success);
        assert_eq!(service.inputs.lock().unwrap()[0].input["resultsPerPage"], 5);
    }
}
