//! Shared fakes for the integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use trendwatch::core::{ContentBlock, Message, Result, ToolDefinition, TrendwatchError};
use trendwatch::jobs::{
    AsyncJobWaiter, JobService, JobSpec, JobStatus, ManualTimer, PollSettings, ResultSet,
    Submission,
};
use trendwatch::llm::{GenerateOptions, LLMProvider, LLMResponse};
use trendwatch::report::ReportSink;

/// Job service with scripted statuses and call counters
pub struct FakeJobService {
    statuses: Mutex<VecDeque<std::result::Result<JobStatus, String>>>,
    /// Status reported once the script is used up
    idle: JobStatus,
    submit_error: Option<String>,
    /// Submissions whose input JSON contains one of these fail
    failing_inputs: Vec<String>,
    items: ResultSet,
    pub submissions: Mutex<Vec<JobSpec>>,
    pub status_queries: AtomicU32,
    pub fetches: AtomicU32,
}

impl FakeJobService {
    fn with_idle(idle: JobStatus) -> Self {
        Self {
            statuses: Mutex::new(VecDeque::new()),
            idle,
            submit_error: None,
            failing_inputs: Vec::new(),
            items: Vec::new(),
            submissions: Mutex::new(Vec::new()),
            status_queries: AtomicU32::new(0),
            fetches: AtomicU32::new(0),
        }
    }

    /// Every job succeeds on its first status query
    pub fn succeeding(items: ResultSet) -> Self {
        Self {
            items,
            ..Self::with_idle(JobStatus::Succeeded)
        }
    }

    /// Every job stays running
    pub fn never_finishing() -> Self {
        Self::with_idle(JobStatus::Running)
    }

    /// Scripted poll answers; `Err` entries fail the status query
    pub fn scripted(statuses: Vec<std::result::Result<JobStatus, String>>, idle: JobStatus) -> Self {
        let service = Self::with_idle(idle);
        *service.statuses.lock().unwrap() = statuses.into();
        service
    }

    pub fn failing_submission(mut self, reason: &str) -> Self {
        self.submit_error = Some(reason.to_string());
        self
    }

    pub fn failing_for(mut self, needle: &str) -> Self {
        self.failing_inputs.push(needle.to_string());
        self
    }

    pub fn status_queries(&self) -> u32 {
        self.status_queries.load(Ordering::SeqCst)
    }

    pub fn fetches(&self) -> u32 {
        self.fetches.load(Ordering::SeqCst)
    }

    pub fn submission_count(&self) -> usize {
        self.submissions.lock().unwrap().len()
    }
}

#[async_trait]
impl JobService for FakeJobService {
    async fn submit(&self, spec: &JobSpec) -> Result<Submission> {
        self.submissions.lock().unwrap().push(spec.clone());

        if let Some(ref reason) = self.submit_error {
            return Err(TrendwatchError::scraper(reason.clone()));
        }
        let input = spec.input.to_string();
        if self.failing_inputs.iter().any(|needle| input.contains(needle)) {
            return Err(TrendwatchError::scraper("actor rejected input"));
        }

        let n = self.submissions.lock().unwrap().len();
        Ok(Submission {
            job_id: format!("run-{}", n),
            result_locator: format!("dataset-{}", n),
            status: JobStatus::Pending,
        })
    }

    async fn get_status(&self, _job_id: &str) -> Result<JobStatus> {
        self.status_queries.fetch_add(1, Ordering::SeqCst);
        match self.statuses.lock().unwrap().pop_front() {
            Some(Ok(status)) => Ok(status),
            Some(Err(reason)) => Err(TrendwatchError::scraper(reason)),
            None => Ok(self.idle),
        }
    }

    async fn fetch_results(&self, _result_locator: &str) -> Result<ResultSet> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        Ok(self.items.clone())
    }
}

/// Waiter over `service` with a fake clock
pub fn waiter(service: Arc<FakeJobService>) -> (AsyncJobWaiter, Arc<ManualTimer>) {
    let timer = Arc::new(ManualTimer::new());
    (AsyncJobWaiter::new(service, timer.clone()), timer)
}

pub fn poll_settings(max_attempts: u32) -> PollSettings {
    PollSettings::new(Duration::from_secs(5), max_attempts)
}

/// Model that replays scripted replies and records what it was sent
pub struct ScriptedModel {
    replies: Mutex<VecDeque<std::result::Result<LLMResponse, String>>>,
    pub seen: Mutex<Vec<Vec<Message>>>,
}

impl ScriptedModel {
    pub fn new(replies: Vec<LLMResponse>) -> Self {
        Self::with_results(replies.into_iter().map(Ok).collect())
    }

    pub fn with_results(replies: Vec<std::result::Result<LLMResponse, String>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.seen.lock().unwrap().len()
    }

    /// Tool result blocks of the last user turn sent on call `index`
    pub fn tool_results_sent(&self, index: usize) -> Vec<(String, String, bool)> {
        let seen = self.seen.lock().unwrap();
        let Some(last) = seen.get(index).and_then(|turns| turns.last()) else {
            return Vec::new();
        };
        last.content
            .iter()
            .filter_map(|block| match block {
                ContentBlock::ToolResult {
                    tool_use_id,
                    content,
                    is_error,
                } => Some((tool_use_id.clone(), content.clone(), *is_error)),
                _ => None,
            })
            .collect()
    }

    fn next(&self, messages: &[Message]) -> Result<LLMResponse> {
        self.seen.lock().unwrap().push(messages.to_vec());
        match self.replies.lock().unwrap().pop_front() {
            Some(Ok(reply)) => Ok(reply),
            Some(Err(e)) => Err(TrendwatchError::llm(e)),
            None => Err(TrendwatchError::llm("script exhausted")),
        }
    }
}

#[async_trait]
impl LLMProvider for ScriptedModel {
    async fn chat(
        &self,
        _system_prompt: &str,
        messages: &[Message],
        _options: Option<GenerateOptions>,
    ) -> Result<LLMResponse> {
        self.next(messages)
    }

    async fn chat_with_tools(
        &self,
        _system_prompt: &str,
        messages: &[Message],
        _tools: &[ToolDefinition],
        _options: Option<GenerateOptions>,
    ) -> Result<LLMResponse> {
        self.next(messages)
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

/// Sink that keeps every payload
#[derive(Default)]
pub struct RecordingSink {
    pub payloads: Mutex<Vec<Value>>,
    pub fail: bool,
}

impl RecordingSink {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    pub fn texts(&self) -> Vec<String> {
        self.payloads
            .lock()
            .unwrap()
            .iter()
            .filter_map(|p| p["text"].as_str().map(str::to_string))
            .collect()
    }
}

#[async_trait]
impl ReportSink for RecordingSink {
    async fn send(&self, payload: &Value) -> Result<()> {
        self.payloads.lock().unwrap().push(payload.clone());
        if self.fail {
            return Err(TrendwatchError::sink("HTTP 500"));
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "recording"
    }
}

/// A scraper video item
pub fn video_item(author: &str, views: u64) -> Value {
    json!({
        "text": format!("{} dancing", author),
        "webVideoUrl": format!("https://video.example/{}", author),
        "playCount": views,
        "diggCount": views / 10,
        "commentCount": views / 100,
        "shareCount": views / 100,
        "authorMeta": {
            "name": author,
            "nickName": author.to_uppercase(),
            "fans": views * 2,
            "following": 10,
            "heart": views * 5,
            "video": 42,
            "verified": false
        }
    })
}
