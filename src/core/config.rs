//! Configuration management for Trendwatch
//!
//! Supports environment variables, config files, and runtime overrides.
//!
//! Config file location: ~/.config/trendwatch/config.toml

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use crate::core::error::{Result, TrendwatchError};
use crate::jobs::PollSettings;

/// Main configuration for Trendwatch
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Scraping service configuration
    pub scraper: ScraperConfig,
    /// Job polling configuration
    #[serde(default)]
    pub polling: PollingConfig,
    /// LLM configuration
    pub llm: LlmConfig,
    /// Research agent configuration
    #[serde(default)]
    pub agent: AgentConfig,
    /// Report webhook configuration
    #[serde(default)]
    pub webhook: WebhookConfig,
    /// Scheduled run limits
    #[serde(default)]
    pub schedule: ScheduleConfig,
}

/// Scraping service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScraperConfig {
    /// API base URL
    pub base_url: String,
    /// Bearer token for the API
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub api_token: String,
    /// Actor used for hashtag and keyword searches
    pub search_actor: String,
    /// Actor used for profile lookups
    pub profile_actor: String,
    /// Hashtags covered by the trend digest
    pub hashtags: Vec<String>,
    /// Items requested per hashtag
    pub results_per_hashtag: u32,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

/// Polling limits for remote jobs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollingConfig {
    /// Delay between status checks in milliseconds
    /// Default: 5000
    pub interval_ms: u64,
    /// Maximum number of status checks
    /// Default: 60
    pub max_attempts: u32,
}

/// LLM service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// API base URL
    pub base_url: String,
    /// API key
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub api_key: String,
    /// Model identifier
    pub model: String,
    /// Maximum tokens per completion
    pub max_tokens: u32,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

/// Research agent configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Maximum model invocations per research run
    /// Default: 10
    pub max_iterations: usize,
    /// System prompt override
    pub system_prompt: Option<String>,
    /// Whether to emit debug logging
    pub debug: bool,
}

/// Report webhook configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WebhookConfig {
    /// Incoming webhook URL; reports are printed when unset
    pub url: Option<String>,
}

/// Limits for one scheduled run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleConfig {
    /// Wall-clock deadline for a whole pipeline run in seconds
    pub deadline_secs: u64,
}

fn env_flag(key: &str) -> bool {
    env::var(key)
        .map(|v| v == "true" || v == "1")
        .unwrap_or(false)
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            base_url: env::var("SCRAPER_BASE_URL")
                .unwrap_or_else(|_| "https://api.apify.com".to_string()),
            api_token: env::var("SCRAPER_API_TOKEN").unwrap_or_default(),
            search_actor: env::var("SCRAPER_SEARCH_ACTOR")
                .unwrap_or_else(|_| "clockworks~tiktok-scraper".to_string()),
            profile_actor: env::var("SCRAPER_PROFILE_ACTOR")
                .unwrap_or_else(|_| "clockworks~tiktok-profile-scraper".to_string()),
            hashtags: env::var("TRENDWATCH_HASHTAGS")
                .map(|v| {
                    v.split(',')
                        .map(|tag| tag.trim().trim_start_matches('#').to_string())
                        .filter(|tag| !tag.is_empty())
                        .collect()
                })
                .unwrap_or_default(),
            results_per_hashtag: 20,
            timeout_secs: 60,
        }
    }
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            interval_ms: 5000,
            max_attempts: 60,
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: env::var("ANTHROPIC_BASE_URL")
                .unwrap_or_else(|_| "https://api.anthropic.com".to_string()),
            api_key: env::var("ANTHROPIC_API_KEY").unwrap_or_default(),
            model: env::var("TRENDWATCH_MODEL")
                .unwrap_or_else(|_| "claude-sonnet-4-5".to_string()),
            max_tokens: 4096,
            timeout_secs: 120,
        }
    }
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            max_iterations: 10,
            system_prompt: None,
            debug: env_flag("TRENDWATCH_DEBUG"),
        }
    }
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            deadline_secs: 15 * 60,
        }
    }
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("trendwatch")
    }

    /// Get the config file path
    pub fn config_file() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    /// Load configuration from file, environment, and defaults
    /// Priority: CLI args > config file > env vars > defaults
    pub fn load() -> Self {
        let _ = dotenvy::dotenv();

        let mut config = Self::load_from_file().unwrap_or_default();
        config.apply_secret_env();
        if config.webhook.url.is_none() {
            config.webhook.url = env::var("REPORT_WEBHOOK_URL").ok();
        }
        config
    }

    /// Load configuration from file only
    pub fn load_from_file() -> Result<Self> {
        let config_path = Self::config_file();

        if !config_path.exists() {
            return Err(TrendwatchError::config("Config file not found"));
        }

        let content = fs::read_to_string(&config_path)
            .map_err(|e| TrendwatchError::config(format!("Failed to read config: {}", e)))?;

        Self::from_toml(&content)
    }

    /// Parse configuration from TOML text
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| TrendwatchError::config(format!("Failed to parse config: {}", e)))
    }

    /// Secrets are kept out of the config file; fill them from the environment.
    fn apply_secret_env(&mut self) {
        if self.scraper.api_token.is_empty() {
            self.scraper.api_token = env::var("SCRAPER_API_TOKEN").unwrap_or_default();
        }
        if self.llm.api_key.is_empty() {
            self.llm.api_key = env::var("ANTHROPIC_API_KEY").unwrap_or_default();
        }
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<PathBuf> {
        let config_dir = Self::config_dir();
        let config_path = Self::config_file();

        if !config_dir.exists() {
            fs::create_dir_all(&config_dir).map_err(|e| {
                TrendwatchError::config(format!("Failed to create config dir: {}", e))
            })?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| TrendwatchError::config(format!("Failed to serialize config: {}", e)))?;

        fs::write(&config_path, content)
            .map_err(|e| TrendwatchError::config(format!("Failed to write config: {}", e)))?;

        Ok(config_path)
    }

    /// Check if a config file exists
    pub fn config_exists() -> bool {
        Self::config_file().exists()
    }

    /// Polling parameters for remote jobs
    pub fn poll_settings(&self) -> PollSettings {
        PollSettings::new(
            Duration::from_millis(self.polling.interval_ms),
            self.polling.max_attempts,
        )
    }

    /// Wall-clock deadline for one pipeline run
    pub fn deadline(&self) -> Duration {
        Duration::from_secs(self.schedule.deadline_secs)
    }

    /// Check that the settings needed to reach the remote services are present
    pub fn validate(&self) -> Result<()> {
        if self.scraper.api_token.is_empty() {
            return Err(TrendwatchError::config(
                "SCRAPER_API_TOKEN is not set (scraper.api_token)",
            ));
        }
        if self.llm.api_key.is_empty() {
            return Err(TrendwatchError::config(
                "ANTHROPIC_API_KEY is not set (llm.api_key)",
            ));
        }
        if self.polling.max_attempts == 0 {
            return Err(TrendwatchError::config(
                "polling.max_attempts must be at least 1",
            ));
        }
        Ok(())
    }

    /// Generate a default config file content for display
    pub fn default_config_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config)
            .unwrap_or_else(|_| String::from("# Error generating config"))
    }
}
