//! LLM module - Language Model integrations
//!
//! Provides the provider abstraction, the Messages API client, and the
//! free-text JSON fallback parser.

pub mod anthropic;
pub mod extract;
pub mod traits;

pub use anthropic::AnthropicClient;
pub use extract::extract_json;
pub use traits::{GenerateOptions, LLMProvider, LLMResponse, TokenUsage};
