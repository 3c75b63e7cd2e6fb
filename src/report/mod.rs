//! Report formatting and delivery

pub mod format;
pub mod sink;

pub use format::{
    format_count, research_report, text_payload, trend_digest, Finding, HashtagSection,
    ResearchReport,
};
pub use sink::{deliver, ReportSink, StdoutSink, WebhookSink};
