//! Report text formatting

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::tools::social::VideoSummary;

/// Compact count: 950, 1.2K, 3.4M, 1.1B
///
/// Rounds half up to one decimal. A value that would round to 1000 of one
/// unit is shown in the next unit instead (999_950 is `1M`, not `1000K`).
pub fn format_count(n: u64) -> String {
    const UNITS: [(u64, &str); 3] = [(1_000, "K"), (1_000_000, "M"), (1_000_000_000, "B")];

    let Some(mut unit) = UNITS.iter().rposition(|&(scale, _)| n >= scale) else {
        return n.to_string();
    };

    let tenths = |scale: u64| (u128::from(n) * 10 + u128::from(scale) / 2) / u128::from(scale);
    let mut scaled = tenths(UNITS[unit].0);
    if scaled >= 10_000 && unit + 1 < UNITS.len() {
        unit += 1;
        scaled = tenths(UNITS[unit].0);
    }

    let suffix = UNITS[unit].1;
    match scaled % 10 {
        0 => format!("{}{}", scaled / 10, suffix),
        frac => format!("{}.{}{}", scaled / 10, frac, suffix),
    }
}

/// Top videos for one hashtag
#[derive(Debug, Clone)]
pub struct HashtagSection {
    pub hashtag: String,
    pub videos: Vec<VideoSummary>,
}

/// Structured report submitted by the research agent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResearchReport {
    pub title: String,
    pub summary: String,
    #[serde(default)]
    pub findings: Vec<Finding>,
    #[serde(default)]
    pub recommendations: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    pub headline: String,
    pub detail: String,
    #[serde(default)]
    pub url: Option<String>,
}

/// Webhook payload carrying plain text
pub fn text_payload(text: impl Into<String>) -> Value {
    json!({ "text": text.into() })
}

/// Text of the daily trend digest
pub fn trend_digest(date: NaiveDate, sections: &[HashtagSection], insights: &[String]) -> String {
    let mut out = format!("*Trend digest for {}*\n", date.format("%b %-d, %Y"));

    for section in sections {
        out.push_str(&format!("\n*#{}*\n", section.hashtag));
        if section.videos.is_empty() {
            out.push_str("  No videos found.\n");
            continue;
        }
        for (i, video) in section.videos.iter().enumerate() {
            out.push_str(&format!(
                "{}. @{}: {} views, {} likes, {:.1}% engagement\n",
                i + 1,
                video.author,
                format_count(video.views),
                format_count(video.likes),
                video.engagement_rate() * 100.0
            ));
            if !video.caption.is_empty() {
                out.push_str(&format!("   {}\n", video.caption));
            }
            if let Some(ref url) = video.url {
                out.push_str(&format!("   {}\n", url));
            }
        }
    }

    if !insights.is_empty() {
        out.push_str("\n*Insights*\n");
        for insight in insights {
            out.push_str(&format!("- {}\n", insight));
        }
    }

    out
}

/// Text of a research report.
///
/// The terminal tool's input is not schema-checked, so anything that does not
/// deserialize as a [`ResearchReport`] is rendered as pretty JSON.
pub fn research_report(brief: &str, report: &Value) -> String {
    let parsed: ResearchReport = match serde_json::from_value(report.clone()) {
        Ok(parsed) => parsed,
        Err(_) => {
            let pretty = serde_json::to_string_pretty(report).unwrap_or_else(|_| report.to_string());
            return format!("*Research: {}*\n```\n{}\n```\n", brief, pretty);
        }
    };

    let mut out = format!("*{}*\n_{}_\n\n{}\n", parsed.title, brief, parsed.summary);

    if !parsed.findings.is_empty() {
        out.push_str("\n*Findings*\n");
        for (i, finding) in parsed.findings.iter().enumerate() {
            out.push_str(&format!("{}. *{}*: {}\n", i + 1, finding.headline, finding.detail));
            if let Some(ref url) = finding.url {
                out.push_str(&format!("   {}\n", url));
            }
        }
    }

    if !parsed.recommendations.is_empty() {
        out.push_str("\n*Recommendations*\n");
        for rec in &parsed.recommendations {
            out.push_str(&format!("- {}\n", rec));
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_count() {
        assert_eq!(format_count(0), "0");
        assert_eq!(format_count(999), "999");
        assert_eq!(format_count(1_000), "1K");
        assert_eq!(format_count(1_240), "1.2K");
        assert_eq!(format_count(1_250), "1.3K");
        assert_eq!(format_count(3_400_000), "3.4M");
        assert_eq!(format_count(2_000_000_000), "2B");
    }

    #[test]
    fn test_format_count_carries_into_next_unit() {
        assert_eq!(format_count(999_949), "999.9K");
        assert_eq!(format_count(999_950), "1M");
        assert_eq!(format_count(999_999_999), "1B");
        assert_eq!(format_count(999_999_999_999), "1000B");
        assert_eq!(format_count(u64::MAX), "18446744073.7B");
    }

    #[test]
    fn test_trend_digest() {
        let date = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();
        let sections = vec![
            HashtagSection {
                hashtag: "rustlang".to_string(),
                videos: vec![VideoSummary {
                    author: "ferris".to_string(),
                    caption: "borrowck explained".to_string(),
                    url: Some("https://video.example/1".to_string()),
                    views: 12_500,
                    likes: 1_000,
                    comments: 100,
                    shares: 150,
                    posted_at: None,
                }],
            },
            HashtagSection {
                hashtag: "empty".to_string(),
                videos: vec![],
            },
        ];

        let text = trend_digest(date, &sections, &["Explainers are up".to_string()]);
        assert!(text.starts_with("*Trend digest for Oct 18, 2026*"));
        assert!(text.contains("1. @ferris: 12.5K views, 1K likes, 10.0% engagement"));
        assert!(text.contains("*#empty*\n  No videos found."));
        assert!(text.contains("- Explainers are up"));
    }

    #[test]
    fn test_research_report_structured() {
        let report = json!({
            "title": "Creator scan",
            "summary": "Two creators stand out.",
            "findings": [
                { "headline": "ferris grows", "detail": "+20% followers", "url": "https://x.example" }
            ],
            "recommendations": ["Reach out to ferris"]
        });

        let text = research_report("crab creators", &report);
        assert!(text.starts_with("*Creator scan*\n_crab creators_"));
        assert!(text.contains("1. *ferris grows*: +20% followers"));
        assert!(text.contains("- Reach out to ferris"));
    }

    #[test]
    fn test_research_report_falls_back_to_json() {
        let text = research_report("brief", &json!({ "notes": "free form" }));
        assert!(text.contains("\"notes\": \"free form\""));
    }
}
