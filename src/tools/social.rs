//! Reshaping of raw scraper items
//!
//! Scraper datasets are loosely typed; these summaries pick the fields the
//! reports and the research model actually read.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;

const CAPTION_LIMIT: usize = 200;

/// One short video
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoSummary {
    pub author: String,
    pub caption: String,
    pub url: Option<String>,
    pub views: u64,
    pub likes: u64,
    pub comments: u64,
    pub shares: u64,
    pub posted_at: Option<String>,
}

/// One creator profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileSummary {
    pub username: String,
    pub display_name: Option<String>,
    pub followers: u64,
    pub following: u64,
    pub total_likes: u64,
    pub videos: u64,
    pub verified: bool,
    pub bio: Option<String>,
}

fn count(item: &Value, key: &str) -> u64 {
    item.get(key).and_then(Value::as_u64).unwrap_or(0)
}

fn text(item: &Value, key: &str) -> Option<String> {
    item.get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn truncate(text: &str, limit: usize) -> String {
    match text.char_indices().nth(limit) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

impl VideoSummary {
    /// Build a summary from a dataset item; items without an author are skipped
    pub fn from_item(item: &Value) -> Option<Self> {
        let author = item.get("authorMeta").and_then(|a| text(a, "name"))?;

        Some(Self {
            author,
            caption: truncate(&text(item, "text").unwrap_or_default(), CAPTION_LIMIT),
            url: text(item, "webVideoUrl"),
            views: count(item, "playCount"),
            likes: count(item, "diggCount"),
            comments: count(item, "commentCount"),
            shares: count(item, "shareCount"),
            posted_at: text(item, "createTimeISO"),
        })
    }

    /// Likes, comments and shares per view
    pub fn engagement_rate(&self) -> f64 {
        if self.views == 0 {
            return 0.0;
        }
        (self.likes + self.comments + self.shares) as f64 / self.views as f64
    }
}

impl ProfileSummary {
    pub fn from_item(item: &Value) -> Option<Self> {
        let author = item.get("authorMeta")?;

        Some(Self {
            username: text(author, "name")?,
            display_name: text(author, "nickName"),
            followers: count(author, "fans"),
            following: count(author, "following"),
            total_likes: count(author, "heart"),
            videos: count(author, "video"),
            verified: author
                .get("verified")
                .and_then(Value::as_bool)
                .unwrap_or(false),
            bio: text(author, "signature"),
        })
    }
}

/// Summaries of every usable item, most viewed first
pub fn top_videos(items: &[Value], limit: usize) -> Vec<VideoSummary> {
    let mut videos: Vec<VideoSummary> =
        items.iter().filter_map(VideoSummary::from_item).collect();
    videos.sort_by(|a, b| b.views.cmp(&a.views));
    videos.truncate(limit);
    videos
}

/// One profile per distinct username, in first-seen order
pub fn distinct_profiles(items: &[Value]) -> Vec<ProfileSummary> {
    let mut seen = HashSet::new();
    items
        .iter()
        .filter_map(ProfileSummary::from_item)
        .filter(|p| seen.insert(p.username.to_lowercase()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn item(author: &str, views: u64) -> Value {
        json!({
            "text": "new dance #fyp",
            "webVideoUrl": format!("https://video.example/{}", author),
            "playCount": views,
            "diggCount": 10,
            "commentCount": 5,
            "shareCount": 5,
            "createTimeISO": "2026-10-01T12:00:00.000Z",
            "authorMeta": {
                "name": author,
                "nickName": "Display",
                "fans": 1200,
                "following": 3,
                "heart": 50000,
                "video": 42,
                "verified": true,
                "signature": ""
            }
        })
    }

    #[test]
    fn test_video_summary() {
        let summary = VideoSummary::from_item(&item("ferris", 200)).unwrap();
        assert_eq!(summary.author, "ferris");
        assert_eq!(summary.views, 200);
        assert_eq!(summary.engagement_rate(), 0.1);
        assert!(VideoSummary::from_item(&json!({ "text": "no author" })).is_none());
    }

    #[test]
    fn test_caption_truncated_on_char_boundary() {
        let long = "é".repeat(CAPTION_LIMIT + 10);
        let truncated = truncate(&long, CAPTION_LIMIT);
        assert!(truncated.ends_with("..."));
        assert_eq!(truncated.chars().count(), CAPTION_LIMIT + 3);
    }

    #[test]
    fn test_top_videos_sorted_and_limited() {
        let items = vec![item("a", 5), item("b", 500), item("c", 50)];
        let top = top_videos(&items, 2);
        let authors: Vec<_> = top.iter().map(|v| v.author.as_str()).collect();
        assert_eq!(authors, vec!["b", "c"]);
    }

    #[test]
    fn test_distinct_profiles() {
        let items = vec![item("Ferris", 1), item("ferris", 2), item("crab", 3)];
        let profiles = distinct_profiles(&items);
        assert_eq!(profiles.len(), 2);
        assert_eq!(profiles[0].followers, 1200);
        assert!(profiles[0].verified);
        assert_eq!(profiles[0].bio, None);
    }
}
