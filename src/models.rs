//! Inbound webhook payloads shared across routes and services

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::services::error::RelayError;

/// Lowercase URL slug; also used verbatim in storage keys
static SLUG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9][a-z0-9-]*$").expect("valid slug regex"));

/// Body of `POST /webhook`
#[derive(Debug, Clone, Deserialize)]
pub struct TweetRequest {
    pub account_id: String,
    /// Reply target, honoured only when `is_thread` is set
    #[serde(default)]
    pub tweet_id: Option<String>,
    pub tweet_text: String,
    #[serde(default)]
    pub is_thread: bool,
}

impl TweetRequest {
    pub fn reply_target(&self) -> Option<&str> {
        if self.is_thread {
            self.tweet_id.as_deref().filter(|id| !id.trim().is_empty())
        } else {
            None
        }
    }
}

/// Body of `POST /webhook/thread`
#[derive(Debug, Clone, Deserialize)]
pub struct ThreadRequest {
    pub account_id: String,
    /// Newline-delimited raw text, one tweet per non-blank line
    pub thread_payload: String,
}

impl ThreadRequest {
    /// Ordered, trimmed, non-empty segments of the payload
    pub fn segments(&self) -> Vec<String> {
        self.thread_payload
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(String::from)
            .collect()
    }
}

/// A generated article delivered to `POST /machinedai/`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Article {
    pub cluster_id: String,
    pub cluster_name: String,
    pub article_id: String,
    pub title: String,
    pub slug: String,
    pub meta_description: String,
    /// Markdown source of the article body
    pub article_body: String,
    pub featured_image_url: String,
    pub featured_image_alt_text: String,
    pub featured_image_caption: String,
    pub target_keyword: String,
    pub language: String,
    pub tone_of_voice: String,
    pub point_of_view: String,
    pub article_length: String,
    pub ai_model: String,
    pub created_at: String,
}

impl Article {
    /// The slug becomes part of object keys and local paths, so only
    /// `[a-z0-9-]` is accepted.
    pub fn check_slug(&self) -> Result<&str, RelayError> {
        if SLUG.is_match(&self.slug) {
            Ok(&self.slug)
        } else {
            Err(RelayError::InvalidPayload(format!(
                "slug {:?} must match [a-z0-9][a-z0-9-]*",
                self.slug
            )))
        }
    }
}

#[cfg(test)]
pub(crate) fn sample_article() -> Article {
    Article {
        cluster_id: "cl-7".into(),
        cluster_name: "Solo founders".into(),
        article_id: "art-42".into(),
        title: "Pricing your first product".into(),
        slug: "pricing-your-first-product".into(),
        meta_description: "How to set a price without guessing.".into(),
        article_body: "# Pricing\n\nRead [the guide](pricing-guide) first.\n".into(),
        featured_image_url: "https://images.example.com/pricing.png".into(),
        featured_image_alt_text: "Price tags".into(),
        featured_image_caption: "Photo by someone".into(),
        target_keyword: "product pricing".into(),
        language: "en".into(),
        tone_of_voice: "friendly".into(),
        point_of_view: "second person".into(),
        article_length: "1200".into(),
        ai_model: "gpt-4o".into(),
        created_at: "2024-05-01T10:00:00Z".into(),
    }
}
