//! Webflow collection publishing for generated articles

use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::{Value, json};

use super::content;
use super::error::RelayError;
use crate::config::CmsConfig;
use crate::models::Article;

#[derive(Clone)]
pub struct CmsClient {
    config: CmsConfig,
    http: Client,
}

/// Reference ids every item is filed under
#[derive(Debug, Clone, Copy)]
pub struct ItemRefs<'a> {
    pub category_id: &'a str,
    pub author_id: &'a str,
}

/// Map an article onto the collection's field keys.
pub fn build_item_payload(
    article: &Article,
    body_html: &str,
    featured_url: &str,
    thumbnail_url: &str,
    refs: ItemRefs<'_>,
) -> Value {
    json!({
        "isArchived": false,
        "isDraft": false,
        "fieldData": {
            "name": article.title,
            "slug": article.slug,
            "post-summary": article.meta_description,
            "post-body": body_html,
            "main-image": featured_url,
            "thumbnail-image": thumbnail_url,
            "main-image-alt-text": article.featured_image_alt_text,
            "image-caption": article.featured_image_caption,
            "category": refs.category_id,
            "author": refs.author_id,
            "target-keyword": article.target_keyword,
            "cluster-id": article.cluster_id,
            "article-id": article.article_id,
        }
    })
}

struct Settings<'a> {
    token: &'a str,
    collection_id: &'a str,
    refs: ItemRefs<'a>,
}

#[derive(Debug, Deserialize)]
struct CreatedItem {
    id: Option<String>,
}

impl CmsClient {
    pub fn new(config: CmsConfig, http: Client) -> Self {
        Self { config, http }
    }

    fn required<'a>(value: &'a Option<String>, name: &'static str) -> Result<&'a str, RelayError> {
        value.as_deref().ok_or(RelayError::NotConfigured(name))
    }

    fn settings(&self) -> Result<Settings<'_>, RelayError> {
        Ok(Settings {
            token: Self::required(&self.config.api_token, "WEBFLOW_API_TOKEN")?,
            collection_id: Self::required(&self.config.collection_id, "WEBFLOW_COLLECTION_ID")?,
            refs: ItemRefs {
                category_id: Self::required(&self.config.category_id, "WEBFLOW_CATEGORY_ID")?,
                author_id: Self::required(&self.config.author_id, "WEBFLOW_AUTHOR_ID")?,
            },
        })
    }

    /// Fail early, before any image is uploaded for an item that cannot be created
    pub fn ensure_configured(&self) -> Result<(), RelayError> {
        self.settings().map(|_| ())
    }

    /// Create a new collection item for `article`. Success is exactly 200 OK.
    /// Returns the item id when the API reports one.
    pub async fn publish(
        &self,
        article: &Article,
        featured_url: &str,
        thumbnail_url: &str,
        request_id: Option<&str>,
    ) -> Result<Option<String>, RelayError> {
        let Settings {
            token,
            collection_id,
            refs,
        } = self.settings()?;

        let body_html = content::to_rich_html(&article.article_body);
        let payload = build_item_payload(article, &body_html, featured_url, thumbnail_url, refs);

        let url = format!(
            "{}/v2/collections/{}/items",
            self.config.api_base.trim_end_matches('/'),
            collection_id
        );

        let mut request = self
            .http
            .post(&url)
            .bearer_auth(token)
            .header("accept", "application/json")
            .json(&payload);
        if let Some(id) = request_id {
            request = request.header("X-Request-Id", id);
        }

        let resp = request.send().await?;
        let status = resp.status();
        let text = resp.text().await?;

        if status != StatusCode::OK {
            tracing::warn!(slug = %article.slug, status = status.as_u16(), "CMS rejected item");
            return Err(RelayError::PublishFailure {
                service: "Webflow",
                status: status.as_u16(),
                body: text,
            });
        }

        let item_id = serde_json::from_str::<CreatedItem>(&text)
            .ok()
            .and_then(|item| item.id);
        tracing::info!(slug = %article.slug, item_id = ?item_id, "article published");
        Ok(item_id)
    }
}
