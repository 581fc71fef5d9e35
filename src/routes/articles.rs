//! Article publishing webhook (/machinedai/)
//!
//! Checks the slug and CMS settings, then runs fetch image → resize → upload
//! both variants → render body → create CMS item, in that order. Nothing is
//! rolled back: a CMS failure after the uploads leaves the two objects in the
//! bucket.

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::HeaderMap,
    routing::post,
};
use serde::Serialize;
use std::sync::Arc;

use super::{invalid_payload, request_id};
use crate::AppState;
use crate::models::Article;
use crate::services::error::RelayError;
use crate::services::images;
use crate::storage::{featured_key, thumbnail_key};

#[derive(Debug, Serialize)]
pub struct ArticlePublished {
    pub message: &'static str,
    pub item_id: Option<String>,
}

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/machinedai/", post(publish_article))
}

/// POST /machinedai/ - Publish a generated article with its images
async fn publish_article(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    payload: Result<Json<Article>, JsonRejection>,
) -> Result<Json<ArticlePublished>, RelayError> {
    let Json(article) = payload.map_err(invalid_payload)?;

    let slug = article.check_slug()?;
    state.cms.ensure_configured()?;

    tracing::info!(
        article_id = %article.article_id,
        slug,
        "publishing article"
    );

    let variants = images::build_variants(&state.http, &article.featured_image_url).await?;
    tracing::debug!(
        featured = ?variants.featured_dimensions,
        thumbnail = ?variants.thumbnail_dimensions,
        "image variants ready"
    );

    let featured_url = state
        .assets
        .upload_png(&featured_key(slug), variants.featured)
        .await?;
    let thumbnail_url = state
        .assets
        .upload_png(&thumbnail_key(slug), variants.thumbnail)
        .await?;

    let item_id = state
        .cms
        .publish(&article, &featured_url, &thumbnail_url, request_id(&headers))
        .await?;

    Ok(Json(ArticlePublished {
        message: "Article published successfully",
        item_id,
    }))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use crate::models::sample_article;
    use std::sync::Arc;
    use std::time::Duration;

    use crate::routes::test_support::{app_state, json_body, post_json, send, state};
    use crate::services::cms::{CmsClient, tests::cms_config};
    use crate::services::images::tests::png_fixture;

    fn article_for(server: &MockServer) -> serde_json::Value {
        let mut article = serde_json::to_value(sample_article()).unwrap();
        article["featured_image_url"] = json!(format!("{}/img/pricing.png;", server.uri()));
        article
    }

    async fn mount_image(server: &MockServer) {
        Mock::given(method("GET"))
            .and(path("/img/pricing.png"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(png_fixture(200, 100)))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_article_pipeline_uploads_and_publishes() {
        let server = MockServer::start().await;
        mount_image(&server).await;
        Mock::given(method("POST"))
            .and(path("/v2/collections/col-1/items"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "item-77" })))
            .expect(1)
            .mount(&server)
            .await;
        let dir = tempfile::tempdir().unwrap();

        let response = send(
            state(&server.uri(), dir.path()),
            post_json("/machinedai/", article_for(&server)),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["message"], "Article published successfully");
        assert_eq!(body["item_id"], "item-77");

        let featured = image::open(dir.path().join("blogimages/pricing-your-first-product-featured.png"))
            .unwrap();
        let thumbnail =
            image::open(dir.path().join("blogimages/pricing-your-first-product-thumbnail.png"))
                .unwrap();
        assert_eq!((featured.width(), featured.height()), (140, 70));
        assert_eq!((thumbnail.width(), thumbnail.height()), (70, 35));

        let received = server.received_requests().await.unwrap();
        let cms_request = received
            .iter()
            .find(|r| r.method.as_str() == "POST")
            .unwrap();
        assert_eq!(cms_request.headers.get("x-request-id").unwrap(), "req-7");

        let payload: serde_json::Value = serde_json::from_slice(&cms_request.body).unwrap();
        let fields = &payload["fieldData"];
        assert_eq!(
            fields["main-image"],
            "https://relay-assets.s3.us-east-1.amazonaws.com/blogimages/pricing-your-first-product-featured.png"
        );
        assert_eq!(
            fields["thumbnail-image"],
            "https://relay-assets.s3.us-east-1.amazonaws.com/blogimages/pricing-your-first-product-thumbnail.png"
        );
        assert!(
            fields["post-body"]
                .as_str()
                .unwrap()
                .contains(r#"href="/blog/pricing-guide""#)
        );
    }

    #[tokio::test]
    async fn test_cms_rejection_is_500_and_keeps_uploads() {
        let server = MockServer::start().await;
        mount_image(&server).await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_string("validation failed"))
            .mount(&server)
            .await;
        let dir = tempfile::tempdir().unwrap();

        let response = send(
            state(&server.uri(), dir.path()),
            post_json("/machinedai/", article_for(&server)),
        )
        .await;

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let detail = json_body(response).await["detail"].as_str().unwrap().to_string();
        assert!(detail.contains("400") && detail.contains("validation failed"), "{detail}");
        assert!(
            dir.path()
                .join("blogimages/pricing-your-first-product-featured.png")
                .exists()
        );
    }

    #[tokio::test]
    async fn test_unreachable_image_stops_before_upload() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
        let dir = tempfile::tempdir().unwrap();

        let response = send(
            state(&server.uri(), dir.path()),
            post_json("/machinedai/", article_for(&server)),
        )
        .await;

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!dir.path().join("blogimages").exists());
        let received = server.received_requests().await.unwrap();
        assert!(received.iter().all(|r| r.method.as_str() == "GET"));
    }

    #[tokio::test]
    async fn test_missing_article_field_is_500() {
        let server = MockServer::start().await;
        let dir = tempfile::tempdir().unwrap();
        let mut article = article_for(&server);
        article.as_object_mut().unwrap().remove("title");

        let response = send(
            state(&server.uri(), dir.path()),
            post_json("/machinedai/", article),
        )
        .await;

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_path_like_slug_is_rejected_before_any_io() {
        let server = MockServer::start().await;
        mount_image(&server).await;
        let root = tempfile::tempdir().unwrap();
        let assets = root.path().join("assets");

        let mut article = article_for(&server);
        article["slug"] = json!("../../escaped");

        let response = send(state(&server.uri(), &assets), post_json("/machinedai/", article)).await;

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let detail = json_body(response).await["detail"].as_str().unwrap().to_string();
        assert!(detail.starts_with("Invalid payload"), "{detail}");
        assert!(server.received_requests().await.unwrap().is_empty());
        assert!(!root.path().join("escaped-featured.png").exists());
        assert!(!assets.exists());
    }

    #[tokio::test]
    async fn test_unconfigured_cms_fails_before_image_fetch() {
        let server = MockServer::start().await;
        mount_image(&server).await;
        let dir = tempfile::tempdir().unwrap();

        let mut config = cms_config(&server.uri());
        config.collection_id = None;
        let mut app = app_state(&server.uri(), dir.path(), Duration::from_secs(5));
        app.cms = CmsClient::new(config, reqwest::Client::new());

        let response = send(Arc::new(app), post_json("/machinedai/", article_for(&server))).await;

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            json_body(response).await["detail"],
            "WEBFLOW_COLLECTION_ID is not configured"
        );
        assert!(server.received_requests().await.unwrap().is_empty());
        assert!(!dir.path().join("blogimages").exists());
    }

    #[tokio::test]
    async fn test_hung_image_host_times_out_as_500() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_bytes(png_fixture(20, 10))
                    .set_delay(Duration::from_secs(5)),
            )
            .mount(&server)
            .await;
        let dir = tempfile::tempdir().unwrap();
        let app = Arc::new(app_state(&server.uri(), dir.path(), Duration::from_millis(200)));

        let response = send(app, post_json("/machinedai/", article_for(&server))).await;

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let detail = json_body(response).await["detail"].as_str().unwrap().to_string();
        assert!(detail.starts_with("Failed to fetch image"), "{detail}");
        assert!(!dir.path().join("blogimages").exists());
    }

    #[tokio::test]
    async fn test_hung_cms_times_out_as_500() {
        let server = MockServer::start().await;
        mount_image(&server).await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "id": "late" }))
                    .set_delay(Duration::from_secs(5)),
            )
            .mount(&server)
            .await;
        let dir = tempfile::tempdir().unwrap();
        let app = Arc::new(app_state(&server.uri(), dir.path(), Duration::from_millis(500)));

        let response = send(app, post_json("/machinedai/", article_for(&server))).await;

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = json_body(response).await;
        assert!(body["detail"].as_str().unwrap().starts_with("HTTP error"));
        assert!(body.get("item_id").is_none());
    }
}
