mod config;
mod constants;
mod logging;
mod models;
mod routes;
mod services;
mod storage;

use axum::extract::{DefaultBodyLimit, Request};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use config::Config;
use constants::REQUEST_ID_HEADER;
use services::cms::CmsClient;
use services::credentials::CredentialStore;
use services::twitter::TwitterClient;
use storage::AssetStore;

pub struct AppState {
    pub twitter: TwitterClient,
    /// Shared client for image downloads; carries the outbound timeout
    pub http: reqwest::Client,
    pub assets: AssetStore,
    pub cms: CmsClient,
    /// Accounts checked by `/health/accounts`
    pub known_accounts: Vec<String>,
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    logging::init();

    let config = Config::from_env();

    let http = reqwest::Client::builder()
        .timeout(config.http_timeout)
        .build()
        .expect("Failed to build HTTP client");

    // Snapshot of the environment; per-account tokens are resolved per request
    let credentials = CredentialStore::from_env();

    let assets = AssetStore::from_config(&config.storage, config.http_timeout);
    if config.storage.bucket.is_none() {
        tracing::warn!("S3_BUCKET_NAME not set; article publishing will fail");
    }
    let storage_backend = assets.backend_name();

    let state = Arc::new(AppState {
        twitter: TwitterClient::new(&config.twitter_api_base, credentials, http.clone()),
        assets,
        cms: CmsClient::new(config.cms.clone(), http.clone()),
        http,
        known_accounts: config.known_accounts.clone(),
    });

    let trace = TraceLayer::new_for_http().make_span_with(|request: &Request| {
        let request_id = request
            .headers()
            .get(REQUEST_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("");
        tracing::info_span!(
            "http",
            method = %request.method(),
            uri = %request.uri(),
            request_id
        )
    });

    let app = routes::build_routes()
        .layer(DefaultBodyLimit::max(config.max_body_bytes))
        .layer(trace)
        .with_state(state);

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind listen address");

    tracing::info!(
        %addr,
        storage = storage_backend,
        "relay listening"
    );
    axum::serve(listener, app).await.expect("Server error");
}

