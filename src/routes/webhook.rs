//! Tweet and thread webhooks (/webhook, /webhook/thread)

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
use crate::models::{ThreadRequest, TweetRequest};
use crate::services::error::RelayError;

#[derive(Debug, Serialize)]
pub struct TweetPosted {
    pub message: &'static str,
    pub tweet_id: String,
}

#[derive(Debug, Serialize)]
pub struct ThreadPosted {
    pub message: &'static str,
    pub tweet_ids: Vec<String>,
}

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/webhook", post(post_tweet))
        .route("/webhook/thread", post(post_thread))
}

/// POST /webhook - Post one tweet, as a reply when `is_thread` names a target
async fn post_tweet(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    payload: Result<Json<TweetRequest>, JsonRejection>,
) -> Result<Json<TweetPosted>, RelayError> {
    let Json(req) = payload.map_err(invalid_payload)?;

    let session = state.twitter.session(&req.account_id)?;
    let tweet = session
        .post_tweet(&req.tweet_text, req.reply_target(), request_id(&headers))
        .await?;

    Ok(Json(TweetPosted {
        message: "Tweet posted successfully",
        tweet_id: tweet.id,
    }))
}

/// POST /webhook/thread - Post each non-blank line as a reply chain
async fn post_thread(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    payload: Result<Json<ThreadRequest>, JsonRejection>,
) -> Result<Json<ThreadPosted>, RelayError> {
    let Json(req) = payload.map_err(invalid_payload)?;

    let session = state.twitter.session(&req.account_id)?;
    let segments = req.segments();
    if segments.is_empty() {
        tracing::info!(account_id = %req.account_id, "thread payload had no content");
    }

    let posted = session.post_thread(&segments, request_id(&headers)).await?;

    Ok(Json(ThreadPosted {
        message: "Thread posted successfully",
        tweet_ids: posted.into_iter().map(|t| t.id).collect(),
    }))
}
