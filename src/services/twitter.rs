use std::sync::Arc;

use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

use super::credentials::{AccountCredential, CredentialStore};
use super::error::RelayError;
use super::oauth1;

/// Builds per-account sessions. Holds no per-account state.
#[derive(Clone)]
pub struct TwitterClient {
    api_base: String,
    credentials: Arc<CredentialStore>,
    http: Client,
}

impl TwitterClient {
    pub fn new(api_base: &str, credentials: CredentialStore, http: Client) -> Self {
        Self {
            api_base: api_base.trim_end_matches('/').to_string(),
            credentials: Arc::new(credentials),
            http,
        }
    }

    /// Resolve credentials and return a freshly signed session for `account_id`.
    /// Fails without touching the network when the account is not configured.
    pub fn session(&self, account_id: &str) -> Result<TwitterSession, RelayError> {
        let credential = self.credentials.lookup(account_id)?;
        Ok(TwitterSession {
            api_base: self.api_base.clone(),
            credential,
            http: self.http.clone(),
        })
    }
}

/// An authenticated session bound to one account
pub struct TwitterSession {
    api_base: String,
    credential: AccountCredential,
    http: Client,
}

impl TwitterSession {
    /// Post a tweet, optionally as a reply. Success is exactly 201 Created.
    pub async fn post_tweet(
        &self,
        text: &str,
        in_reply_to: Option<&str>,
        request_id: Option<&str>,
    ) -> Result<TweetResponse, RelayError> {
        let url = format!("{}/2/tweets", self.api_base);

        let mut body = serde_json::json!({ "text": text });
        if let Some(parent_id) = in_reply_to {
            body["reply"] = serde_json::json!({
                "in_reply_to_tweet_id": parent_id
            });
        }

        let mut request = self
            .http
            .post(&url)
            .header(
                "Authorization",
                oauth1::sign_request(&self.credential, "POST", &url),
            )
            .json(&body);
        if let Some(id) = request_id {
            request = request.header("X-Request-Id", id);
        }

        let resp = request.send().await?;
        let status = resp.status();
        let text = resp.text().await?;

        if status != StatusCode::CREATED {
            tracing::warn!(
                account_id = %self.credential.account_id,
                status = status.as_u16(),
                "tweet creation rejected"
            );
            return Err(RelayError::PublishFailure {
                service: "Twitter",
                status: status.as_u16(),
                body: text,
            });
        }

        let wrapper: TweetResponseWrapper =
            serde_json::from_str(&text).map_err(|e| RelayError::PublishFailure {
                service: "Twitter",
                status: status.as_u16(),
                body: format!("unreadable response ({e}): {text}"),
            })?;

        tracing::info!(
            account_id = %self.credential.account_id,
            tweet_id = %wrapper.data.id,
            reply_to = in_reply_to.unwrap_or(""),
            "tweet posted"
        );
        Ok(wrapper.data)
    }

    /// Post `segments` as a reply chain. Blank segments are skipped; the first
    /// non-blank one starts the chain. Stops at the first failure, leaving any
    /// tweets already posted in place.
    pub async fn post_thread(
        &self,
        segments: &[String],
        request_id: Option<&str>,
    ) -> Result<Vec<PostedTweet>, RelayError> {
        let mut posted: Vec<PostedTweet> = Vec::new();
        let mut previous_tweet_id: Option<String> = None;

        for text in segments.iter().map(|s| s.trim()).filter(|s| !s.is_empty()) {
            let segment_request_id = request_id.map(|id| format!("{}-{}", id, posted.len()));

            let result = self
                .post_tweet(
                    text,
                    previous_tweet_id.as_deref(),
                    segment_request_id.as_deref(),
                )
                .await;

            match result {
                Ok(tweet) => {
                    posted.push(PostedTweet {
                        id: tweet.id.clone(),
                        reply_to: previous_tweet_id.take(),
                    });
                    previous_tweet_id = Some(tweet.id);
                }
                Err(e) => {
                    if !posted.is_empty() {
                        let ids: Vec<&str> = posted.iter().map(|t| t.id.as_str()).collect();
                        tracing::error!(
                            account_id = %self.credential.account_id,
                            posted = ?ids,
                            "thread failed part-way; posted tweets were left in place"
                        );
                    }
                    return Err(e);
                }
            }
        }

        Ok(posted)
    }

    /// Check the credentials against the identity endpoint
    pub async fn verify(&self) -> Result<TwitterUser, RelayError> {
        let url = format!("{}/2/users/me", self.api_base);

        let resp = self
            .http
            .get(&url)
            .header(
                "Authorization",
                oauth1::sign_request(&self.credential, "GET", &url),
            )
            .send()
            .await?;

        let status = resp.status();
        let text = resp.text().await?;

        if !status.is_success() {
            return Err(RelayError::PublishFailure {
                service: "Twitter",
                status: status.as_u16(),
                body: text,
            });
        }

        let wrapper: UserResponse =
            serde_json::from_str(&text).map_err(|e| RelayError::PublishFailure {
                service: "Twitter",
                status: status.as_u16(),
                body: format!("unreadable response ({e}): {text}"),
            })?;
        Ok(wrapper.data)
    }
}

#[derive(Debug, Deserialize)]
struct TweetResponseWrapper {
    data: TweetResponse,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct TweetResponse {
    pub id: String,
    #[serde(default)]
    pub text: String,
}

/// One link of a posted thread
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PostedTweet {
    pub id: String,
    pub reply_to: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UserResponse {
    data: TwitterUser,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct TwitterUser {
    pub id: String,
    pub name: String,
    pub username: String,
}
