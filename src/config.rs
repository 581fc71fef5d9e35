//! Environment-driven configuration.
//!
//! Nothing here is required at boot. Values a request needs but cannot find
//! surface as `RelayError::NotConfigured` for that request only.

use std::path::PathBuf;
use std::time::Duration;

use crate::constants::{
    DEFAULT_AWS_REGION, DEFAULT_HTTP_TIMEOUT_SECS, DEFAULT_MAX_BODY_BYTES, DEFAULT_PORT,
    DEFAULT_TWITTER_API_BASE, DEFAULT_WEBFLOW_API_BASE,
};

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub http_timeout: Duration,
    pub max_body_bytes: usize,
    pub twitter_api_base: String,
    /// Accounts checked by `GET /health/accounts`
    pub known_accounts: Vec<String>,
    pub storage: StorageConfig,
    pub cms: CmsConfig,
}

#[derive(Debug, Clone, Default)]
pub struct StorageConfig {
    pub bucket: Option<String>,
    pub region: String,
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
    /// When set, assets are written here instead of S3
    pub local_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Default)]
pub struct CmsConfig {
    pub api_base: String,
    pub api_token: Option<String>,
    pub collection_id: Option<String>,
    pub category_id: Option<String>,
    pub author_id: Option<String>,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let parsed = |key: &str| get(key).and_then(|v| v.trim().parse::<u64>().ok());

        let port = parsed("PORT")
            .and_then(|p| u16::try_from(p).ok())
            .unwrap_or(DEFAULT_PORT);

        let http_timeout = Duration::from_secs(
            parsed("HTTP_TIMEOUT_SECS")
                .filter(|v| *v > 0)
                .unwrap_or(DEFAULT_HTTP_TIMEOUT_SECS),
        );

        let max_body_bytes = parsed("MAX_BODY_BYTES")
            .and_then(|v| usize::try_from(v).ok())
            .filter(|v| *v > 0)
            .unwrap_or(DEFAULT_MAX_BODY_BYTES);

        let known_accounts = get("KNOWN_ACCOUNTS")
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default();

        Self {
            port,
            http_timeout,
            max_body_bytes,
            twitter_api_base: get("TWITTER_API_BASE")
                .unwrap_or_else(|| DEFAULT_TWITTER_API_BASE.to_string()),
            known_accounts,
            storage: StorageConfig {
                bucket: get("S3_BUCKET_NAME"),
                region: get("AWS_REGION").unwrap_or_else(|| DEFAULT_AWS_REGION.to_string()),
                access_key_id: get("AWS_ACCESS_KEY_ID"),
                secret_access_key: get("AWS_SECRET_ACCESS_KEY"),
                local_path: get("LOCAL_STORAGE_PATH").map(PathBuf::from),
            },
            cms: CmsConfig {
                api_base: get("WEBFLOW_API_BASE")
                    .unwrap_or_else(|| DEFAULT_WEBFLOW_API_BASE.to_string()),
                api_token: get("WEBFLOW_API_TOKEN"),
                collection_id: get("WEBFLOW_COLLECTION_ID"),
                category_id: get("WEBFLOW_CATEGORY_ID"),
                author_id: get("WEBFLOW_AUTHOR_ID"),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults_when_environment_is_empty() {
        let config = config_from(&[]);
        assert_eq!(config.port, 8000);
        assert_eq!(config.http_timeout, Duration::from_secs(30));
        assert_eq!(config.twitter_api_base, "https://api.twitter.com");
        assert_eq!(config.storage.region, "us-east-1");
        assert!(config.storage.bucket.is_none());
        assert!(config.cms.api_token.is_none());
        assert!(config.known_accounts.is_empty());
    }

    #[test]
    fn test_reads_values_and_ignores_blanks() {
        let config = config_from(&[
            ("PORT", "9100"),
            ("HTTP_TIMEOUT_SECS", "5"),
            ("S3_BUCKET_NAME", "assets"),
            ("AWS_REGION", "eu-west-2"),
            ("WEBFLOW_API_TOKEN", "   "),
            ("WEBFLOW_CATEGORY_ID", "cat-1"),
            ("KNOWN_ACCOUNTS", "alpha, beta,,gamma "),
        ]);
        assert_eq!(config.port, 9100);
        assert_eq!(config.http_timeout, Duration::from_secs(5));
        assert_eq!(config.storage.bucket.as_deref(), Some("assets"));
        assert_eq!(config.storage.region, "eu-west-2");
        assert!(config.cms.api_token.is_none());
        assert_eq!(config.cms.category_id.as_deref(), Some("cat-1"));
        assert_eq!(config.known_accounts, vec!["alpha", "beta", "gamma"]);
    }

    #[test]
    fn test_invalid_numbers_fall_back() {
        let config = config_from(&[("PORT", "99999"), ("HTTP_TIMEOUT_SECS", "0")]);
        assert_eq!(config.port, 8000);
        assert_eq!(config.http_timeout, Duration::from_secs(30));
    }
}
