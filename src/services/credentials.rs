//! Per-account OAuth1 credentials resolved from the process environment

use std::collections::HashMap;

use super::error::RelayError;

/// Signing secrets for one social account
#[derive(Clone, PartialEq, Eq)]
pub struct AccountCredential {
    pub account_id: String,
    pub consumer_key: String,
    pub consumer_secret: String,
    pub access_token: String,
    pub access_token_secret: String,
}

// Secrets stay out of logs.
impl std::fmt::Debug for AccountCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccountCredential")
            .field("account_id", &self.account_id)
            .finish_non_exhaustive()
    }
}

/// Immutable snapshot of the configuration the credentials are read from.
#[derive(Debug, Clone, Default)]
pub struct CredentialStore {
    vars: HashMap<String, String>,
}

impl CredentialStore {
    pub fn from_env() -> Self {
        Self::from_vars(std::env::vars())
    }

    pub fn from_vars<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            vars: vars
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .filter(|(_, v)| !v.trim().is_empty())
                .collect(),
        }
    }

    fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    /// Resolve `{account_id}_ACCESS_TOKEN` and `{account_id}_ACCESS_TOKEN_SECRET`
    /// together with the shared consumer keys.
    pub fn lookup(&self, account_id: &str) -> Result<AccountCredential, RelayError> {
        let access_token = self.get(&format!("{account_id}_ACCESS_TOKEN"));
        let access_token_secret = self.get(&format!("{account_id}_ACCESS_TOKEN_SECRET"));

        let (Some(access_token), Some(access_token_secret)) = (access_token, access_token_secret)
        else {
            return Err(RelayError::CredentialNotFound(account_id.to_string()));
        };

        let consumer_key = self
            .get("TWITTER_CONSUMER_KEY")
            .ok_or(RelayError::NotConfigured("TWITTER_CONSUMER_KEY"))?;
        let consumer_secret = self
            .get("TWITTER_CONSUMER_SECRET")
            .ok_or(RelayError::NotConfigured("TWITTER_CONSUMER_SECRET"))?;

        Ok(AccountCredential {
            account_id: account_id.to_string(),
            consumer_key: consumer_key.to_string(),
            consumer_secret: consumer_secret.to_string(),
            access_token: access_token.to_string(),
            access_token_secret: access_token_secret.to_string(),
        })
    }
}
