//! On-demand credential checks against the identity endpoint
//! (/accounts/{account_id}/verify, /health/accounts)

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::get,
};
use serde::Serialize;
use std::sync::Arc;

use crate::AppState;
use crate::services::error::RelayError;

#[derive(Debug, Serialize)]
pub struct VerifiedAccount {
    pub account_id: String,
    pub user_id: String,
    pub username: String,
}

#[derive(Debug, Serialize)]
pub struct AccountStatus {
    pub account_id: String,
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AccountsReport {
    pub accounts: Vec<AccountStatus>,
}

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/accounts/{account_id}/verify", get(verify_account))
        .route("/health/accounts", get(accounts_health))
}

async fn verify(state: &AppState, account_id: &str) -> Result<VerifiedAccount, RelayError> {
    let user = state.twitter.session(account_id)?.verify().await?;
    Ok(VerifiedAccount {
        account_id: account_id.to_string(),
        user_id: user.id,
        username: user.username,
    })
}

/// GET /accounts/{account_id}/verify
async fn verify_account(
    State(state): State<Arc<AppState>>,
    Path(account_id): Path<String>,
) -> Result<Json<VerifiedAccount>, RelayError> {
    let verified = verify(&state, &account_id).await?;
    tracing::info!(account_id = %account_id, username = %verified.username, "account verified");
    Ok(Json(verified))
}

/// GET /health/accounts - Check every configured account; always 200
async fn accounts_health(State(state): State<Arc<AppState>>) -> Json<AccountsReport> {
    let mut accounts = Vec::with_capacity(state.known_accounts.len());

    for account_id in &state.known_accounts {
        let status = match verify(&state, account_id).await {
            Ok(verified) => AccountStatus {
                account_id: account_id.clone(),
                ok: true,
                username: Some(verified.username),
                error: None,
            },
            Err(e) => {
                tracing::warn!(account_id = %account_id, error = %e, "account check failed");
                AccountStatus {
                    account_id: account_id.clone(),
                    ok: false,
                    username: None,
                    error: Some(e.to_string()),
                }
            }
        };
        accounts.push(status);
    }

    Json(AccountsReport { accounts })
}
