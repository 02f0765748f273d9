//! Server-to-server token acquisition for provider accounts

use std::time::{Duration, Instant};

use confab_domain::{ConfabError, ResourceAccount, Result};
use tracing::debug;

use super::types::TokenResponse;
use crate::errors::InfraError;

/// Safety margin subtracted from the provider-reported token lifetime.
const EXPIRY_MARGIN_SECS: i64 = 60;

/// A cached access token with its local expiry.
#[derive(Debug, Clone)]
pub(super) struct TokenState {
    pub access_token: String,
    expires_at: Instant,
}

impl TokenState {
    pub fn is_valid(&self) -> bool {
        Instant::now() < self.expires_at
    }
}

/// Fetch an access token for one account via the account-credentials grant.
pub(super) async fn fetch_access_token(
    http: &reqwest::Client,
    base_url: &str,
    account: &ResourceAccount,
) -> Result<TokenState> {
    let endpoint = format!("{base_url}/oauth/token");

    let response = http
        .post(&endpoint)
        .basic_auth(&account.client_id, Some(&account.client_secret))
        .form(&[
            ("grant_type", "account_credentials"),
            ("account_id", account.external_account_ref.as_str()),
        ])
        .send()
        .await
        .map_err(InfraError::from)?;

    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        return Err(ConfabError::ExternalProvider(format!(
            "token request for account '{}' failed ({status}): {body}",
            account.label,
        )));
    }

    let token: TokenResponse = response.json().await.map_err(|e| {
        ConfabError::ExternalProvider(format!("unexpected token response: {e}"))
    })?;

    let lifetime = (token.expires_in - EXPIRY_MARGIN_SECS).max(30) as u64;
    debug!(account = %account.id, lifetime_secs = lifetime, "obtained provider access token");

    Ok(TokenState {
        access_token: token.access_token,
        expires_at: Instant::now() + Duration::from_secs(lifetime),
    })
}
