//! Per-account provider client registry

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use confab_core::ports::ExternalCallAudit;
use confab_core::provider_ports::{MeetingProvider, ProviderRegistry};
use confab_domain::{ConfabError, ProviderConfig, ResourceAccount, Result};
use tokio::sync::Mutex;
use tracing::debug;

use super::client::MeetingsApiClient;

/// Registry that builds and caches one [`MeetingsApiClient`] per resource
/// account.
///
/// Clients are cached by account id for the lifetime of the process.
// TODO: drop a cached client when the account's credentials change.
pub struct HttpProviderRegistry {
    http: reqwest::Client,
    base_url: String,
    audit: Arc<dyn ExternalCallAudit>,
    clients: Mutex<HashMap<String, Arc<MeetingsApiClient>>>,
}

impl HttpProviderRegistry {
    pub fn new(config: &ProviderConfig, audit: Arc<dyn ExternalCallAudit>) -> Result<Self> {
        let base_url = config.base_url.trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(ConfabError::Config("provider base_url must not be empty".into()));
        }

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs.max(1)))
            .build()
            .map_err(|e| ConfabError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { http, base_url, audit, clients: Mutex::new(HashMap::new()) })
    }
}

#[async_trait]
impl ProviderRegistry for HttpProviderRegistry {
    async fn client_for(&self, account: &ResourceAccount) -> Result<Arc<dyn MeetingProvider>> {
        if account.client_id.trim().is_empty() || account.client_secret.trim().is_empty() {
            return Err(ConfabError::Config(format!(
                "resource account '{}' has no provider credentials",
                account.label,
            )));
        }

        let mut clients = self.clients.lock().await;
        if let Some(client) = clients.get(&account.id) {
            return Ok(client.clone());
        }

        debug!(account = %account.id, "creating provider client");
        let client = Arc::new(MeetingsApiClient::new(
            self.http.clone(),
            self.base_url.clone(),
            account.clone(),
            self.audit.clone(),
        ));
        clients.insert(account.id.clone(), client.clone());
        Ok(client)
    }
}
