//! Shared JSON-over-HTTPS plumbing for OpenAI-compatible providers.

use std::time::Duration;

use docrag_core::error::{Error, ProviderError};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

pub(crate) struct ProviderClient {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl ProviderClient {
    pub(crate) fn new(base_url: &str, api_key: Option<String>, timeout: Duration) -> Result<Self, Error> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Configuration(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
        })
    }

    /// POST `body` to `path` and decode a 2xx JSON reply.
    ///
    /// Transport faults and timeouts map to `Unavailable`; any non-2xx
    /// status maps to `Rejected` carrying the raw error body.
    pub(crate) async fn post_json<B, R>(&self, path: &str, body: &B) -> Result<R, ProviderError>
    where
        B: Serialize + ?Sized + Sync,
        R: DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, path);
        let mut req = self.client.post(&url).json(body);
        if let Some(key) = &self.api_key {
            req = req.bearer_auth(key);
        }

        let resp = req
            .send()
            .await
            .map_err(|e| ProviderError::Unavailable(format!("{url}: {e}")))?;
        let status = resp.status();
        debug!(%url, status = status.as_u16(), "provider responded");

        if !status.is_success() {
            let body = match resp.text().await {
                Ok(body) => body,
                Err(e) => format!("<unreadable error body: {e}>"),
            };
            return Err(ProviderError::Rejected { status: status.as_u16(), body });
        }
        resp.json::<R>()
            .await
            .map_err(|e| ProviderError::Unavailable(format!("{url}: failed to decode response: {e}")))
    }
}
