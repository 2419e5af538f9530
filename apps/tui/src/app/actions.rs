use ipgeo_view::api::{
    decode_clear_cache, decode_lookup, endpoint, LookupRequest, CLEAR_CACHE_PATH, LOOKUP_PATH,
};
use ipgeo_view::{IpRecord, QueriedAddress, ViewError};
use std::time::Duration;

/// HTTP client for the lookup server. Cheap to clone into spawned tasks.
#[derive(Debug, Clone)]
pub struct AppActions {
    client: reqwest::Client,
    api_base: String,
}

impl AppActions {
    pub fn new(api_base: impl Into<String>, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|e| {
                log::warn!("Falling back to default HTTP client: {e}");
                reqwest::Client::new()
            });

        Self {
            client,
            api_base: api_base.into(),
        }
    }

    /// Error bodies (`{"error": ...}`) come back as `Ok` records whatever
    /// the status code; the dashboard rejects them.
    pub async fn lookup(&self, address: &QueriedAddress) -> Result<IpRecord, ViewError> {
        let url = endpoint(&self.api_base, LOOKUP_PATH);
        log::debug!("Looking up {address} via {url}");

        let body = self
            .client
            .post(&url)
            .json(&LookupRequest::new(address))
            .send()
            .await
            .map_err(network_failure)?
            .text()
            .await
            .map_err(network_failure)?;

        decode_lookup(&body)
    }

    pub async fn clear_cache(&self) -> Result<(), ViewError> {
        let url = endpoint(&self.api_base, CLEAR_CACHE_PATH);
        log::debug!("Clearing server cache via {url}");

        let body = self
            .client
            .post(&url)
            .send()
            .await
            .map_err(network_failure)?
            .text()
            .await
            .map_err(network_failure)?;

        decode_clear_cache(&body)
    }
}

fn network_failure(error: reqwest::Error) -> ViewError {
    ViewError::NetworkFailure(error.to_string())
}
