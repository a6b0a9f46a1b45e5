//! Delivery transport for queue items.

use std::time::Duration;

use tracing::debug;
use url::Url;

use super::types::{HttpMethod, QueueItem, SyncError};

/// Seam between the queue and the network. The queue only cares whether a
/// delivery attempt succeeded; every error counts against the item's
/// attempt limit.
pub trait Transport {
    fn deliver(&self, item: &QueueItem) -> impl std::future::Future<Output = Result<(), SyncError>> + Send;
}

/// JSON-over-HTTP delivery against a remote API.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpTransport {
    /// Build a transport for `base_url`. A path component of the base URL
    /// is kept as a prefix for item endpoints. Each delivery attempt is
    /// bounded by `timeout`; a timed-out attempt fails like any other.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, SyncError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(SyncError::Network)?;
        let mut base_url = Url::parse(base_url)?;
        if !base_url.path().ends_with('/') {
            base_url.set_path(&format!("{}/", base_url.path()));
        }
        Ok(Self { client, base_url })
    }

    fn endpoint_url(&self, endpoint: &str) -> Result<Url, SyncError> {
        // Endpoints are stored as absolute paths; join them relative to
        // the base so its path prefix is preserved.
        Ok(self.base_url.join(endpoint.trim_start_matches('/'))?)
    }
}

impl Transport for HttpTransport {
    async fn deliver(&self, item: &QueueItem) -> Result<(), SyncError> {
        let url = self.endpoint_url(&item.endpoint)?;
        debug!(item_id = %item.id, method = item.method.as_str(), %url, "delivering queue item");

        let request = match item.method {
            HttpMethod::Post => self.client.post(url.clone()),
            HttpMethod::Put => self.client.put(url.clone()),
            HttpMethod::Patch => self.client.patch(url.clone()),
            HttpMethod::Delete => self.client.delete(url.clone()),
        };

        let response = request.json(&item.payload).send().await?;
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(SyncError::Http {
                status: status.as_u16(),
                endpoint: item.endpoint.clone(),
            })
        }
    }
}
