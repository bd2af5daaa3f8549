use async_trait::async_trait;
use reqwest::Method;
use serde_json::Value;
use tracing::{debug, warn};

use super::error::SyncError;

/// Status code and decoded body of one remote call. The JSON half is absent
/// when the body is not valid JSON; the status is reported either way.
#[derive(Debug, Clone)]
pub struct TransportResponse {
    pub status: u16,
    pub json: Option<Value>,
}

/// Single point of contact with the network.
///
/// Implementations must not retry and must not treat a non-2xx status as a
/// failure — callers decide what a status means for their operation. The only
/// `Err` is a connection-level failure where no status exists.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn request(
        &self,
        method: Method,
        url: &str,
        body: Option<Value>,
    ) -> Result<TransportResponse, SyncError>;
}

/// reqwest-backed transport. Appends the configured API token as a query
/// parameter on every request when set.
pub struct HttpTransport {
    client: reqwest::Client,
    api_key: Option<String>,
}

impl HttpTransport {
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
        }
    }

    fn authenticated_url(&self, url: &str) -> String {
        match &self.api_key {
            Some(key) => {
                let sep = if url.contains('?') { '&' } else { '?' };
                format!("{url}{sep}apiKey={}", urlencoding::encode(key))
            }
            None => url.to_string(),
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn request(
        &self,
        method: Method,
        url: &str,
        body: Option<Value>,
    ) -> Result<TransportResponse, SyncError> {
        debug!(%method, url, "remote request");

        let mut request = self.client.request(method, self.authenticated_url(url));
        if let Some(body) = &body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status().as_u16();
        let json = match response.json::<Value>().await {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(url, status, "response body is not valid JSON");
                None
            }
        };

        Ok(TransportResponse { status, json })
    }
}
