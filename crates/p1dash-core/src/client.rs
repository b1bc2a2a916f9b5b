//! HTTP client for the meter's local data API.
//!
//! The meter exposes its current state as JSON on `GET /api/v1/data`. Only the
//! power and the two energy counters are needed for a [`Reading`].
//!
//! # Example
//!
//! ```no_run
//! use p1dash_core::{MeterClient, MeterSource};
//! use std::time::Duration;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = MeterClient::new("http://192.168.178.128/api/v1/data", Duration::from_secs(10))?;
//! let reading = client.fetch_reading(time::OffsetDateTime::now_utc()).await?;
//! println!("{} kWh imported", reading.import_kwh);
//! # Ok(())
//! # }
//! ```

use std::time::Duration;

use async_trait::async_trait;
use p1dash_types::MeterData;
use reqwest::Client;

use crate::traits::MeterSource;

/// Default meter endpoint on the home network.
pub const DEFAULT_METER_URL: &str = "http://192.168.178.128/api/v1/data";

/// Error type for meter client operations.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The meter is not reachable.
    #[error("Meter not reachable at {url}: {source}")]
    NotReachable {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// HTTP request or body decoding failed.
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Invalid URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// The meter answered with a non-success status.
    #[error("Meter returned HTTP {status}")]
    Status { status: u16 },

    /// The response lacked a required counter.
    #[error(transparent)]
    Parse(#[from] p1dash_types::ParseError),
}

/// Result type for meter client operations.
pub type ClientResult<T> = std::result::Result<T, ClientError>;

/// HTTP client for one meter.
#[derive(Debug, Clone)]
pub struct MeterClient {
    client: Client,
    url: String,
}

impl MeterClient {
    /// Create a client for the data endpoint at `url`.
    pub fn new(url: &str, timeout: Duration) -> ClientResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(ClientError::Request)?;
        Self::with_client(url, client)
    }

    /// Create a client with a custom reqwest Client.
    pub fn with_client(url: &str, client: Client) -> ClientResult<Self> {
        let url = url.trim_end_matches('/').to_string();

        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(ClientError::InvalidUrl(format!(
                "URL must start with http:// or https://, got: {}",
                url
            )));
        }

        Ok(Self { client, url })
    }

    /// The endpoint this client polls.
    pub fn url(&self) -> &str {
        &self.url
    }

    async fn handle_response(&self, response: reqwest::Response) -> ClientResult<MeterData> {
        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Status {
                status: status.as_u16(),
            });
        }
        response.json().await.map_err(ClientError::Request)
    }
}

#[async_trait]
impl MeterSource for MeterClient {
    fn name(&self) -> &str {
        &self.url
    }

    async fn fetch(&self) -> ClientResult<MeterData> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| ClientError::NotReachable {
                url: self.url.clone(),
                source: e,
            })?;

        self.handle_response(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = MeterClient::new(DEFAULT_METER_URL, Duration::from_secs(10)).unwrap();
        assert_eq!(client.url(), "http://192.168.178.128/api/v1/data");
        assert_eq!(client.name(), client.url());
    }

    #[test]
    fn test_client_normalizes_url() {
        let client = MeterClient::new("http://meter.local/api/v1/data/", Duration::from_secs(1)).unwrap();
        assert_eq!(client.url(), "http://meter.local/api/v1/data");
    }

    #[test]
    fn test_client_invalid_url() {
        let result = MeterClient::new("192.168.178.128/api/v1/data", Duration::from_secs(1));
        assert!(matches!(result, Err(ClientError::InvalidUrl(_))));
    }

    #[tokio::test]
    async fn test_unreachable_meter() {
        let client = MeterClient::new("http://127.0.0.1:1/api/v1/data", Duration::from_secs(2)).unwrap();
        let err = client.fetch().await.unwrap_err();
        assert!(matches!(err, ClientError::NotReachable { .. }));
        assert!(err.to_string().starts_with("Meter not reachable at http://127.0.0.1:1"));
    }
}
