// HTTP client for the acoustic sand sensor
use crate::application::reading_source::{FetchError, ReadingSource};
use crate::domain::reading::{Reading, WireReading};
use async_trait::async_trait;
use chrono::Utc;
use reqwest::Url;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum SensorClientError {
    #[error("invalid sensor URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("fetch timeout must be greater than zero")]
    ZeroTimeout,
}

#[derive(Debug, Clone)]
pub struct SensorClient {
    http: reqwest::Client,
    url: Url,
    timeout: Duration,
}

impl SensorClient {
    pub fn new(url: &str, timeout: Duration) -> Result<Self, SensorClientError> {
        Self::with_client(reqwest::Client::new(), url, timeout)
    }

    pub fn with_client(
        http: reqwest::Client,
        url: &str,
        timeout: Duration,
    ) -> Result<Self, SensorClientError> {
        let url = parse_http_url(url)?;
        if timeout.is_zero() {
            return Err(SensorClientError::ZeroTimeout);
        }

        Ok(Self { http, url, timeout })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// GET the sensor once. The whole exchange, body included, must finish
    /// within the timeout; otherwise the request is dropped and the call fails
    /// with `FetchError::Timeout`.
    pub async fn fetch(&self) -> Result<Reading, FetchError> {
        match tokio::time::timeout(self.timeout, self.exchange()).await {
            Ok(result) => result,
            Err(_) => Err(FetchError::Timeout(self.timeout)),
        }
    }

    async fn exchange(&self) -> Result<Reading, FetchError> {
        let response = self
            .http
            .get(self.url.clone())
            .header("Accept", "application/json")
            .header("Cache-Control", "no-store")
            .send()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(FetchError::HttpStatus(response.status().as_u16()));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;
        let received_at = Utc::now();

        let wire: WireReading = serde_json::from_slice(&body)
            .map_err(|e| FetchError::InvalidPayload(e.to_string()))?;

        Ok(Reading::from_wire(wire, received_at))
    }
}

#[async_trait]
impl ReadingSource for SensorClient {
    async fn fetch_reading(&self) -> Result<Reading, FetchError> {
        self.fetch().await
    }
}

fn parse_http_url(raw: &str) -> Result<Url, SensorClientError> {
    let invalid = |reason: String| SensorClientError::InvalidUrl {
        url: raw.to_string(),
        reason,
    };

    let url = Url::parse(raw).map_err(|e| invalid(e.to_string()))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(invalid(format!("unsupported scheme '{}'", other))),
    }
}
