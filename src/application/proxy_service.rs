// Proxy service - Use cases behind the /api endpoint
use crate::application::latest_reading::LatestReadingStore;
use crate::application::reading_source::{FetchError, ReadingSource};
use crate::domain::reading::{Reading, WireReading};
use chrono::Utc;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("Invalid data format: {0}")]
    Validation(String),
}

#[derive(Clone)]
pub struct ProxyService {
    store: Arc<LatestReadingStore>,
    upstream: Option<Arc<dyn ReadingSource>>,
}

impl ProxyService {
    /// Serve whatever was last pushed to the ingest path.
    pub fn new(store: Arc<LatestReadingStore>) -> Self {
        Self {
            store,
            upstream: None,
        }
    }

    /// Fetch from the sensor on every read instead of only serving pushed data.
    pub fn with_upstream(mut self, upstream: Arc<dyn ReadingSource>) -> Self {
        self.upstream = Some(upstream);
        self
    }

    /// Current reading for GET. Upstream timeouts degrade to the last known
    /// reading; every other upstream failure is returned to the caller.
    pub async fn current_reading(&self) -> Result<Reading, FetchError> {
        let Some(upstream) = &self.upstream else {
            return Ok(self.store.latest_or_fallback(Utc::now()));
        };

        match upstream.fetch_reading().await {
            Ok(reading) => {
                let reading = reading.with_defaults();
                self.store.replace(reading.clone());
                Ok(reading)
            }
            Err(e) if e.is_timeout() => {
                tracing::warn!("Upstream sensor timed out, serving last known reading: {}", e);
                Ok(self.store.latest_or_fallback(Utc::now()))
            }
            Err(e) => Err(e),
        }
    }

    /// Validate and store a pushed reading. The stored copy is stamped with the
    /// receipt time and has its optional fields defaulted.
    pub fn ingest(&self, body: &[u8]) -> Result<Reading, IngestError> {
        let value: serde_json::Value = serde_json::from_slice(body)
            .map_err(|e| IngestError::Validation(format!("body is not JSON: {}", e)))?;

        if !value.get("sandLevel").is_some_and(serde_json::Value::is_number) {
            return Err(IngestError::Validation(
                "sandLevel must be a number.".to_string(),
            ));
        }

        let wire: WireReading = serde_json::from_value(value)
            .map_err(|e| IngestError::Validation(e.to_string()))?;

        let reading = Reading {
            sand_level: wire.sand_level,
            sampling_rate: wire.sampling_rate,
            sample_interval: wire.sample_interval,
            timestamp: Utc::now(),
        }
        .with_defaults();

        self.store.replace(reading.clone());
        Ok(reading)
    }
}
