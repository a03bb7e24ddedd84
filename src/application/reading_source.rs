// Source trait for sensor readings
use crate::domain::reading::Reading;
use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Why a single fetch produced no reading.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FetchError {
    #[error("sensor did not respond within {}ms", .0.as_millis())]
    Timeout(Duration),
    #[error("network error: {0}")]
    Network(String),
    #[error("sensor responded with HTTP {0}")]
    HttpStatus(u16),
    #[error("invalid payload: {0}")]
    InvalidPayload(String),
}

impl FetchError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, FetchError::Timeout(_))
    }
}

#[async_trait]
pub trait ReadingSource: Send + Sync {
    /// Fetch one reading. Implementations bound the call in time and never
    /// retry; dropping the returned future cancels the request.
    async fn fetch_reading(&self) -> Result<Reading, FetchError>;
}
