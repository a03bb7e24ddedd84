// Sensor reading domain model and its JSON wire format
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

pub const DEFAULT_SAMPLING_RATE: f64 = 1.0;
pub const DEFAULT_SAMPLE_INTERVAL_MS: u64 = 1000;

/// One sensor sample. `sand_level` is always present; the metadata fields are
/// optional on the wire and only defaulted when a reading is ingested.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Reading {
    pub sand_level: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sampling_rate: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sample_interval: Option<u64>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
}

impl Reading {
    pub fn new(sand_level: f64, timestamp: DateTime<Utc>) -> Self {
        Self {
            sand_level,
            sampling_rate: None,
            sample_interval: None,
            timestamp,
        }
    }

    /// The zero reading served before anything has been stored.
    pub fn fallback(now: DateTime<Utc>) -> Self {
        Self::new(0.0, now).with_defaults()
    }

    /// Build a reading from a decoded payload. A missing or unparseable
    /// timestamp becomes `received_at`.
    pub fn from_wire(wire: WireReading, received_at: DateTime<Utc>) -> Self {
        let timestamp = wire
            .timestamp
            .and_then(|t| t.to_datetime())
            .unwrap_or(received_at);

        Self {
            sand_level: wire.sand_level,
            sampling_rate: wire.sampling_rate,
            sample_interval: wire.sample_interval,
            timestamp,
        }
    }

    pub fn with_defaults(mut self) -> Self {
        self.sampling_rate.get_or_insert(DEFAULT_SAMPLING_RATE);
        self.sample_interval.get_or_insert(DEFAULT_SAMPLE_INTERVAL_MS);
        self
    }
}

/// Payload shape shared by the upstream sensor response and the ingest body.
///
/// `sandLevel` is a plain `f64`, so strings, `null` and a missing key all fail
/// to decode instead of being coerced.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireReading {
    pub sand_level: f64,
    #[serde(default)]
    pub sampling_rate: Option<f64>,
    #[serde(default)]
    pub sample_interval: Option<u64>,
    #[serde(default)]
    pub timestamp: Option<WireTimestamp>,
}

/// Timestamps arrive either as epoch milliseconds or as RFC 3339 text.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum WireTimestamp {
    Millis(i64),
    FractionalMillis(f64),
    Text(String),
}

impl WireTimestamp {
    pub fn to_datetime(&self) -> Option<DateTime<Utc>> {
        match self {
            WireTimestamp::Millis(ms) => Utc.timestamp_millis_opt(*ms).single(),
            WireTimestamp::FractionalMillis(ms) if ms.is_finite() => {
                Utc.timestamp_millis_opt(ms.trunc() as i64).single()
            }
            WireTimestamp::FractionalMillis(_) => None,
            WireTimestamp::Text(text) => DateTime::parse_from_rfc3339(text)
                .ok()
                .map(|t| t.with_timezone(&Utc)),
        }
    }
}
