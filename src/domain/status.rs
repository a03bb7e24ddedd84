// Status classification for the latest sand level
use serde::Serialize;

pub const WARNING_THRESHOLD: f64 = 500.0;
pub const CRITICAL_THRESHOLD: f64 = 1000.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    #[default]
    Normal,
    Warning,
    Critical,
}

/// Map a sand level onto a status. There is no lower bound: zero and negative
/// levels are `Normal`.
pub fn classify(sand_level: f64) -> Status {
    if sand_level > CRITICAL_THRESHOLD {
        Status::Critical
    } else if sand_level > WARNING_THRESHOLD {
        Status::Warning
    } else {
        Status::Normal
    }
}

/// Health of the most recent poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionState {
    #[default]
    Connected,
    Disconnected,
}
