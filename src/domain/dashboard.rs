// Dashboard domain model - live state owned by the polling controller
use super::history::{HistoryBuffer, HistoryPoint};
use super::reading::Reading;
use super::status::{classify, ConnectionState, Status};
use serde::Serialize;

/// Lifecycle of the polling loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PollState {
    #[default]
    Idle,
    Polling,
    Settled,
    Stopped,
}

/// Read-only view handed to consumers.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSnapshot {
    pub reading: Option<Reading>,
    pub history: Vec<HistoryPoint>,
    pub status: Status,
    pub connection_state: ConnectionState,
    pub last_error: Option<String>,
    pub poll_state: PollState,
    pub skipped_ticks: u64,
}

#[derive(Debug, Clone, Default)]
pub struct Dashboard {
    reading: Option<Reading>,
    history: HistoryBuffer,
    status: Status,
    connection_state: ConnectionState,
    last_error: Option<String>,
    poll_state: PollState,
    skipped_ticks: u64,
}

impl Dashboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move to `next`. Nothing leaves `Stopped`; returns whether the state changed.
    pub fn transition(&mut self, next: PollState) -> bool {
        if self.poll_state == PollState::Stopped || self.poll_state == next {
            return false;
        }
        self.poll_state = next;
        true
    }

    pub fn record_success(&mut self, reading: Reading) {
        self.history.push(HistoryPoint::from_reading(&reading));
        self.status = classify(reading.sand_level);
        self.reading = Some(reading);
        self.connection_state = ConnectionState::Connected;
        self.last_error = None;
    }

    /// Reading, history and status are kept so the last good data stays visible.
    pub fn record_failure(&mut self, message: String) {
        self.connection_state = ConnectionState::Disconnected;
        self.last_error = Some(message);
    }

    pub fn record_skipped_tick(&mut self) {
        self.skipped_ticks += 1;
    }

    pub fn snapshot(&self) -> DashboardSnapshot {
        DashboardSnapshot {
            reading: self.reading.clone(),
            history: self.history.iter().cloned().collect(),
            status: self.status,
            connection_state: self.connection_state,
            last_error: self.last_error.clone(),
            poll_state: self.poll_state,
            skipped_ticks: self.skipped_ticks,
        }
    }
}
