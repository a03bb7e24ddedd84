// Logs status and connection changes from the dashboard snapshot stream
use crate::domain::dashboard::DashboardSnapshot;
use crate::domain::status::{ConnectionState, Status};
use tokio_stream::{Stream, StreamExt};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Change {
    Status(Status),
    Connection(ConnectionState),
}

/// Changes between two consecutive snapshots, status first.
pub fn changes(previous: &DashboardSnapshot, current: &DashboardSnapshot) -> Vec<Change> {
    let mut out = Vec::new();
    if current.status != previous.status {
        out.push(Change::Status(current.status));
    }
    if current.connection_state != previous.connection_state {
        out.push(Change::Connection(current.connection_state));
    }
    out
}

/// Runs until the stream ends, i.e. until the controller is gone.
pub async fn log_changes<S>(updates: S)
where
    S: Stream<Item = DashboardSnapshot> + Unpin,
{
    let mut updates = updates;
    let Some(mut previous) = updates.next().await else {
        return;
    };

    while let Some(current) = updates.next().await {
        for change in changes(&previous, &current) {
            match change {
                Change::Status(Status::Normal) => tracing::info!("System operating normally"),
                Change::Status(status) => {
                    let level = current.reading.as_ref().map(|r| r.sand_level).unwrap_or_default();
                    tracing::warn!("Sand level {:.2}: {:?} - check pipeline", level, status);
                }
                Change::Connection(ConnectionState::Connected) => tracing::info!("Sensor connected"),
                Change::Connection(ConnectionState::Disconnected) => tracing::warn!(
                    "Sensor disconnected: {}",
                    current.last_error.as_deref().unwrap_or("unknown error")
                ),
            }
        }
        previous = current;
    }
}
