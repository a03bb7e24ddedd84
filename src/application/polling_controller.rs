// Polling controller - drives the reading source and owns the dashboard state
use crate::application::reading_source::ReadingSource;
use crate::domain::dashboard::{Dashboard, DashboardSnapshot, PollState};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::time::{self, Interval, MissedTickBehavior};
use tokio_stream::wrappers::WatchStream;
use tokio_util::sync::CancellationToken;

/// Cheap, cloneable side of the controller given to consumers.
#[derive(Clone)]
pub struct ControllerHandle {
    snapshots: watch::Receiver<DashboardSnapshot>,
    refresh_tx: mpsc::Sender<()>,
    shutdown: CancellationToken,
}

impl ControllerHandle {
    pub fn snapshot(&self) -> DashboardSnapshot {
        self.snapshots.borrow().clone()
    }

    /// Every published snapshot, starting with the current one.
    pub fn updates(&self) -> WatchStream<DashboardSnapshot> {
        WatchStream::new(self.snapshots.clone())
    }

    /// Ask for a poll now. Returns `false` when a refresh is already pending,
    /// in which case the request is folded into that one.
    pub fn refresh(&self) -> bool {
        self.refresh_tx.try_send(()).is_ok()
    }

    /// Tear the controller down. Any fetch in flight is dropped.
    pub fn stop(&self) {
        self.shutdown.cancel();
    }
}

/// Single writer of the dashboard state. At most one fetch is outstanding:
/// ticks and refresh requests that arrive while polling are skipped.
pub struct PollingController {
    source: Arc<dyn ReadingSource>,
    interval: Duration,
    dashboard: Dashboard,
    updates: watch::Sender<DashboardSnapshot>,
    refresh_rx: mpsc::Receiver<()>,
    shutdown: CancellationToken,
}

impl PollingController {
    pub fn new(
        source: Arc<dyn ReadingSource>,
        interval: Duration,
        shutdown: CancellationToken,
    ) -> (Self, ControllerHandle) {
        let dashboard = Dashboard::new();
        let (updates, snapshots) = watch::channel(dashboard.snapshot());
        let (refresh_tx, refresh_rx) = mpsc::channel(1);

        let handle = ControllerHandle {
            snapshots,
            refresh_tx,
            shutdown: shutdown.clone(),
        };

        let controller = Self {
            source,
            interval,
            dashboard,
            updates,
            refresh_rx,
            shutdown,
        };

        (controller, handle)
    }

    /// Poll immediately, then on every tick until stopped.
    pub async fn run(mut self) {
        tracing::info!("Polling controller started ({}ms interval)", self.interval.as_millis());

        let mut ticker = time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                biased;
                _ = self.shutdown.cancelled() => break,
                _ = ticker.tick() => {}
                Some(()) = self.refresh_rx.recv() => {
                    tracing::debug!("Refresh requested");
                }
            }

            if !self.poll_once(&mut ticker).await {
                break;
            }
        }

        self.set_state(PollState::Stopped);
        tracing::info!("Polling controller stopped");
    }

    /// Returns `false` if the controller was torn down mid-fetch; the result
    /// of that fetch is never applied.
    async fn poll_once(&mut self, ticker: &mut Interval) -> bool {
        self.set_state(PollState::Polling);

        let source = self.source.clone();
        let fetch = async move { source.fetch_reading().await };
        tokio::pin!(fetch);

        let outcome = loop {
            tokio::select! {
                biased;
                _ = self.shutdown.cancelled() => {
                    tracing::debug!("Teardown while fetch in flight, discarding it");
                    return false;
                }
                result = &mut fetch => break result,
                _ = ticker.tick() => {
                    self.dashboard.record_skipped_tick();
                    tracing::debug!("Tick skipped, previous fetch still in flight");
                }
                Some(()) = self.refresh_rx.recv() => {
                    tracing::debug!("Refresh coalesced into in-flight fetch");
                }
            }
        };

        match outcome {
            Ok(reading) => {
                tracing::debug!("Sand level {:.2}", reading.sand_level);
                self.dashboard.record_success(reading);
            }
            Err(e) => {
                tracing::warn!("Poll failed: {}", e);
                self.dashboard
                    .record_failure(format!("Failed to fetch sensor data: {}", e));
            }
        }

        self.set_state(PollState::Settled);
        true
    }

    fn set_state(&mut self, next: PollState) {
        self.dashboard.transition(next);
        self.updates.send_replace(self.dashboard.snapshot());
    }
}
