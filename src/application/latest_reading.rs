// Shared "last reading" record behind the proxy endpoint
use crate::domain::reading::Reading;
use chrono::{DateTime, Utc};
use std::sync::{PoisonError, RwLock};

/// Single lock around the last stored reading. Readers always see a whole
/// record; concurrent writers are last-write-wins.
#[derive(Debug, Default)]
pub struct LatestReadingStore {
    latest: RwLock<Option<Reading>>,
}

impl LatestReadingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn latest(&self) -> Option<Reading> {
        self.latest
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn latest_or_fallback(&self, now: DateTime<Utc>) -> Reading {
        self.latest().unwrap_or_else(|| Reading::fallback(now))
    }

    pub fn replace(&self, reading: Reading) {
        *self.latest.write().unwrap_or_else(PoisonError::into_inner) = Some(reading);
    }
}
