// Bounded trend history for the sand level chart
use super::reading::Reading;
use chrono::Local;
use serde::Serialize;
use std::collections::VecDeque;

pub const HISTORY_CAPACITY: usize = 30;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryPoint {
    pub time: String,
    pub sand_level: f64,
}

impl HistoryPoint {
    pub fn from_reading(reading: &Reading) -> Self {
        Self {
            time: reading
                .timestamp
                .with_timezone(&Local)
                .format("%H:%M:%S")
                .to_string(),
            sand_level: round_to_hundredths(reading.sand_level),
        }
    }
}

fn round_to_hundredths(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Append-only FIFO of the most recent points, oldest first.
#[derive(Debug, Clone, Default)]
pub struct HistoryBuffer {
    points: VecDeque<HistoryPoint>,
}

impl HistoryBuffer {
    pub fn new() -> Self {
        Self {
            points: VecDeque::with_capacity(HISTORY_CAPACITY),
        }
    }

    /// Append a point, dropping the oldest one once the buffer is full.
    pub fn push(&mut self, point: HistoryPoint) {
        if self.points.len() == HISTORY_CAPACITY {
            self.points.pop_front();
        }
        self.points.push_back(point);
    }

    /// Oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &HistoryPoint> {
        self.points.iter()
    }
}
