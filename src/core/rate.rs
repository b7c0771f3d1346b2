//! Per-second throughput from cumulative byte counters.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Cumulative byte counters read at one point in time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CounterPair {
    pub sent: u64,
    pub received: u64,
}

impl CounterPair {
    pub fn new(sent: u64, received: u64) -> Self {
        Self { sent, received }
    }
}

/// Signed bytes-per-second in each direction.
///
/// Values are negative when a counter went backwards (interface reset or
/// wrap). Use [`ByteRates::clamped`] before display.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ByteRates {
    pub upload: f64,
    pub download: f64,
}

impl ByteRates {
    pub fn clamped(self) -> Self {
        Self {
            upload: clamp_rate(self.upload),
            download: clamp_rate(self.download),
        }
    }
}

/// Negative and NaN rates become zero.
pub fn clamp_rate(rate: f64) -> f64 {
    if rate.is_nan() || rate < 0.0 {
        0.0
    } else {
        rate
    }
}

/// How the time between two samples is determined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RateClock {
    /// Divide by wall-clock time measured between samples.
    #[default]
    Measured,
    /// Divide by the sampler's configured period. Drifts when `collect()` is slow.
    Nominal,
}

/// Derives rates from two consecutive [`CounterPair`] readings.
#[derive(Debug, Clone, Default)]
pub struct RateCalculator {
    previous: Option<CounterPair>,
}

impl RateCalculator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a baseline reading without producing a rate.
    pub fn seed(&mut self, counters: CounterPair) {
        self.previous = Some(counters);
    }

    pub fn is_seeded(&self) -> bool {
        self.previous.is_some()
    }

    /// Compute `(current - previous) / elapsed` and make `current` the new baseline.
    ///
    /// Returns `None` when there is no baseline yet or `elapsed` is zero; the
    /// reading still becomes the baseline.
    pub fn update(&mut self, counters: CounterPair, elapsed: Duration) -> Option<ByteRates> {
        let previous = self.previous.replace(counters)?;
        let secs = elapsed.as_secs_f64();
        if secs <= 0.0 {
            return None;
        }

        Some(ByteRates {
            upload: delta(previous.sent, counters.sent) / secs,
            download: delta(previous.received, counters.received) / secs,
        })
    }
}

fn delta(previous: u64, current: u64) -> f64 {
    current as f64 - previous as f64
}
