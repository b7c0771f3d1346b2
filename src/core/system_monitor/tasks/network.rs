//! Network throughput collector.

use std::time::{Duration, Instant};
use sysinfo::Networks;

use super::now_millis;
use crate::core::rate::{ByteRates, CounterPair, RateCalculator, RateClock};
use crate::core::sampler::Collector;
use crate::core::system_monitor::ThroughputSnapshot;
use crate::error::Result;

/// Time to divide a counter delta by.
///
/// `Measured` uses the wall-clock gap since the previous sample and falls
/// back to `period` when there is none (or it is zero).
pub fn elapsed_between(
    clock: RateClock,
    period: Duration,
    previous: Option<Instant>,
    now: Instant,
) -> Duration {
    match (clock, previous) {
        (RateClock::Measured, Some(prev)) => {
            let elapsed = now.saturating_duration_since(prev);
            if elapsed.is_zero() {
                period
            } else {
                elapsed
            }
        }
        _ => period,
    }
}

/// Upper bound on the pause between seeding the counters and the first sample.
const MAX_RATE_WARMUP: Duration = Duration::from_secs(1);

/// Summed byte counters across all interfaces, plus the rate state.
pub(crate) struct ThroughputMeter {
    networks: Networks,
    rates: RateCalculator,
    clock: RateClock,
    period: Duration,
    last_sample: Option<Instant>,
    // The gap after prime() is the warm-up, not a period
    first_after_prime: bool,
}

impl ThroughputMeter {
    pub(crate) fn new(clock: RateClock, period: Duration) -> Self {
        Self {
            networks: Networks::new_with_refreshed_list(),
            rates: RateCalculator::new(),
            clock,
            period,
            last_sample: None,
            first_after_prime: false,
        }
    }

    /// Seed the baseline so the first published rate is a real delta.
    ///
    /// The first sample after this is divided by the measured gap whatever
    /// the clock, since that gap is the warm-up rather than a full period.
    pub(crate) fn prime(&mut self) {
        self.networks.refresh(true);
        self.rates.seed(self.counters());
        self.last_sample = Some(Instant::now());
        self.first_after_prime = true;
    }

    /// How long to let traffic accumulate after `prime` before sampling.
    pub(crate) fn warmup(&self) -> Duration {
        self.period.min(MAX_RATE_WARMUP)
    }

    /// Rates since the previous call, clamped to zero.
    pub(crate) fn sample(&mut self) -> ByteRates {
        self.networks.refresh(true);
        let counters = self.counters();

        let now = Instant::now();
        let clock = if std::mem::take(&mut self.first_after_prime) {
            RateClock::Measured
        } else {
            self.clock
        };
        let elapsed = elapsed_between(clock, self.period, self.last_sample, now);
        self.last_sample = Some(now);

        self.rates
            .update(counters, elapsed)
            .unwrap_or_default()
            .clamped()
    }

    fn counters(&self) -> CounterPair {
        self.networks
            .values()
            .fold(CounterPair::default(), |acc, data| CounterPair {
                sent: acc.sent.saturating_add(data.total_transmitted()),
                received: acc.received.saturating_add(data.total_received()),
            })
    }
}

/// Collector that reports upload and download speed only.
///
/// Polling frequency: 1 second (the graph resolution)
pub struct NetworkSpeedCollector {
    meter: ThroughputMeter,
}

impl NetworkSpeedCollector {
    pub fn new(clock: RateClock, period: Duration) -> Self {
        Self {
            meter: ThroughputMeter::new(clock, period),
        }
    }
}

impl Collector for NetworkSpeedCollector {
    type Snapshot = ThroughputSnapshot;

    fn name(&self) -> &str {
        "network"
    }

    fn prime(&mut self) -> Result<()> {
        self.meter.prime();
        Ok(())
    }

    fn warmup(&self) -> Duration {
        self.meter.warmup()
    }

    fn collect(&mut self) -> Result<ThroughputSnapshot> {
        let rates = self.meter.sample();
        Ok(ThroughputSnapshot {
            timestamp: now_millis(),
            download_bps: rates.download,
            upload_bps: rates.upload,
        })
    }
}
