//! CPU, memory, swap, throughput and battery collector.
//!
//! These are grouped because the monitoring panel shows them together and
//! refreshes them on the same 1 second beat.

use std::time::Duration;
use sysinfo::{CpuRefreshKind, MemoryRefreshKind, RefreshKind, System};

use super::battery::read_battery;
use super::network::ThroughputMeter;
use super::now_millis;
use crate::core::rate::RateClock;
use crate::core::sampler::Collector;
use crate::core::system_monitor::MetricSnapshot;
use crate::error::Result;

pub struct SystemStatsCollector {
    system: System,
    meter: ThroughputMeter,
}

impl SystemStatsCollector {
    pub fn new() -> Self {
        Self::with_clock(RateClock::default(), Duration::from_secs(1))
    }

    pub fn with_clock(clock: RateClock, period: Duration) -> Self {
        let refresh_kind = RefreshKind::nothing()
            .with_cpu(CpuRefreshKind::nothing().with_cpu_usage())
            .with_memory(MemoryRefreshKind::everything());

        Self {
            system: System::new_with_specifics(refresh_kind),
            meter: ThroughputMeter::new(clock, period),
        }
    }
}

impl Default for SystemStatsCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl Collector for SystemStatsCollector {
    type Snapshot = MetricSnapshot;

    fn name(&self) -> &str {
        "stats"
    }

    fn prime(&mut self) -> Result<()> {
        // CPU usage is a delta too: it needs two refreshes some time apart
        self.system.refresh_cpu_usage();
        self.meter.prime();
        Ok(())
    }

    fn warmup(&self) -> Duration {
        self.meter.warmup().max(sysinfo::MINIMUM_CPU_UPDATE_INTERVAL)
    }

    fn collect(&mut self) -> Result<MetricSnapshot> {
        self.system.refresh_cpu_usage();
        self.system.refresh_memory();
        let rates = self.meter.sample();

        Ok(MetricSnapshot {
            timestamp: now_millis(),
            cpu_percent: self.system.global_cpu_usage(),
            ram_percent: percent_of(self.system.used_memory(), self.system.total_memory()),
            swap_percent: percent_of(self.system.used_swap(), self.system.total_swap()),
            download_bps: rates.download,
            upload_bps: rates.upload,
            battery: read_battery(),
        })
    }
}

/// `used / total` as a percentage; 0 when `total` is 0 (no swap configured)
pub(crate) fn percent_of(used: u64, total: u64) -> f32 {
    if total > 0 {
        (used as f64 / total as f64 * 100.0) as f32
    } else {
        0.0
    }
}
