//! Collectors driven by [`Sampler`](crate::core::sampler::Sampler) threads.
//!
//! Each subsystem is an independent collector with its own polling frequency.

mod battery;
mod connections;
mod disks;
mod ip_lookup;
mod network;
mod processes;
mod stats;
mod update_check;

pub use battery::read_battery;
pub use connections::ConnectionCollector;
pub use disks::DiskCollector;
pub use ip_lookup::{IpLookupCollector, OFFLINE};
pub use network::{elapsed_between, NetworkSpeedCollector};
pub use processes::{sort_and_truncate, terminate_process, ProcessCollector, ProcessSort};
pub use stats::SystemStatsCollector;
pub use update_check::{is_newer_version, UpdateChecker};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::error::SysdeckError;

/// The sampler instantiations shipped with the suite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SamplerKind {
    Stats,
    Disks,
    Network,
    Connections,
    Processes,
    Ip,
    Update,
}

impl SamplerKind {
    pub const ALL: [SamplerKind; 7] = [
        SamplerKind::Stats,
        SamplerKind::Disks,
        SamplerKind::Network,
        SamplerKind::Connections,
        SamplerKind::Processes,
        SamplerKind::Ip,
        SamplerKind::Update,
    ];

    pub fn name(self) -> &'static str {
        match self {
            SamplerKind::Stats => "stats",
            SamplerKind::Disks => "disks",
            SamplerKind::Network => "network",
            SamplerKind::Connections => "connections",
            SamplerKind::Processes => "processes",
            SamplerKind::Ip => "ip",
            SamplerKind::Update => "update",
        }
    }

    /// Polling period used when the config does not override it
    pub fn default_period(self) -> Duration {
        match self {
            SamplerKind::Stats | SamplerKind::Network => Duration::from_secs(1),
            SamplerKind::Processes => Duration::from_secs(2),
            SamplerKind::Connections => Duration::from_secs(3),
            SamplerKind::Disks => Duration::from_secs(5),
            SamplerKind::Ip => Duration::from_secs(60),
            SamplerKind::Update => Duration::from_secs(6 * 60 * 60),
        }
    }
}

impl fmt::Display for SamplerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SamplerKind {
    type Err = SysdeckError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SamplerKind::ALL
            .into_iter()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| SysdeckError::config(format!("unknown sampler '{}'", s)))
    }
}

fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
