use serde::{Deserialize, Serialize};

/// One system-stats cycle: CPU, memory, swap, throughput and battery
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricSnapshot {
    pub timestamp: i64, // Unix timestamp, milliseconds
    pub cpu_percent: f32,
    pub ram_percent: f32,
    pub swap_percent: f32,
    pub download_bps: f64,
    pub upload_bps: f64,
    pub battery: BatteryReading,
}

/// Battery state, or the sentinel for machines without one
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BatteryReading {
    Present { percent: f32, plugged: bool },
    #[default]
    Absent,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ThroughputSnapshot {
    pub timestamp: i64,
    pub download_bps: f64,
    pub upload_bps: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProcessRow {
    pub pid: u32,
    pub name: String,
    pub user: String,
    pub memory_mb: f64,
    pub cpu_percent: f32,
    pub exe_path: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DiskRow {
    pub name: String, // mount point, no trailing separator
    pub device: String,
    pub fs_type: String,
    pub total_bytes: u64,
    pub free_bytes: u64,
    pub used_bytes: u64,
    pub percent: f32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConnectionRow {
    pub pid: u32,
    pub name: String,
    pub exe_path: String,
    pub remote_addr: String,
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IpSnapshot {
    pub local_ip: String,
    pub public_ip: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum UpdateStatus {
    UpToDate {
        current: String,
    },
    Available {
        current: String,
        latest: String,
        notes: String,
    },
    Unavailable {
        reason: String,
    },
}
