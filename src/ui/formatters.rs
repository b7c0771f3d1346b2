use crate::core::rate::clamp_rate;
use crate::core::system_monitor::BatteryReading;

const KIB: f64 = 1024.0;
const MIB: f64 = 1024.0 * 1024.0;
const GIB: f64 = 1024.0 * 1024.0 * 1024.0;

/// Throughput that fills a speed bar completely
const SPEED_BAR_FULL_SCALE: f64 = 5.0 * MIB;

/// Format a byte rate in human-readable units (B/s, KB/s, MB/s)
///
/// Negative rates (counter reset) and NaN display as `0 B/s`.
pub fn format_rate(bytes_per_sec: f64) -> String {
    let rate = clamp_rate(bytes_per_sec);
    if rate < KIB {
        format!("{:.0} B/s", rate)
    } else if rate < MIB {
        format!("{:.1} KB/s", rate / KIB)
    } else {
        format!("{:.1} MB/s", rate / MIB)
    }
}

/// Format a volume size in GB, switching to TB above 1000 GB
pub fn format_size(bytes: u64) -> String {
    let gb = bytes as f64 / GIB;
    if gb > 1000.0 {
        format!("{:.1} TB", gb / 1024.0)
    } else {
        format!("{:.1} GB", gb)
    }
}

/// Format a percentage with one decimal place
pub fn format_percent(percent: f32) -> String {
    format!("{:.1}%", percent)
}

/// Format a process memory figure already expressed in MB
pub fn format_memory_mb(mb: f64) -> String {
    format!("{:.1} MB", mb)
}

pub fn format_battery(reading: &BatteryReading) -> String {
    match reading {
        BatteryReading::Present {
            percent,
            plugged: true,
        } => format!("{:.0}% (Charging)", percent),
        BatteryReading::Present { percent, .. } => format!("{:.0}%", percent),
        BatteryReading::Absent => "AC Power".to_string(),
    }
}

/// Bar fill (0-100) for a throughput value, saturating at 5 MB/s
pub fn speed_bar_percent(bytes_per_sec: f64) -> u8 {
    let percent = clamp_rate(bytes_per_sec) / SPEED_BAR_FULL_SCALE * 100.0;
    percent.min(100.0) as u8
}
