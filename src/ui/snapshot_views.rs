//! Human-readable rendering of sampler snapshots.

use chrono::{DateTime, Local, Utc};
use colored::Colorize;

use crate::core::system_monitor::{
    ConnectionRow, DiskRow, IpSnapshot, MetricSnapshot, ProcessRow, ThroughputSnapshot,
    UpdateStatus,
};
use crate::ui::formatters::{
    format_battery, format_memory_mb, format_percent, format_rate, format_size,
    speed_bar_percent,
};

const BAR_WIDTH: usize = 20;

pub fn print_section_header(title: &str) {
    println!("\n{}", title.bold().green());
    println!("{}", "-".repeat(title.len()));
}

pub fn print_stats(snapshot: &MetricSnapshot) {
    print_section_header(&format!("SYSTEM STATS {}", clock_time(snapshot.timestamp)));
    print_usage_line("CPU", snapshot.cpu_percent);
    print_usage_line("RAM", snapshot.ram_percent);
    print_usage_line("Swap", snapshot.swap_percent);
    print_speed_line("Down", snapshot.download_bps);
    print_speed_line("Up", snapshot.upload_bps);
    println!(
        "  {:<6} {}",
        "Power".white().bold(),
        format_battery(&snapshot.battery).cyan()
    );
}

pub fn print_throughput(snapshot: &ThroughputSnapshot) {
    print_section_header(&format!("NETWORK {}", clock_time(snapshot.timestamp)));
    print_speed_line("Down", snapshot.download_bps);
    print_speed_line("Up", snapshot.upload_bps);
}

pub fn print_disks(rows: &[DiskRow]) {
    print_section_header("DISKS");
    if rows.is_empty() {
        println!("  {}", "No volumes found".dimmed());
        return;
    }

    for row in rows {
        println!(
            "  {:<20} {} {:>7}  {} free of {}  {}",
            row.name.white().bold(),
            usage_bar(row.percent, BAR_WIDTH),
            format_percent(row.percent),
            format_size(row.free_bytes),
            format_size(row.total_bytes),
            format!("{} {}", row.fs_type, row.device).dimmed()
        );
    }
}

pub fn print_processes(rows: &[ProcessRow]) {
    print_section_header("PROCESSES");
    println!(
        "  {:>7}  {:<28} {:<16} {:>7} {:>11}",
        "PID".bold(),
        "NAME".bold(),
        "USER".bold(),
        "CPU".bold(),
        "MEMORY".bold()
    );

    for row in rows {
        println!(
            "  {:>7}  {:<28} {:<16} {:>7} {:>11}",
            row.pid,
            truncate(&row.name, 28).white(),
            truncate(&row.user, 16).dimmed(),
            format_percent(row.cpu_percent),
            format_memory_mb(row.memory_mb)
        );
    }
}

pub fn print_connections(rows: &[ConnectionRow]) {
    print_section_header("CONNECTIONS");
    if rows.is_empty() {
        println!("  {}", "No established connections".dimmed());
        return;
    }

    for row in rows {
        println!(
            "  {:>7}  {:<24} {:<40} {}",
            row.pid,
            truncate(&row.name, 24).white().bold(),
            row.remote_addr.cyan(),
            row.status.green()
        );
        if !row.exe_path.is_empty() {
            println!("           {}", row.exe_path.dimmed());
        }
    }
}

pub fn print_ip(snapshot: &IpSnapshot) {
    print_section_header("IP ADDRESSES");
    println!("  {:<8} {}", "Local".white().bold(), snapshot.local_ip.cyan());
    println!("  {:<8} {}", "Public".white().bold(), snapshot.public_ip.cyan());
}

pub fn print_update(status: &UpdateStatus) {
    print_section_header("UPDATES");
    match status {
        UpdateStatus::UpToDate { current } => {
            println!("  {}", format!("sysdeck {} is up to date", current).green());
        }
        UpdateStatus::Available {
            current,
            latest,
            notes,
        } => {
            println!(
                "  {}",
                format!("Update available: {} -> {}", current, latest)
                    .yellow()
                    .bold()
            );
            if !notes.is_empty() {
                println!("  {}", notes.dimmed());
            }
        }
        UpdateStatus::Unavailable { reason } => {
            println!("  {}", format!("Update check failed: {}", reason).red());
        }
    }
}

fn print_usage_line(label: &str, percent: f32) {
    println!(
        "  {:<6} {} {:>7}",
        label.white().bold(),
        colored_bar(percent),
        format_percent(percent)
    );
}

fn print_speed_line(label: &str, bytes_per_sec: f64) {
    let fill = speed_bar_percent(bytes_per_sec) as f32;
    println!(
        "  {:<6} [{}] {:>11}",
        label.white().bold(),
        usage_bar(fill, BAR_WIDTH).cyan(),
        format_rate(bytes_per_sec)
    );
}

/// Bar of `width` cells filled in proportion to `percent` (clamped to 0..=100)
pub fn usage_bar(percent: f32, width: usize) -> String {
    let percent = if percent.is_nan() {
        0.0
    } else {
        percent.clamp(0.0, 100.0)
    };
    let filled = ((percent / 100.0) * width as f32).round() as usize;
    let empty = width.saturating_sub(filled);

    format!("{}{}", "█".repeat(filled), "░".repeat(empty))
}

fn colored_bar(percent: f32) -> String {
    let bar = usage_bar(percent, BAR_WIDTH);

    // Color the bar based on usage
    let colored_bar = if percent >= 85.0 {
        bar.red()
    } else if percent >= 70.0 {
        bar.yellow()
    } else {
        bar.green()
    };

    format!("[{}]", colored_bar)
}

fn clock_time(timestamp_ms: i64) -> String {
    DateTime::<Utc>::from_timestamp_millis(timestamp_ms)
        .map(|t| t.with_timezone(&Local).format("%H:%M:%S").to_string())
        .unwrap_or_default()
}

/// Shorten to at most `max` characters, marking the cut with `~`
fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max.saturating_sub(1)).collect();
    out.push('~');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_usage_bar_fill() {
        assert_eq!(usage_bar(0.0, 4), "░░░░");
        assert_eq!(usage_bar(50.0, 4), "██░░");
        assert_eq!(usage_bar(100.0, 4), "████");
        assert_eq!(usage_bar(250.0, 4), "████");
        assert_eq!(usage_bar(f32::NAN, 4), "░░░░");
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("firefox", 10), "firefox");
        assert_eq!(truncate("a-very-long-process-name", 8), "a-very-~");
        assert_eq!(truncate("ünïcödé", 4), "ünï~");
    }

    #[test]
    fn test_clock_time_handles_out_of_range() {
        assert_eq!(clock_time(i64::MAX), "");
        assert_eq!(clock_time(0).len(), 8);
    }
}
