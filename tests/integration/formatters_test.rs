use sysdeck::core::system_monitor::BatteryReading;
use sysdeck::ui::{
    format_battery, format_memory_mb, format_percent, format_rate, format_size,
    speed_bar_percent,
};

#[test]
fn test_rate_units_follow_thresholds() {
    let cases = [
        (0.0, "0 B/s"),
        (1.0, "1 B/s"),
        (1023.4, "1023 B/s"),
        (1024.0, "1.0 KB/s"),
        (10_240.0, "10.0 KB/s"),
        (1_048_575.0, "1024.0 KB/s"),
        (1_048_576.0, "1.0 MB/s"),
        (5_242_880.0, "5.0 MB/s"),
    ];

    for (rate, expected) in cases {
        assert_eq!(format_rate(rate), expected, "rate {}", rate);
    }
}

#[test]
fn test_negative_rate_never_renders_negative() {
    for rate in [-1.0, -1024.0, -1e12, f64::NEG_INFINITY] {
        let text = format_rate(rate);
        assert_eq!(text, "0 B/s");
        assert!(!text.contains('-'));
    }
}

#[test]
fn test_size_units() {
    let gib = 1u64 << 30;
    assert_eq!(format_size(gib / 2), "0.5 GB");
    assert_eq!(format_size(256 * gib), "256.0 GB");
    assert_eq!(format_size(1001 * gib), "1.0 TB");
    assert_eq!(format_size(4096 * gib), "4.0 TB");
}

#[test]
fn test_percent_memory_and_battery() {
    assert_eq!(format_percent(0.0), "0.0%");
    assert_eq!(format_percent(12.34), "12.3%");
    assert_eq!(format_memory_mb(0.0), "0.0 MB");
    assert_eq!(format_memory_mb(2048.26), "2048.3 MB");

    let charging = BatteryReading::Present {
        percent: 99.6,
        plugged: true,
    };
    assert_eq!(format_battery(&charging), "100% (Charging)");
    assert_eq!(format_battery(&BatteryReading::default()), "AC Power");
}

#[test]
fn test_speed_bar_saturates() {
    assert_eq!(speed_bar_percent(1_048_576.0), 20);
    assert_eq!(speed_bar_percent(5_242_880.0), 100);
    assert_eq!(speed_bar_percent(1e15), 100);
    assert_eq!(speed_bar_percent(f64::NAN), 0);
}

fn displayed_bytes(text: &str) -> f64 {
    let (value, unit) = text.split_once(' ').unwrap();
    let value: f64 = value.parse().unwrap();
    match unit {
        "B/s" => value,
        "KB/s" => value * 1024.0,
        "MB/s" => value * 1024.0 * 1024.0,
        other => panic!("unexpected unit {}", other),
    }
}

#[test]
fn test_rate_display_is_monotonic() {
    let mut previous = 0.0;
    let mut rate = 0.0;
    while rate < 50.0 * 1024.0 * 1024.0 {
        let shown = displayed_bytes(&format_rate(rate));
        assert!(shown >= previous, "{} displayed below its predecessor", rate);
        previous = shown;
        rate = rate * 1.07 + 3.0;
    }
}
