use std::time::Duration;
use sysdeck::core::system_monitor::SamplerKind;
use sysdeck::{Config, ErrorPolicy, RateClock};
use tempfile::TempDir;

#[test]
fn test_config_default_periods() {
    let config = Config::default();

    assert_eq!(config.period(SamplerKind::Stats), Duration::from_secs(1));
    assert_eq!(config.period(SamplerKind::Disks), Duration::from_secs(5));
    assert_eq!(config.period(SamplerKind::Network), Duration::from_secs(1));
    assert_eq!(config.period(SamplerKind::Connections), Duration::from_secs(3));
    assert_eq!(config.period(SamplerKind::Processes), Duration::from_secs(2));
    assert_eq!(config.period(SamplerKind::Ip), Duration::from_secs(60));
    assert_eq!(
        config.period(SamplerKind::Update),
        Duration::from_secs(6 * 60 * 60)
    );
    assert_eq!(config.error_policy, ErrorPolicy::Continue);
    assert_eq!(config.rate_clock, RateClock::Measured);
}

#[test]
fn test_config_load_nonexistent_returns_default() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("missing.json");

    let config = Config::load_from(&path).unwrap();
    assert_eq!(config, Config::default());
}

#[test]
fn test_config_roundtrip() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("nested").join("config.json");

    let mut config = Config::default();
    config.set_value("period.connections", "4500").unwrap();
    config.set_value("error_policy", "stop_on_error").unwrap();
    config.set_value("top_processes", "7").unwrap();
    config.save_to(&path).unwrap();

    let loaded = Config::load_from(&path).unwrap();
    assert_eq!(loaded, config);
    assert_eq!(loaded.periods.connections_ms, 4_500);
    assert_eq!(loaded.error_policy, ErrorPolicy::StopOnError);
}

#[test]
fn test_config_corrupt_or_empty_file_falls_back_to_default() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("config.json");

    std::fs::write(&path, "{ not json").unwrap();
    assert_eq!(Config::load_from(&path).unwrap(), Config::default());

    std::fs::write(&path, "   \n").unwrap();
    assert_eq!(Config::load_from(&path).unwrap(), Config::default());
}

#[test]
fn test_config_partial_file_keeps_other_defaults() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("config.json");
    std::fs::write(&path, r#"{ "periods": { "disks_ms": 10000 }, "rate_clock": "nominal" }"#)
        .unwrap();

    let config = Config::load_from(&path).unwrap();
    assert_eq!(config.periods.disks_ms, 10_000);
    assert_eq!(config.periods.stats_ms, 1_000);
    assert_eq!(config.rate_clock, RateClock::Nominal);
    assert_eq!(config.ip_timeout_ms, Config::default().ip_timeout_ms);
}

#[test]
fn test_config_invalid_timeouts_fall_back_to_default() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("config.json");
    std::fs::write(&path, r#"{ "stop_timeout_ms": 1000, "ip_timeout_ms": 3000 }"#).unwrap();

    assert_eq!(Config::load_from(&path).unwrap(), Config::default());
}
