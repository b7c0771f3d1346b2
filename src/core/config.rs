use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::core::rate::RateClock;
use crate::core::sampler::{ErrorPolicy, SamplerOptions};
use crate::core::system_monitor::SamplerKind;
use crate::error::SysdeckError;

pub const DEFAULT_IP_ENDPOINT: &str = "https://api.ipify.org";
pub const DEFAULT_UPDATE_MANIFEST_URL: &str =
    "https://raw.githubusercontent.com/sysdeck/sysdeck/main/version.json";

/// Polling period per sampler, in milliseconds
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplerPeriods {
    pub stats_ms: u64,
    pub disks_ms: u64,
    pub network_ms: u64,
    pub connections_ms: u64,
    pub processes_ms: u64,
    pub ip_ms: u64,
    pub update_ms: u64,
}

impl Default for SamplerPeriods {
    fn default() -> Self {
        let ms = |kind: SamplerKind| kind.default_period().as_millis() as u64;
        Self {
            stats_ms: ms(SamplerKind::Stats),
            disks_ms: ms(SamplerKind::Disks),
            network_ms: ms(SamplerKind::Network),
            connections_ms: ms(SamplerKind::Connections),
            processes_ms: ms(SamplerKind::Processes),
            ip_ms: ms(SamplerKind::Ip),
            update_ms: ms(SamplerKind::Update),
        }
    }
}

impl SamplerPeriods {
    pub fn get(&self, kind: SamplerKind) -> u64 {
        match kind {
            SamplerKind::Stats => self.stats_ms,
            SamplerKind::Disks => self.disks_ms,
            SamplerKind::Network => self.network_ms,
            SamplerKind::Connections => self.connections_ms,
            SamplerKind::Processes => self.processes_ms,
            SamplerKind::Ip => self.ip_ms,
            SamplerKind::Update => self.update_ms,
        }
    }

    pub fn set(&mut self, kind: SamplerKind, ms: u64) {
        let slot = match kind {
            SamplerKind::Stats => &mut self.stats_ms,
            SamplerKind::Disks => &mut self.disks_ms,
            SamplerKind::Network => &mut self.network_ms,
            SamplerKind::Connections => &mut self.connections_ms,
            SamplerKind::Processes => &mut self.processes_ms,
            SamplerKind::Ip => &mut self.ip_ms,
            SamplerKind::Update => &mut self.update_ms,
        };
        *slot = ms;
    }
}

/// Settings shared by every sampler the front end builds.
///
/// Constructed explicitly and passed by reference; there is no global instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub periods: SamplerPeriods,
    pub stop_timeout_ms: u64,
    pub error_policy: ErrorPolicy,
    pub rate_clock: RateClock,
    pub ip_endpoint: String,
    pub ip_timeout_ms: u64,
    pub update_manifest_url: String,
    pub update_timeout_ms: u64,
    pub top_processes: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            periods: SamplerPeriods::default(),
            stop_timeout_ms: 6_000,
            error_policy: ErrorPolicy::Continue,
            rate_clock: RateClock::Measured,
            ip_endpoint: DEFAULT_IP_ENDPOINT.to_string(),
            ip_timeout_ms: 3_000,
            update_manifest_url: DEFAULT_UPDATE_MANIFEST_URL.to_string(),
            update_timeout_ms: 5_000,
            top_processes: 15,
        }
    }
}

impl Config {
    /// Load from the default location; see [`Config::load_from`].
    pub fn load() -> Result<Self> {
        let config_path = Self::get_config_path()?;
        Self::load_from(&config_path)
    }

    /// Load a config file, falling back to defaults when it is missing,
    /// empty, unparsable or invalid.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Config::default());
        }

        let data = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        if data.trim().is_empty() {
            return Ok(Config::default());
        }

        let config: Config = match serde_json::from_str(&data) {
            Ok(config) => config,
            Err(e) => {
                log::warn!("Ignoring unreadable config {:?}: {}", path, e);
                return Ok(Config::default());
            }
        };

        if let Err(e) = config.validate() {
            log::warn!("Ignoring invalid config {:?}: {}", path, e);
            return Ok(Config::default());
        }

        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::get_config_path()?;
        self.save_to(&config_path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
        }

        let data = serde_json::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(path, data).with_context(|| format!("Failed to write config file: {:?}", path))?;

        Ok(())
    }

    pub fn get_config_path() -> Result<PathBuf> {
        let config_dir =
            dirs::config_dir().with_context(|| "Could not determine config directory")?;

        Ok(config_dir.join("sysdeck").join("config.json"))
    }

    /// Reject settings that would break the sampler contracts.
    ///
    /// Network timeouts must be shorter than the stop timeout so that
    /// stopping a sampler never waits on an in-flight request.
    pub fn validate(&self) -> crate::Result<()> {
        for kind in SamplerKind::ALL {
            if self.periods.get(kind) == 0 {
                return Err(SysdeckError::config(format!(
                    "period for '{}' must be greater than zero",
                    kind
                )));
            }
        }

        if self.stop_timeout_ms == 0 {
            return Err(SysdeckError::config("stop_timeout_ms must be greater than zero"));
        }

        for (name, timeout) in [
            ("ip_timeout_ms", self.ip_timeout_ms),
            ("update_timeout_ms", self.update_timeout_ms),
        ] {
            if timeout == 0 || timeout >= self.stop_timeout_ms {
                return Err(SysdeckError::config(format!(
                    "{} ({}) must be between 1 and stop_timeout_ms ({})",
                    name, timeout, self.stop_timeout_ms
                )));
            }
        }

        if self.top_processes == 0 {
            return Err(SysdeckError::config("top_processes must be greater than zero"));
        }

        Ok(())
    }

    pub fn period(&self, kind: SamplerKind) -> Duration {
        Duration::from_millis(self.periods.get(kind))
    }

    pub fn stop_timeout(&self) -> Duration {
        Duration::from_millis(self.stop_timeout_ms)
    }

    pub fn ip_timeout(&self) -> Duration {
        Duration::from_millis(self.ip_timeout_ms)
    }

    pub fn update_timeout(&self) -> Duration {
        Duration::from_millis(self.update_timeout_ms)
    }

    pub fn sampler_options(&self, kind: SamplerKind) -> SamplerOptions {
        SamplerOptions {
            period: self.period(kind),
            stop_timeout: self.stop_timeout(),
            error_policy: self.error_policy,
        }
    }

    /// Set one value by key, as used by `sysdeck config set`.
    ///
    /// Periods are addressed as `period.<sampler>`, e.g. `period.disks`.
    /// The result is validated; on error the config is left unchanged.
    pub fn set_value(&mut self, key: &str, value: &str) -> crate::Result<()> {
        let mut next = self.clone();

        let parse_u64 = |value: &str| {
            value
                .parse::<u64>()
                .map_err(|_| SysdeckError::config(format!("'{}' is not a number", value)))
        };

        match key {
            "stop_timeout_ms" => next.stop_timeout_ms = parse_u64(value)?,
            "ip_timeout_ms" => next.ip_timeout_ms = parse_u64(value)?,
            "update_timeout_ms" => next.update_timeout_ms = parse_u64(value)?,
            "top_processes" => next.top_processes = parse_u64(value)? as usize,
            "ip_endpoint" => next.ip_endpoint = value.to_string(),
            "update_manifest_url" => next.update_manifest_url = value.to_string(),
            "rate_clock" => {
                next.rate_clock = match value {
                    "measured" => RateClock::Measured,
                    "nominal" => RateClock::Nominal,
                    other => {
                        return Err(SysdeckError::config(format!(
                            "rate_clock must be 'measured' or 'nominal', got '{}'",
                            other
                        )))
                    }
                }
            }
            "error_policy" => {
                next.error_policy = match value {
                    "continue" => ErrorPolicy::Continue,
                    "stop_on_error" => ErrorPolicy::StopOnError,
                    other => {
                        return Err(SysdeckError::config(format!(
                            "error_policy must be 'continue' or 'stop_on_error', got '{}'",
                            other
                        )))
                    }
                }
            }
            other => match other.strip_prefix("period.") {
                Some(kind) => next.periods.set(kind.parse()?, parse_u64(value)?),
                None => return Err(SysdeckError::config(format!("unknown key '{}'", other))),
            },
        }

        next.validate()?;
        *self = next;
        Ok(())
    }
}
