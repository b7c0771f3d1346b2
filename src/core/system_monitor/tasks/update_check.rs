//! Remote version check.

use serde::Deserialize;
use std::time::Duration;

use crate::core::sampler::Collector;
use crate::core::system_monitor::UpdateStatus;
use crate::error::{Result, SysdeckError};

/// Remote manifest: `{ "version": "0.2.0", "notes": "..." }`
#[derive(Debug, Deserialize)]
pub struct VersionManifest {
    pub version: String,
    #[serde(default)]
    pub notes: String,
}

/// Collector that compares the running version against a remote manifest.
///
/// Never fails a cycle: network or parse errors become
/// [`UpdateStatus::Unavailable`].
pub struct UpdateChecker {
    client: reqwest::blocking::Client,
    manifest_url: String,
    current_version: String,
}

impl UpdateChecker {
    pub fn new(
        manifest_url: impl Into<String>,
        current_version: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("sysdeck/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            manifest_url: manifest_url.into(),
            current_version: current_version.into(),
        })
    }

    fn fetch_manifest(&self) -> Result<VersionManifest> {
        let response = self.client.get(&self.manifest_url).send()?;
        if !response.status().is_success() {
            return Err(SysdeckError::other(format!(
                "update manifest returned status {}",
                response.status()
            )));
        }
        Ok(response.json()?)
    }

    /// Run one check outside of a sampler.
    pub fn check(&self) -> UpdateStatus {
        match self.fetch_manifest() {
            Ok(manifest) => status_for(&self.current_version, manifest),
            Err(e) => {
                log::debug!("Update check failed: {}", e);
                UpdateStatus::Unavailable {
                    reason: e.to_string(),
                }
            }
        }
    }
}

impl Collector for UpdateChecker {
    type Snapshot = UpdateStatus;

    fn name(&self) -> &str {
        "update"
    }

    fn collect(&mut self) -> Result<UpdateStatus> {
        Ok(self.check())
    }
}

fn status_for(current: &str, manifest: VersionManifest) -> UpdateStatus {
    let latest = manifest.version.trim_start_matches('v').to_string();
    if is_newer_version(&latest, current) {
        UpdateStatus::Available {
            current: current.to_string(),
            latest,
            notes: manifest.notes,
        }
    } else {
        UpdateStatus::UpToDate {
            current: current.to_string(),
        }
    }
}

/// Compare dotted numeric versions component by component.
///
/// `0.1.10` is newer than `0.1.9`; with equal prefixes the longer version wins.
pub fn is_newer_version(new: &str, current: &str) -> bool {
    let parse_version =
        |v: &str| -> Vec<u32> { v.split('.').filter_map(|s| s.parse::<u32>().ok()).collect() };

    let new_parts = parse_version(new);
    let current_parts = parse_version(current);

    for (new_part, current_part) in new_parts.iter().zip(current_parts.iter()) {
        if new_part > current_part {
            return true;
        } else if new_part < current_part {
            return false;
        }
    }

    new_parts.len() > current_parts.len()
}
