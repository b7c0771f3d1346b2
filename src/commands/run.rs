//! Shared driver for commands that stream sampler output.

use anyhow::{Context, Result};
use clap::ArgMatches;
use colored::Colorize;
use serde::Serialize;
use std::time::Duration;

use crate::core::config::Config;
use crate::core::sampler::{CancelToken, Collector, Sampler, SnapshotReceiver};
use crate::core::system_monitor::SamplerKind;

/// How often the foreground loop checks for new snapshots
pub const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Options shared by every streaming command.
#[derive(Debug, Clone)]
pub struct RunContext {
    pub config: Config,
    pub json: bool,
    /// Stop after this many snapshots; `None` runs until Ctrl+C.
    pub count: Option<u64>,
    pub interval_ms: Option<u64>,
    pub cancel: CancelToken,
}

impl RunContext {
    pub fn new(config: Config, cancel: CancelToken) -> Self {
        Self {
            config,
            json: false,
            count: None,
            interval_ms: None,
            cancel,
        }
    }

    /// Read `--json`, `--count` and `--interval` from a subcommand's matches.
    ///
    /// Flags a subcommand does not define are treated as absent.
    pub fn from_matches(matches: &ArgMatches, config: Config, cancel: CancelToken) -> Self {
        let number = |id: &str| matches.try_get_one::<u64>(id).ok().flatten().copied();
        Self {
            json: matches
                .try_get_one::<bool>("json")
                .ok()
                .flatten()
                .copied()
                .unwrap_or(false),
            count: number("count"),
            interval_ms: number("interval"),
            ..Self::new(config, cancel)
        }
    }

    /// Use `count` unless the user asked for something else.
    pub fn with_default_count(mut self, count: u64) -> Self {
        self.count.get_or_insert(count);
        self
    }

    /// The configuration with `--interval` applied to the given samplers.
    pub fn config_for(&self, kinds: &[SamplerKind]) -> Result<Config> {
        let mut config = self.config.clone();
        if let Some(ms) = self.interval_ms {
            for kind in kinds {
                config.periods.set(*kind, ms);
            }
            config.validate().context("Invalid --interval")?;
        }
        Ok(config)
    }

    pub fn reached_count(&self, shown: u64) -> bool {
        self.count.is_some_and(|count| shown >= count)
    }
}

/// Print one snapshot, either as a JSON line or through `render`.
pub fn emit<T: Serialize>(ctx: &RunContext, snapshot: &T, render: impl FnOnce(&T)) -> Result<()> {
    if ctx.json {
        println!(
            "{}",
            serde_json::to_string(snapshot).context("Failed to serialize snapshot")?
        );
    } else {
        render(snapshot);
    }
    Ok(())
}

/// Run one sampler in the background and print its snapshots as they arrive.
///
/// Returns when `ctx.count` snapshots were shown, on Ctrl+C, or when the
/// sampler stops on its own.
pub fn stream<C>(
    ctx: &RunContext,
    mut sampler: Sampler<C>,
    mut rx: SnapshotReceiver<C::Snapshot>,
    mut render: impl FnMut(&C::Snapshot),
) -> Result<()>
where
    C: Collector,
    C::Snapshot: Serialize + Sync,
{
    sampler
        .start()
        .with_context(|| format!("Failed to start the {} sampler", sampler.name()))?;

    if !ctx.json && ctx.count != Some(1) {
        println!("{}", "Press Ctrl+C to stop".dimmed());
    }

    let mut shown = 0;
    while !ctx.reached_count(shown) {
        if let Some(snapshot) = rx.take_new() {
            emit(ctx, &*snapshot, &mut render)?;
            shown += 1;
            continue;
        }

        if !sampler.is_running() {
            log::warn!("{} sampler stopped after an error", sampler.name());
            break;
        }

        if !ctx.cancel.sleep(POLL_INTERVAL) {
            break;
        }
    }

    sampler.stop();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_for_applies_interval() {
        let mut ctx = RunContext::new(Config::default(), CancelToken::new());
        ctx.interval_ms = Some(250);

        let config = ctx.config_for(&[SamplerKind::Disks]).unwrap();
        assert_eq!(config.period(SamplerKind::Disks), Duration::from_millis(250));
        assert_eq!(config.period(SamplerKind::Stats), Duration::from_secs(1));

        ctx.interval_ms = Some(0);
        assert!(ctx.config_for(&[SamplerKind::Disks]).is_err());
    }

    #[test]
    fn test_default_count_does_not_override_user_choice() {
        let ctx = RunContext::new(Config::default(), CancelToken::new()).with_default_count(1);
        assert_eq!(ctx.count, Some(1));
        assert!(ctx.reached_count(1));

        let mut ctx = RunContext::new(Config::default(), CancelToken::new());
        ctx.count = Some(3);
        let ctx = ctx.with_default_count(1);
        assert_eq!(ctx.count, Some(3));
        assert!(!ctx.reached_count(2));
    }
}
