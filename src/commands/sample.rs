//! Handlers for the single-sampler commands (`stats`, `disks`, `net`, ...).

use anyhow::{Context, Result};
use clap::ArgMatches;
use colored::Colorize;

use super::run::{stream, RunContext};
use crate::core::system_monitor::tasks::ProcessSort;
use crate::core::system_monitor::{samplers, RowCache, RowDiff, SamplerKind};
use crate::ui::snapshot_views;

pub fn stats(ctx: &RunContext) -> Result<()> {
    let config = ctx.config_for(&[SamplerKind::Stats])?;
    let (sampler, rx) = samplers::stats(&config);
    stream(ctx, sampler, rx, snapshot_views::print_stats)
}

pub fn net(ctx: &RunContext) -> Result<()> {
    let config = ctx.config_for(&[SamplerKind::Network])?;
    let (sampler, rx) = samplers::network(&config);
    stream(ctx, sampler, rx, snapshot_views::print_throughput)
}

pub fn disks(ctx: &RunContext) -> Result<()> {
    let config = ctx.config_for(&[SamplerKind::Disks])?;
    let (sampler, rx) = samplers::disks(&config);
    stream(ctx, sampler, rx, |rows| snapshot_views::print_disks(rows))
}

pub fn connections(ctx: &RunContext) -> Result<()> {
    let config = ctx.config_for(&[SamplerKind::Connections])?;
    let (sampler, rx) = samplers::connections(&config);

    let mut cache = RowCache::new();
    stream(ctx, sampler, rx, |rows| {
        let diff = cache.apply(rows.iter().cloned());
        snapshot_views::print_connections(rows);
        print_diff(&diff, cache.len());
    })
}

pub fn procs(matches: &ArgMatches, ctx: &RunContext) -> Result<()> {
    let sort: ProcessSort = match matches.get_one::<String>("sort") {
        Some(value) => value.parse()?,
        None => ProcessSort::default(),
    };
    let top = matches
        .get_one::<usize>("top")
        .copied()
        .unwrap_or(ctx.config.top_processes);

    let config = ctx.config_for(&[SamplerKind::Processes])?;
    let (sampler, rx) = samplers::processes(&config, sort, Some(top));

    let mut cache = RowCache::new();
    stream(ctx, sampler, rx, |rows| {
        let diff = cache.apply(rows.iter().cloned());
        snapshot_views::print_processes(rows);
        print_diff(&diff, cache.len());
    })
}

pub fn ip(ctx: &RunContext) -> Result<()> {
    let ctx = ctx.clone().with_default_count(1);
    let config = ctx.config_for(&[SamplerKind::Ip])?;
    let (sampler, rx) = samplers::ip(&config).context("Failed to set up the IP lookup")?;
    stream(&ctx, sampler, rx, snapshot_views::print_ip)
}

/// Run one update check against the configured manifest.
pub fn update(matches: &ArgMatches, ctx: &RunContext) -> Result<()> {
    let current = matches
        .get_one::<String>("current")
        .map(String::as_str)
        .unwrap_or(env!("CARGO_PKG_VERSION"));

    let mut ctx = ctx.clone();
    ctx.count = Some(1);

    let (sampler, rx) =
        samplers::update(&ctx.config, current).context("Failed to set up the update check")?;
    stream(&ctx, sampler, rx, snapshot_views::print_update)
}

fn print_diff<K>(diff: &RowDiff<K>, total: usize) {
    println!(
        "  {}",
        format!(
            "{} rows (+{} new, {} changed, -{} gone)",
            total,
            diff.added.len(),
            diff.updated.len(),
            diff.removed.len()
        )
        .dimmed()
    );
}

