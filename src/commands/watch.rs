//! `sysdeck watch`: every continuous sampler at once.
//!
//! Each sampler runs on its own thread at its own period. The foreground
//! loop drains whichever receivers have something new and prints it.

use anyhow::{Context, Result};
use colored::Colorize;
use serde::Serialize;

use super::run::{RunContext, POLL_INTERVAL};
use crate::core::system_monitor::tasks::ProcessSort;
use crate::core::system_monitor::{samplers, RowCache, SamplerKind};
use crate::ui::snapshot_views;

const WATCHED: [SamplerKind; 4] = [
    SamplerKind::Stats,
    SamplerKind::Disks,
    SamplerKind::Processes,
    SamplerKind::Connections,
];

pub fn execute(ctx: &RunContext) -> Result<()> {
    let config = ctx.config_for(&WATCHED)?;

    let (mut stats, mut stats_rx) = samplers::stats(&config);
    let (mut disks, mut disks_rx) = samplers::disks(&config);
    let (mut procs, mut procs_rx) =
        samplers::processes(&config, ProcessSort::Cpu, Some(config.top_processes));
    let (mut conns, mut conns_rx) = samplers::connections(&config);

    stats.start().context("Failed to start the stats sampler")?;
    disks.start().context("Failed to start the disk sampler")?;
    procs.start().context("Failed to start the process sampler")?;
    conns.start().context("Failed to start the connection sampler")?;

    if !ctx.json {
        println!("{}", "Watching system activity. Press Ctrl+C to stop".dimmed());
    }

    let mut process_cache = RowCache::new();
    let mut connection_cache = RowCache::new();
    let mut ticks = 0;

    while !ctx.reached_count(ticks) {
        if let Some(rows) = disks_rx.take_new() {
            print_tagged(ctx, SamplerKind::Disks, rows.as_slice(), |rows| {
                snapshot_views::print_disks(rows)
            })?;
        }
        if let Some(rows) = procs_rx.take_new() {
            process_cache.apply(rows.iter().cloned());
            print_tagged(ctx, SamplerKind::Processes, rows.as_slice(), |rows| {
                snapshot_views::print_processes(rows)
            })?;
        }
        if let Some(rows) = conns_rx.take_new() {
            connection_cache.apply(rows.iter().cloned());
            print_tagged(ctx, SamplerKind::Connections, rows.as_slice(), |rows| {
                snapshot_views::print_connections(rows)
            })?;
        }
        if let Some(snapshot) = stats_rx.take_new() {
            print_tagged(ctx, SamplerKind::Stats, &*snapshot, snapshot_views::print_stats)?;
            ticks += 1;
            continue;
        }

        if !stats.is_running() {
            log::warn!("stats sampler stopped after an error");
            break;
        }

        if !ctx.cancel.sleep(POLL_INTERVAL) {
            break;
        }
    }

    stats.stop();
    disks.stop();
    procs.stop();
    conns.stop();

    if !ctx.json {
        println!(
            "{}",
            format!(
                "Tracked {} processes and {} connections",
                process_cache.len(),
                connection_cache.len()
            )
            .dimmed()
        );
    }

    Ok(())
}

/// One JSON line of `watch --json` output
#[derive(Serialize)]
struct Tagged<'a, T: ?Sized> {
    sampler: SamplerKind,
    snapshot: &'a T,
}

fn print_tagged<T: Serialize + ?Sized>(
    ctx: &RunContext,
    kind: SamplerKind,
    snapshot: &T,
    render: impl FnOnce(&T),
) -> Result<()> {
    if ctx.json {
        let line = Tagged {
            sampler: kind,
            snapshot,
        };
        println!(
            "{}",
            serde_json::to_string(&line).context("Failed to serialize snapshot")?
        );
    } else {
        render(snapshot);
    }
    Ok(())
}
