//! Samplers wired up from a [`Config`].
//!
//! Each constructor returns an idle sampler and the receiving end of its
//! latest-value channel. Callers start and stop them.

use crate::core::config::Config;
use crate::core::sampler::{Sampler, SnapshotReceiver};
use crate::error::Result;

use super::tasks::{
    ConnectionCollector, DiskCollector, IpLookupCollector, NetworkSpeedCollector,
    ProcessCollector, ProcessSort, SamplerKind, SystemStatsCollector, UpdateChecker,
};
use super::{ConnectionRow, DiskRow, IpSnapshot, MetricSnapshot, ProcessRow, ThroughputSnapshot, UpdateStatus};

pub type Pair<C, T> = (Sampler<C>, SnapshotReceiver<T>);

pub fn stats(config: &Config) -> Pair<SystemStatsCollector, MetricSnapshot> {
    let collector =
        SystemStatsCollector::with_clock(config.rate_clock, config.period(SamplerKind::Stats));
    Sampler::with_channel(collector, config.sampler_options(SamplerKind::Stats))
}

pub fn network(config: &Config) -> Pair<NetworkSpeedCollector, ThroughputSnapshot> {
    let collector =
        NetworkSpeedCollector::new(config.rate_clock, config.period(SamplerKind::Network));
    Sampler::with_channel(collector, config.sampler_options(SamplerKind::Network))
}

pub fn disks(config: &Config) -> Pair<DiskCollector, Vec<DiskRow>> {
    Sampler::with_channel(
        DiskCollector::new(),
        config.sampler_options(SamplerKind::Disks),
    )
}

pub fn connections(config: &Config) -> Pair<ConnectionCollector, Vec<ConnectionRow>> {
    Sampler::with_channel(
        ConnectionCollector::new(),
        config.sampler_options(SamplerKind::Connections),
    )
}

/// `top: None` lists every process (the task manager table).
pub fn processes(
    config: &Config,
    sort: ProcessSort,
    top: Option<usize>,
) -> Pair<ProcessCollector, Vec<ProcessRow>> {
    Sampler::with_channel(
        ProcessCollector::new().with_top(sort, top),
        config.sampler_options(SamplerKind::Processes),
    )
}

pub fn ip(config: &Config) -> Result<Pair<IpLookupCollector, IpSnapshot>> {
    let collector = IpLookupCollector::new(config.ip_endpoint.clone(), config.ip_timeout())?;
    Ok(Sampler::with_channel(
        collector,
        config.sampler_options(SamplerKind::Ip),
    ))
}

pub fn update(config: &Config, current_version: &str) -> Result<Pair<UpdateChecker, UpdateStatus>> {
    let checker = UpdateChecker::new(
        config.update_manifest_url.clone(),
        current_version,
        config.update_timeout(),
    )?;
    Ok(Sampler::with_channel(
        checker,
        config.sampler_options(SamplerKind::Update),
    ))
}
