//! System monitoring core functionality.
//!
//! Snapshot types, the collectors that produce them and the consumer-side
//! row cache. Collectors are driven by [`Sampler`](crate::core::sampler::Sampler)
//! threads; see [`samplers`] for constructing them from a [`Config`](crate::Config).

mod metrics;
pub mod row_cache;
pub mod samplers;
pub mod tasks;

pub use metrics::{
    BatteryReading, ConnectionRow, DiskRow, IpSnapshot, MetricSnapshot, ProcessRow,
    ThroughputSnapshot, UpdateStatus,
};
pub use row_cache::{KeyedRow, RowCache, RowDiff};
pub use tasks::SamplerKind;
