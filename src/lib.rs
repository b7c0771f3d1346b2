// sysdeck Library - Public API

// Re-export error types
pub mod error;
pub use error::{Result, SysdeckError};

// Module declarations
pub mod commands;
pub mod core;
pub mod ui;

// Re-export commonly used types
pub use core::config::Config;
pub use core::rate::{ByteRates, CounterPair, RateCalculator, RateClock};
pub use core::sampler::{
    CancelToken, Collector, ErrorPolicy, Sampler, SamplerOptions, SamplerState, SnapshotReceiver,
    SnapshotSender, SnapshotSink,
};

// Initialize logging
pub fn init_logging(verbose: bool) {
    let level = if verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    // try_init: tests and embedders may already have installed a logger
    let _ = env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .try_init();
}
