// Core business logic module

pub mod config;
pub mod rate;
pub mod sampler;
pub mod system_monitor;

// Re-export commonly used items
pub use config::Config;
pub use rate::{ByteRates, CounterPair, RateCalculator, RateClock};
pub use sampler::{Collector, Sampler, SamplerOptions, SamplerState};
