// Command handlers module
pub mod config;
pub mod kill;
pub mod run;
pub mod sample;
pub mod watch;

// Re-exports for cleaner imports
pub use run::RunContext;
pub use watch::execute as watch;
