// UI and formatting module

pub mod formatters;
pub mod messages;
pub mod snapshot_views;

// Re-export commonly used items for cleaner imports
pub use formatters::{
    format_battery, format_memory_mb, format_percent, format_rate, format_size,
    speed_bar_percent,
};
pub use messages::{dimmed, error, info, success, warn};
