pub mod affinity;
pub mod chain;
pub mod config;
pub mod error;
pub mod harness;
pub mod laps;
pub mod report;
pub mod sweep;
pub mod tracer;

pub use error::{ChaseError, Result};

/// Convert number of bytes to formatted string
pub fn format_size(bytes: usize) -> String {
    const GB: usize = 1024 * 1024 * 1024;
    const MB: usize = 1024 * 1024;
    const KB: usize = 1024;

    if bytes >= GB {
        format!("{:.2} GiB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MiB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KiB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}
