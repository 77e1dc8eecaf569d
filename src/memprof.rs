//! Memory and timing profiling utilities
//!
//! - Memory: Reads RSS (Resident Set Size) from /proc/self/status
//! - Timing: Uses std::time::Instant
//!
//! Checkpoints are emitted at debug level (`RUST_LOG=urban_env_dashboard=debug`).

use std::fs;
use std::time::Instant;
use tracing::debug;

/// Current RSS in bytes, 0 where /proc is unavailable
pub fn get_rss_bytes() -> u64 {
    let Ok(status) = fs::read_to_string("/proc/self/status") else {
        return 0;
    };
    status
        .lines()
        .find(|line| line.starts_with("VmRSS:"))
        // Format: "VmRSS:    123456 kB"
        .and_then(|line| line.split_whitespace().nth(1))
        .and_then(|kb| kb.parse::<u64>().ok())
        .map(|kb| kb * 1024)
        .unwrap_or(0)
}

pub fn get_rss_mb() -> f64 {
    get_rss_bytes() as f64 / (1024.0 * 1024.0)
}

/// Log a memory checkpoint and return the RSS for later deltas
pub fn checkpoint(label: &str) -> f64 {
    let rss = get_rss_mb();
    debug!("MEMPROF [{:.2} MB]: {}", rss, label);
    rss
}

/// Log RSS with the change since `previous`
pub fn delta(label: &str, previous: f64) -> f64 {
    let current = get_rss_mb();
    debug!(
        "MEMPROF [{:.2} MB] (delta: {:+.2} MB): {}",
        current,
        current - previous,
        label
    );
    current
}

/// Log section and total elapsed time, returning a new section start
pub fn time_delta(label: &str, start: Instant, section_start: Instant) -> Instant {
    debug!(
        "TIMEPROF: {} [+{:.3}s, total: {:.3}s]",
        label,
        section_start.elapsed().as_secs_f64(),
        start.elapsed().as_secs_f64()
    );
    Instant::now()
}
