//! Metrics for replica activity
//!
//! Counters are recorded through the `metrics` facade; without an installed
//! recorder every call is a no-op.

use metrics::{counter, describe_counter, describe_histogram, histogram};
use std::time::Instant;

/// Local `set`/`delete` calls applied to a shared replica
pub const LOCAL_WRITES: &str = "crdt.lww.local_writes";

/// Remote states absorbed by a shared replica
pub const MERGES: &str = "crdt.lww.merges";

/// Merge duration in milliseconds
pub const MERGE_DURATION_MS: &str = "crdt.lww.merge.duration_ms";

/// Describe every metric this crate emits
pub fn init_metrics() {
    describe_counter!(LOCAL_WRITES, "Number of local writes applied to a replica");
    describe_counter!(MERGES, "Number of remote states merged into a replica");
    describe_histogram!(MERGE_DURATION_MS, "Replica merge duration in milliseconds");
}

/// Record a counter metric
pub fn record_counter(name: &'static str, value: u64) {
    counter!(name).increment(value);
}

/// Timer for measuring operation duration
pub struct Timer {
    name: &'static str,
    start: Instant,
}

impl Timer {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            start: Instant::now(),
        }
    }

    /// Stop the timer and record the duration
    pub fn stop(self) {
        let duration = self.start.elapsed();
        histogram!(self.name).record(duration.as_secs_f64() * 1000.0);
    }
}
