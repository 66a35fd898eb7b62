//! Metrics instrumentation for mesos-records.
//!
//! All metrics are prefixed with `mesos_records.`

use metrics::{counter, gauge, histogram};
use std::time::Instant;

/// Record a generation pass.
pub fn record_generation(result: GenerationResult, duration: std::time::Duration) {
    let result_str = match result {
        GenerationResult::Success => "success",
        GenerationResult::Failure => "failure",
    };

    counter!("mesos_records.generation.count", "result" => result_str).increment(1);
    histogram!("mesos_records.generation.duration.seconds", "result" => result_str)
        .record(duration.as_secs_f64());
}

/// Generation result type for metrics.
#[derive(Debug, Clone, Copy)]
pub enum GenerationResult {
    /// A snapshot was generated.
    Success,
    /// Generation aborted; the previous snapshot stays published.
    Failure,
}

/// Record the size of the published snapshot.
pub fn record_snapshot_counts(a: usize, aaaa: usize, srv: usize) {
    gauge!("mesos_records.snapshot.names", "type" => "A").set(a as f64);
    gauge!("mesos_records.snapshot.names", "type" => "AAAA").set(aaaa as f64);
    gauge!("mesos_records.snapshot.names", "type" => "SRV").set(srv as f64);
}

/// Record enumerated frameworks and tasks.
pub fn record_enumeration_counts(frameworks: usize, tasks: usize) {
    gauge!("mesos_records.snapshot.frameworks").set(frameworks as f64);
    gauge!("mesos_records.snapshot.tasks").set(tasks as f64);
}

/// Record recoverable problems met while generating the snapshot.
pub fn record_diagnostics(warnings: usize, errors: usize) {
    gauge!("mesos_records.snapshot.diagnostics", "severity" => "warning").set(warnings as f64);
    gauge!("mesos_records.snapshot.diagnostics", "severity" => "error").set(errors as f64);
}

/// Record the snapshot serial number.
pub fn record_serial(serial: u32) {
    gauge!("mesos_records.snapshot.serial").set(serial as f64);
}

/// Helper for timing operations.
pub struct Timer {
    start: Instant,
}

impl Timer {
    /// Start a new timer.
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Get elapsed duration since timer start.
    pub fn elapsed(&self) -> std::time::Duration {
        self.start.elapsed()
    }
}
