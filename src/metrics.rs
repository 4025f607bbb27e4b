//! Fetch latency and success-rate metrics
//!
//! Every fetch records exactly one outcome when it terminates. Latency is
//! tracked for successful fetches only, over the last [`METRICS_WINDOW`] of
//! them; counts cover the service's whole lifetime.

use crate::constants::METRICS_WINDOW;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

/// Snapshot of fetch metrics
#[derive(Debug, Clone, PartialEq)]
pub struct FetchMetrics {
    /// Median latency of recent successful fetches in milliseconds
    pub latency_p50_ms: f64,
    /// 99th percentile latency of recent successful fetches in milliseconds
    pub latency_p99_ms: f64,
    /// Success rate (0.0 to 1.0)
    pub success_rate: f64,
    /// Total number of fetches recorded
    pub total_requests: u64,
    /// Number of failed fetches
    pub failed_requests: u64,
}

impl Default for FetchMetrics {
    fn default() -> Self {
        Self {
            latency_p50_ms: 0.0,
            latency_p99_ms: 0.0,
            success_rate: 1.0,
            total_requests: 0,
            failed_requests: 0,
        }
    }
}

#[derive(Default)]
struct Window {
    latencies: VecDeque<Duration>,
    total: u64,
    failed: u64,
}

/// Shared sink for fetch outcomes
#[derive(Default)]
pub struct MetricsCollector {
    window: Mutex<Window>,
}

impl MetricsCollector {
    pub fn new() -> Self {
        Self::default()
    }

    fn record(&self, latency: Duration, success: bool) {
        let mut window = self.window.lock().unwrap_or_else(PoisonError::into_inner);
        window.total += 1;

        if !success {
            window.failed += 1;
            return;
        }
        if window.latencies.len() == METRICS_WINDOW {
            window.latencies.pop_front();
        }
        window.latencies.push_back(latency);
    }

    pub fn snapshot(&self) -> FetchMetrics {
        let window = self.window.lock().unwrap_or_else(PoisonError::into_inner);
        if window.total == 0 {
            return FetchMetrics::default();
        }

        let mut sorted: Vec<Duration> = window.latencies.iter().copied().collect();
        sorted.sort_unstable();

        FetchMetrics {
            latency_p50_ms: nearest_rank_ms(&sorted, 50),
            latency_p99_ms: nearest_rank_ms(&sorted, 99),
            success_rate: (window.total - window.failed) as f64 / window.total as f64,
            total_requests: window.total,
            failed_requests: window.failed,
        }
    }
}

/// Nearest-rank percentile of ascending latencies, in milliseconds
fn nearest_rank_ms(sorted: &[Duration], pct: usize) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let rank = (pct * sorted.len()).div_ceil(100).clamp(1, sorted.len());
    sorted[rank - 1].as_micros() as f64 / 1000.0
}

/// Times one fetch and records its outcome when dropped
///
/// A timer dropped without [`succeed`](Self::succeed) counts as a failure,
/// so a fetch that unwinds still lands in the totals.
pub struct FetchTimer {
    started: Instant,
    sink: Arc<MetricsCollector>,
    success: bool,
}

impl FetchTimer {
    pub fn start(sink: Arc<MetricsCollector>) -> Self {
        Self {
            started: Instant::now(),
            sink,
            success: false,
        }
    }

    pub fn succeed(&mut self) {
        self.success = true;
    }

    /// Milliseconds since the fetch started, saturating at `u64::MAX`
    pub fn elapsed_ms(&self) -> u64 {
        millis(self.started.elapsed())
    }
}

impl Drop for FetchTimer {
    fn drop(&mut self) {
        self.sink.record(self.started.elapsed(), self.success);
    }
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
