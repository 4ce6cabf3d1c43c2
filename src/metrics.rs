use serde::Serialize;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;

use crate::discovery::DiscoverySummary;

/// Counters from the startup discovery pass, plus served requests.
#[derive(Clone)]
pub struct Metrics {
    pub candidates: Arc<AtomicUsize>,
    pub modules_loaded: Arc<AtomicUsize>,
    pub modules_failed: Arc<AtomicUsize>,
    pub routes_registered: Arc<AtomicUsize>,
    pub requests_total: Arc<AtomicUsize>,
    pub start_time: Instant,
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            candidates: Arc::new(AtomicUsize::new(0)),
            modules_loaded: Arc::new(AtomicUsize::new(0)),
            modules_failed: Arc::new(AtomicUsize::new(0)),
            routes_registered: Arc::new(AtomicUsize::new(0)),
            requests_total: Arc::new(AtomicUsize::new(0)),
            start_time: Instant::now(),
        }
    }

    pub fn record_discovery(&self, summary: &DiscoverySummary) {
        self.candidates.store(summary.candidates, Ordering::Relaxed);
        self.modules_loaded.store(summary.loaded, Ordering::Relaxed);
        self.modules_failed.store(summary.failed, Ordering::Relaxed);
        self.routes_registered.store(summary.routes, Ordering::Relaxed);
    }

    pub fn inc_requests(&self) {
        self.requests_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn get_snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            candidates: self.candidates.load(Ordering::Relaxed),
            modules_loaded: self.modules_loaded.load(Ordering::Relaxed),
            modules_failed: self.modules_failed.load(Ordering::Relaxed),
            routes_registered: self.routes_registered.load(Ordering::Relaxed),
            requests_total: self.requests_total.load(Ordering::Relaxed),
            uptime_seconds: self.start_time.elapsed().as_secs(),
        }
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Serialize)]
pub struct MetricsSnapshot {
    pub candidates: usize,
    pub modules_loaded: usize,
    pub modules_failed: usize,
    pub routes_registered: usize,
    pub requests_total: usize,
    pub uptime_seconds: u64,
}
