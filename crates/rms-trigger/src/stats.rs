// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Filter statistics.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

/// Counters updated by the filter while it processes batches.
///
/// Shared behind an `Arc`, so a host can read them from another thread.
#[derive(Debug)]
pub struct FilterStats {
    /// Batches processed.
    pub batches: AtomicU64,

    /// Readings received.
    pub readings_in: AtomicU64,

    /// Readings forwarded unchanged (rejected by the asset filter or filter disabled).
    pub passed_through: AtomicU64,

    /// Readings whose numeric datapoints were accumulated.
    pub accumulated: AtomicU64,

    /// Numeric datapoint samples accumulated.
    pub samples: AtomicU64,

    /// Accumulated readings forwarded as raw data.
    pub raw_forwarded: AtomicU64,

    /// Accumulated readings consumed.
    pub raw_discarded: AtomicU64,

    /// Trigger events.
    pub triggers: AtomicU64,

    /// RMS readings emitted.
    pub emitted: AtomicU64,

    /// Stats creation time.
    pub created: Instant,
}

impl FilterStats {
    /// Create new stats.
    pub fn new() -> Self {
        Self {
            batches: AtomicU64::new(0),
            readings_in: AtomicU64::new(0),
            passed_through: AtomicU64::new(0),
            accumulated: AtomicU64::new(0),
            samples: AtomicU64::new(0),
            raw_forwarded: AtomicU64::new(0),
            raw_discarded: AtomicU64::new(0),
            triggers: AtomicU64::new(0),
            emitted: AtomicU64::new(0),
            created: Instant::now(),
        }
    }

    pub(crate) fn add(counter: &AtomicU64, n: u64) {
        counter.fetch_add(n, Ordering::Relaxed);
    }

    /// Get snapshot of current stats.
    pub fn snapshot(&self) -> FilterStatsSnapshot {
        FilterStatsSnapshot {
            batches: self.batches.load(Ordering::Relaxed),
            readings_in: self.readings_in.load(Ordering::Relaxed),
            passed_through: self.passed_through.load(Ordering::Relaxed),
            accumulated: self.accumulated.load(Ordering::Relaxed),
            samples: self.samples.load(Ordering::Relaxed),
            raw_forwarded: self.raw_forwarded.load(Ordering::Relaxed),
            raw_discarded: self.raw_discarded.load(Ordering::Relaxed),
            triggers: self.triggers.load(Ordering::Relaxed),
            emitted: self.emitted.load(Ordering::Relaxed),
            uptime_secs: self.created.elapsed().as_secs(),
        }
    }
}

impl Default for FilterStats {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot of filter statistics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterStatsSnapshot {
    pub batches: u64,
    pub readings_in: u64,
    pub passed_through: u64,
    pub accumulated: u64,
    pub samples: u64,
    pub raw_forwarded: u64,
    pub raw_discarded: u64,
    pub triggers: u64,
    pub emitted: u64,
    pub uptime_secs: u64,
}

impl FilterStatsSnapshot {
    /// Calculate readings received per second.
    pub fn readings_per_second(&self) -> f64 {
        if self.uptime_secs > 0 {
            self.readings_in as f64 / self.uptime_secs as f64
        } else {
            0.0
        }
    }

    /// Average samples per trigger window.
    pub fn samples_per_trigger(&self) -> f64 {
        if self.triggers > 0 {
            self.samples as f64 / self.triggers as f64
        } else {
            0.0
        }
    }
}
