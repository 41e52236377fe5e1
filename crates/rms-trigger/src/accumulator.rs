// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Per-signal running statistics.
//!
//! Every (asset, datapoint) pair seen by the filter gets an [`Accumulator`]
//! holding the sum of squares and sample count since the last emission, plus
//! the lifetime peaks. Draining the store yields one [`SignalSummary`] per
//! signal that received samples and resets the sums; peaks are kept.

use std::collections::HashMap;

/// Identity of a tracked numeric signal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SignalKey {
    pub asset_name: String,
    pub datapoint_name: String,
}

impl SignalKey {
    /// Create a new key.
    pub fn new(asset_name: impl Into<String>, datapoint_name: impl Into<String>) -> Self {
        Self {
            asset_name: asset_name.into(),
            datapoint_name: datapoint_name.into(),
        }
    }
}

impl std::fmt::Display for SignalKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.asset_name, self.datapoint_name)
    }
}

/// Running statistics for one signal.
#[derive(Debug, Clone, PartialEq)]
pub struct Accumulator {
    /// Sum of squared samples since the last emission.
    pub sum_of_squares: f64,
    /// Samples since the last emission.
    pub count: u64,
    /// Largest sample ever observed.
    pub peak_max: f64,
    /// Smallest sample ever observed.
    pub peak_min: f64,
}

impl Accumulator {
    fn new(first: f64) -> Self {
        Self {
            sum_of_squares: 0.0,
            count: 0,
            peak_max: first,
            peak_min: first,
        }
    }

    fn add(&mut self, value: f64) {
        self.sum_of_squares += value * value;
        self.count += 1;
        // Strict comparisons: a NaN sample never replaces a peak.
        if self.peak_max < value {
            self.peak_max = value;
        }
        if self.peak_min > value {
            self.peak_min = value;
        }
    }

    /// Root mean square of the samples since the last emission.
    pub fn rms(&self) -> Option<f64> {
        if self.count == 0 {
            return None;
        }
        Some((self.sum_of_squares / self.count as f64).sqrt())
    }

    /// Lifetime peak-to-peak range.
    pub fn peak_to_peak(&self) -> f64 {
        self.peak_max - self.peak_min
    }

    fn reset(&mut self) {
        self.sum_of_squares = 0.0;
        self.count = 0;
    }
}

/// Result of draining one signal.
#[derive(Debug, Clone, PartialEq)]
pub struct SignalSummary {
    pub key: SignalKey,
    pub rms: f64,
    pub peak_to_peak: f64,
}

/// Store of accumulators, iterated in first-seen order.
///
/// The index is keyed asset first, datapoint second, so lookups borrow the
/// incoming names and only a new signal allocates.
#[derive(Debug, Default)]
pub struct AccumulatorStore {
    index: HashMap<String, HashMap<String, usize>>,
    entries: Vec<(SignalKey, Accumulator)>,
}

impl AccumulatorStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a sample for a signal, creating its accumulator on first sight.
    pub fn observe(&mut self, asset: &str, datapoint: &str, value: f64) {
        let slot = match self.slot(asset, datapoint) {
            Some(slot) => slot,
            None => {
                let slot = self.entries.len();
                let key = SignalKey::new(asset, datapoint);
                self.entries.push((key, Accumulator::new(value)));
                self.index
                    .entry(asset.to_string())
                    .or_default()
                    .insert(datapoint.to_string(), slot);
                slot
            }
        };
        self.entries[slot].1.add(value);
    }

    fn slot(&self, asset: &str, datapoint: &str) -> Option<usize> {
        self.index
            .get(asset)
            .and_then(|datapoints| datapoints.get(datapoint))
            .copied()
    }

    /// Summarise every signal that received samples and reset its sums.
    ///
    /// Signals without samples since the last drain are skipped. Peaks are
    /// left untouched.
    pub fn drain_and_reset(&mut self) -> Vec<SignalSummary> {
        let mut summaries = Vec::new();
        for (key, acc) in &mut self.entries {
            if let Some(rms) = acc.rms() {
                summaries.push(SignalSummary {
                    key: key.clone(),
                    rms,
                    peak_to_peak: acc.peak_to_peak(),
                });
                acc.reset();
            }
        }
        summaries
    }

    /// Get the accumulator for a signal.
    pub fn get(&self, key: &SignalKey) -> Option<&Accumulator> {
        self.slot(&key.asset_name, &key.datapoint_name)
            .map(|slot| &self.entries[slot].1)
    }

    /// Number of tracked signals.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if no signal has been seen yet.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of signals with samples pending emission.
    pub fn pending(&self) -> usize {
        self.entries.iter().filter(|(_, acc)| acc.count > 0).count()
    }
}
