// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Core filter implementation.
//!
//! The [`RmsFilter`] drives one batch of readings at a time: it applies the
//! asset filter, accumulates numeric datapoints, feeds the trigger
//! datapoint to the detector and, when the detector fires, appends the RMS
//! readings built from everything accumulated so far.

use crate::accumulator::AccumulatorStore;
use crate::config::{ConfigError, FilterConfig};
use crate::emission::{EmissionBuilder, EmissionOptions, SampleCounter};
use crate::matcher::AssetMatcher;
use crate::reading::Reading;
use crate::stats::FilterStats;
use crate::trigger::TriggerDetector;
use std::collections::BTreeSet;
use std::sync::Arc;
use thiserror::Error;

/// Filter errors.
#[derive(Debug, Error)]
pub enum FilterError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Triggered RMS filter.
///
/// Processing is synchronous and takes `&mut self`; a host sharing one
/// filter between threads puts it behind a single `Mutex` covering both
/// [`ingest`](Self::ingest) and [`reconfigure`](Self::reconfigure).
#[derive(Debug)]
pub struct RmsFilter {
    config: FilterConfig,
    matcher: AssetMatcher,
    store: AccumulatorStore,
    detector: TriggerDetector,
    emitter: EmissionBuilder,
    tracked_assets: BTreeSet<String>,
    stats: Arc<FilterStats>,
}

impl RmsFilter {
    /// Create a new filter from configuration.
    pub fn new(config: FilterConfig) -> Result<Self, FilterError> {
        let matcher = config.asset_matcher()?;

        tracing::info!(
            "RMS filter created: trigger {}/{} ({}, {}), output '{}', match '{}'",
            config.trigger_asset,
            config.trigger_datapoint,
            config.trigger_type,
            config.trigger_edge,
            config.asset_name,
            matcher.pattern()
        );

        Ok(Self {
            matcher,
            store: AccumulatorStore::new(),
            detector: TriggerDetector::new(config.trigger_type, config.trigger_edge),
            emitter: EmissionBuilder::new(EmissionOptions::from_config(&config)),
            tracked_assets: BTreeSet::new(),
            stats: Arc::new(FilterStats::new()),
            config,
        })
    }

    /// Apply a new configuration between batches.
    ///
    /// Accumulators and the sample counter are kept. The trigger state is
    /// kept unless the trigger mode changes. On error the filter is left
    /// exactly as it was.
    pub fn reconfigure(&mut self, config: FilterConfig) -> Result<(), FilterError> {
        let matcher = config.asset_matcher()?;

        self.detector.reconfigure(config.trigger_type, config.trigger_edge);
        self.emitter.set_options(EmissionOptions::from_config(&config));
        self.matcher = matcher;
        self.config = config;

        tracing::info!(
            "RMS filter reconfigured: trigger {}/{} ({}, {}), {}",
            self.config.trigger_asset,
            self.config.trigger_datapoint,
            self.config.trigger_type,
            self.config.trigger_edge,
            if self.config.enable {
                "enabled"
            } else {
                "disabled"
            }
        );

        Ok(())
    }

    /// Get the filter configuration.
    pub fn config(&self) -> &FilterConfig {
        &self.config
    }

    /// Check if the filter processes batches.
    pub fn is_enabled(&self) -> bool {
        self.config.enable
    }

    /// Get a handle on the filter statistics.
    pub fn stats(&self) -> Arc<FilterStats> {
        self.stats.clone()
    }

    /// Get the accumulator store.
    pub fn store(&self) -> &AccumulatorStore {
        &self.store
    }

    /// Get the trigger detector.
    pub fn detector(&self) -> &TriggerDetector {
        &self.detector
    }

    /// Get the sample counter.
    pub fn sample_counter(&self) -> SampleCounter {
        self.emitter.counter()
    }

    /// Output asset names produced so far.
    pub fn tracked_assets(&self) -> &BTreeSet<String> {
        &self.tracked_assets
    }

    /// Check if a datapoint is the configured trigger.
    pub fn is_trigger(&self, asset: &str, datapoint: &str) -> bool {
        asset == self.config.trigger_asset && datapoint == self.config.trigger_datapoint
    }

    /// Process a batch of readings.
    ///
    /// Every reading is moved out of `input`: forwarded to `out`, or
    /// consumed. RMS readings are appended to `out` right after the reading
    /// that triggered them.
    pub fn ingest(&mut self, input: &mut Vec<Reading>, out: &mut Vec<Reading>) {
        FilterStats::add(&self.stats.batches, 1);
        FilterStats::add(&self.stats.readings_in, input.len() as u64);

        if !self.config.enable {
            FilterStats::add(&self.stats.passed_through, input.len() as u64);
            out.append(input);
            return;
        }

        for reading in input.drain(..) {
            self.process_reading(reading, out);
        }
    }

    /// Process a batch and return the output batch.
    pub fn process(&mut self, mut batch: Vec<Reading>) -> Vec<Reading> {
        let mut out = Vec::with_capacity(batch.len());
        self.ingest(&mut batch, &mut out);
        out
    }

    fn process_reading(&mut self, reading: Reading, out: &mut Vec<Reading>) {
        if !self.matcher.matches(&reading.asset_name) {
            FilterStats::add(&self.stats.passed_through, 1);
            self.forward(reading, out);
            return;
        }

        let mut triggered = false;

        for dp in &reading.datapoints {
            let Some(value) = dp.value.as_f64() else {
                continue;
            };

            self.store.observe(&reading.asset_name, &dp.name, value);
            FilterStats::add(&self.stats.samples, 1);
            tracing::trace!("Observed {}/{} = {}", reading.asset_name, dp.name, value);

            if self.is_trigger(&reading.asset_name, &dp.name) && self.detector.observe(value) {
                triggered = true;
            }
        }
        FilterStats::add(&self.stats.accumulated, 1);

        let timestamp = reading.timestamp;

        if self.config.raw_data {
            let mut reading = reading;
            if let Some(sample) = self.emitter.sample_datapoint() {
                reading.add_datapoint(sample);
            }
            FilterStats::add(&self.stats.raw_forwarded, 1);
            self.forward(reading, out);
        } else {
            FilterStats::add(&self.stats.raw_discarded, 1);
        }

        if triggered {
            FilterStats::add(&self.stats.triggers, 1);
            tracing::debug!(
                "Trigger fired on {}/{} ({} signal(s) pending)",
                self.config.trigger_asset,
                self.config.trigger_datapoint,
                self.store.pending()
            );

            let emitted = self.emitter.emit(&mut self.store, timestamp);
            FilterStats::add(&self.stats.emitted, emitted.len() as u64);
            for reading in emitted {
                self.forward(reading, out);
            }
        }
    }

    fn forward(&mut self, reading: Reading, out: &mut Vec<Reading>) {
        if !self.tracked_assets.contains(&reading.asset_name) {
            tracing::debug!("Tracking output asset '{}'", reading.asset_name);
            self.tracked_assets.insert(reading.asset_name.clone());
        }
        out.push(reading);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accumulator::SignalKey;
    use crate::config::{TriggerEdge, TriggerType};
    use crate::reading::Datapoint;

    fn reading(asset: &str, dps: &[(&str, f64)]) -> Reading {
        Reading::new(
            asset,
            dps.iter().map(|(n, v)| Datapoint::new(*n, *v)).collect(),
        )
    }

    fn zc_filter() -> RmsFilter {
        RmsFilter::new(FilterConfig::default().trigger("Motor1", "angle")).expect("create filter")
    }

    #[test]
    fn test_filter_creation() {
        let filter = zc_filter();
        assert!(filter.is_enabled());
        assert!(filter.is_trigger("Motor1", "angle"));
        assert!(!filter.is_trigger("Motor2", "angle"));
        assert!(filter.store().is_empty());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let err = RmsFilter::new(FilterConfig::default().asset_filter("(")).unwrap_err();
        assert!(matches!(err, FilterError::Config(ConfigError::InvalidPattern { .. })));
    }

    #[test]
    fn test_ingest_empties_input() {
        let mut filter = zc_filter();
        let mut input = vec![reading("Motor1", &[("x", 1.0)])];
        let mut out = Vec::new();

        filter.ingest(&mut input, &mut out);

        assert!(input.is_empty());
        assert!(out.is_empty());
        assert_eq!(filter.store().len(), 1);
    }

    #[test]
    fn test_trigger_emits_after_reading() {
        let mut filter = zc_filter();
        let out = filter.process(vec![
            reading("Motor1", &[("angle", -1.0), ("x", 3.0)]),
            reading("Motor1", &[("angle", 1.0), ("x", 4.0)]),
        ]);

        assert_eq!(out.len(), 1);
        assert_eq!(out[0].asset_name, "Motor1 RMS");
        assert_eq!(out[0].value("x"), Some((12.5f64).sqrt()));
        assert_eq!(out[0].value("angle"), Some(1.0));
    }

    #[test]
    fn test_trigger_on_other_asset_ignored() {
        let mut filter = zc_filter();
        let out = filter.process(vec![
            reading("Motor2", &[("angle", -1.0)]),
            reading("Motor2", &[("angle", 1.0)]),
        ]);
        assert!(out.is_empty());
        assert_eq!(filter.stats().snapshot().triggers, 0);
    }

    #[test]
    fn test_non_numeric_datapoints_ignored() {
        let mut filter = zc_filter();
        let mut r = reading("Motor1", &[("x", 2.0)]);
        r.add_datapoint(Datapoint::new("state", "running"));
        filter.process(vec![r]);

        assert_eq!(filter.store().len(), 1);
        assert!(filter.store().get(&SignalKey::new("Motor1", "state")).is_none());
    }

    #[test]
    fn test_integer_datapoints_accumulated() {
        let mut filter = zc_filter();
        filter.process(vec![Reading::new(
            "Motor1",
            vec![Datapoint::new("count", 4i64)],
        )]);

        let acc = filter
            .store()
            .get(&SignalKey::new("Motor1", "count"))
            .expect("accumulator");
        assert_eq!(acc.sum_of_squares, 16.0);
    }

    #[test]
    fn test_integer_trigger_datapoint_fires() {
        let mut filter = zc_filter();
        let out = filter.process(vec![
            Reading::new("Motor1", vec![Datapoint::new("angle", -3i64)]),
            Reading::new("Motor1", vec![Datapoint::new("angle", 4i64)]),
        ]);

        assert_eq!(out.len(), 1);
        assert_eq!(out[0].asset_name, "Motor1 RMS");
        assert_eq!(out[0].value("angle"), Some((12.5f64).sqrt()));
        assert_eq!(filter.stats().snapshot().triggers, 1);
    }

    #[test]
    fn test_multiple_fires_in_one_reading_emit_once() {
        // The same trigger datapoint twice in one reading.
        let mut filter = zc_filter();
        filter.process(vec![reading("Motor1", &[("angle", -1.0)])]);
        let out = filter.process(vec![reading(
            "Motor1",
            &[("angle", 1.0), ("angle", -1.0), ("angle", 1.0)],
        )]);

        assert_eq!(out.len(), 1);
        assert_eq!(filter.stats().snapshot().triggers, 1);
    }

    #[test]
    fn test_disabled_passes_through() {
        let mut filter =
            RmsFilter::new(FilterConfig::default().enable(false)).expect("create filter");
        let batch = vec![reading("Motor1", &[("x", 1.0)])];
        let out = filter.process(batch.clone());

        assert_eq!(out, batch);
        assert!(filter.store().is_empty());
        assert!(filter.tracked_assets().is_empty());
    }

    #[test]
    fn test_reconfigure_keeps_accumulators() {
        let mut filter = zc_filter();
        filter.process(vec![reading("Motor1", &[("angle", -1.0), ("x", 2.0)])]);

        filter
            .reconfigure(
                FilterConfig::default()
                    .trigger("Motor1", "angle")
                    .asset_name("%a vib"),
            )
            .expect("reconfigure");

        let out = filter.process(vec![reading("Motor1", &[("angle", 1.0), ("x", 2.0)])]);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].asset_name, "Motor1 vib");
        assert_eq!(out[0].value("x"), Some(2.0));
    }

    #[test]
    fn test_reconfigure_error_keeps_previous() {
        let mut filter = zc_filter();
        let err = filter.reconfigure(FilterConfig::default().asset_filter("["));
        assert!(err.is_err());
        assert_eq!(filter.config().trigger_asset, "Motor1");
    }

    #[test]
    fn test_reconfigure_mode_change_resets_detector() {
        let mut filter = zc_filter();
        filter.process(vec![reading("Motor1", &[("angle", -1.0)])]);

        filter
            .reconfigure(
                FilterConfig::default()
                    .trigger("Motor1", "angle")
                    .trigger_type(TriggerType::RapidEdge)
                    .trigger_edge(TriggerEdge::Rising),
            )
            .expect("reconfigure");

        let out = filter.process(vec![reading("Motor1", &[("angle", 1.0)])]);
        assert!(out.is_empty());
    }

    #[test]
    fn test_tracked_assets() {
        let mut filter = RmsFilter::new(
            FilterConfig::default()
                .trigger("Motor1", "angle")
                .asset_filter("Motor.*")
                .raw_data(true),
        )
        .expect("create filter");

        filter.process(vec![
            reading("Pump1", &[("flow", 1.0)]),
            reading("Motor1", &[("angle", -1.0)]),
            reading("Motor1", &[("angle", 1.0)]),
        ]);

        let assets: Vec<_> = filter.tracked_assets().iter().cloned().collect();
        assert_eq!(assets, vec!["Motor1", "Motor1 RMS", "Pump1"]);
    }

    #[test]
    fn test_stats() {
        let mut filter = RmsFilter::new(
            FilterConfig::default()
                .trigger("Motor1", "angle")
                .asset_filter("Motor.*"),
        )
        .expect("create filter");

        filter.process(vec![
            reading("Pump1", &[("flow", 1.0)]),
            reading("Motor1", &[("angle", -1.0), ("x", 1.0)]),
            reading("Motor1", &[("angle", 1.0), ("x", 1.0)]),
        ]);

        let s = filter.stats().snapshot();
        assert_eq!(s.batches, 1);
        assert_eq!(s.readings_in, 3);
        assert_eq!(s.passed_through, 1);
        assert_eq!(s.accumulated, 2);
        assert_eq!(s.samples, 4);
        assert_eq!(s.raw_discarded, 2);
        assert_eq!(s.triggers, 1);
        assert_eq!(s.emitted, 1);
    }
}
