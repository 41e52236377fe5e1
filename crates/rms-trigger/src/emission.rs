// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Building RMS output readings.
//!
//! On every trigger the builder drains the accumulator store and turns each
//! signal summary into datapoints on an output reading. Signals whose
//! template resolves to the same output asset share one reading:
//!
//! ```text
//! Motor1/x, Motor1/y, Pump1/flow  --"%a RMS"-->  "Motor1 RMS" {x, y}
//!                                                "Pump1 RMS"  {flow}
//! ```

use crate::accumulator::AccumulatorStore;
use crate::config::FilterConfig;
use crate::reading::{Datapoint, DatapointValue, Reading};
use crate::transform::AssetNameTemplate;
use chrono::{DateTime, Utc};
use std::collections::hash_map::Entry;
use std::collections::HashMap;

/// Suffix of the peak-to-peak datapoint name.
pub const PEAK_SUFFIX: &str = "peak";

/// Monotonic sample number. Never reset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SampleCounter {
    next: u64,
}

impl SampleCounter {
    /// Value the next output reading will carry.
    pub fn current(&self) -> u64 {
        self.next
    }

    /// Take the current value and move on.
    pub fn advance(&mut self) -> u64 {
        let value = self.next;
        self.next += 1;
        value
    }

    /// Current value as a datapoint value.
    pub fn value(&self) -> DatapointValue {
        DatapointValue::Integer(self.next as i64)
    }
}

/// Output shaping options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmissionOptions {
    /// Output asset name template.
    pub template: AssetNameTemplate,
    /// Add a `<datapoint>peak` datapoint with the peak-to-peak range.
    pub include_peak: bool,
    /// Sample number datapoint name, when sample numbering is on.
    pub sample_name: Option<String>,
}

impl EmissionOptions {
    /// Extract the output options from a filter configuration.
    pub fn from_config(config: &FilterConfig) -> Self {
        Self {
            template: AssetNameTemplate::new(config.asset_name.clone()),
            include_peak: config.peak,
            sample_name: config.add_sample_no.then(|| config.sample_name.clone()),
        }
    }
}

impl Default for EmissionOptions {
    fn default() -> Self {
        Self::from_config(&FilterConfig::default())
    }
}

/// Turns accumulator state into output readings.
#[derive(Debug, Clone, Default)]
pub struct EmissionBuilder {
    options: EmissionOptions,
    counter: SampleCounter,
}

impl EmissionBuilder {
    /// Create a builder with a fresh sample counter.
    pub fn new(options: EmissionOptions) -> Self {
        Self {
            options,
            counter: SampleCounter::default(),
        }
    }

    /// Replace the output options. The sample counter carries on.
    pub fn set_options(&mut self, options: EmissionOptions) {
        self.options = options;
    }

    /// Sample counter state.
    pub fn counter(&self) -> SampleCounter {
        self.counter
    }

    /// Datapoint carrying the current sample number, if numbering is on.
    pub fn sample_datapoint(&self) -> Option<Datapoint> {
        self.options
            .sample_name
            .as_ref()
            .map(|name| Datapoint::new(name.clone(), self.counter.value()))
    }

    /// Drain the store into output readings.
    ///
    /// Readings are returned in creation order. Each new reading takes the
    /// next sample number when numbering is on; signals appended to an
    /// existing reading do not.
    pub fn emit(
        &mut self,
        store: &mut AccumulatorStore,
        timestamp: Option<DateTime<Utc>>,
    ) -> Vec<Reading> {
        let mut readings: Vec<Reading> = Vec::new();
        let mut by_asset: HashMap<String, usize> = HashMap::new();

        for summary in store.drain_and_reset() {
            let asset = self.options.template.resolve(&summary.key.asset_name);

            let (slot, created) = match by_asset.entry(asset) {
                Entry::Occupied(e) => (*e.get(), false),
                Entry::Vacant(e) => {
                    let slot = readings.len();
                    readings.push(Reading {
                        asset_name: e.key().clone(),
                        timestamp,
                        datapoints: Vec::new(),
                    });
                    e.insert(slot);
                    (slot, true)
                }
            };

            let reading = &mut readings[slot];
            let name = &summary.key.datapoint_name;
            reading.add_datapoint(Datapoint::new(name.clone(), summary.rms));

            if self.options.include_peak {
                reading.add_datapoint(Datapoint::new(
                    format!("{}{}", name, PEAK_SUFFIX),
                    summary.peak_to_peak,
                ));
            }

            if created {
                if let Some(ref sample_name) = self.options.sample_name {
                    let sample_no = self.counter.advance();
                    reading.add_datapoint(Datapoint::new(
                        sample_name.clone(),
                        DatapointValue::Integer(sample_no as i64),
                    ));
                }
            }
        }

        tracing::debug!(
            "Emitted {} RMS reading(s), next sample {}",
            readings.len(),
            self.counter.current()
        );

        readings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn builder(config: &FilterConfig) -> EmissionBuilder {
        EmissionBuilder::new(EmissionOptions::from_config(config))
    }

    fn observe(store: &mut AccumulatorStore, asset: &str, dp: &str, values: &[f64]) {
        for v in values {
            store.observe(asset, dp, *v);
        }
    }

    fn names(reading: &Reading) -> Vec<&str> {
        reading.datapoints.iter().map(|dp| dp.name.as_str()).collect()
    }

    #[test]
    fn test_emit_groups_by_output_asset() {
        let mut store = AccumulatorStore::new();
        observe(&mut store, "Motor1", "x", &[3.0, 4.0]);
        observe(&mut store, "Pump1", "flow", &[2.0]);
        observe(&mut store, "Motor1", "y", &[1.0]);

        let mut emitter = builder(&FilterConfig::default());
        let out = emitter.emit(&mut store, None);

        assert_eq!(out.len(), 2);
        assert_eq!(out[0].asset_name, "Motor1 RMS");
        assert_eq!(names(&out[0]), vec!["x", "y"]);
        assert_eq!(out[0].value("x"), Some((12.5f64).sqrt()));
        assert_eq!(out[1].asset_name, "Pump1 RMS");
        assert_eq!(out[1].value("flow"), Some(2.0));
    }

    #[test]
    fn test_emit_untemplated_name_collapses() {
        let mut store = AccumulatorStore::new();
        observe(&mut store, "Motor1", "x", &[1.0]);
        observe(&mut store, "Pump1", "flow", &[2.0]);

        let mut emitter = builder(&FilterConfig::default().asset_name("plant"));
        let out = emitter.emit(&mut store, None);

        assert_eq!(out.len(), 1);
        assert_eq!(out[0].asset_name, "plant");
        assert_eq!(names(&out[0]), vec!["x", "flow"]);
    }

    #[test]
    fn test_emit_peak_datapoints() {
        let mut store = AccumulatorStore::new();
        observe(&mut store, "Motor1", "x", &[-2.0, 6.0]);

        let mut emitter = builder(&FilterConfig::default().peak(true));
        let out = emitter.emit(&mut store, None);

        assert_eq!(names(&out[0]), vec!["x", "xpeak"]);
        assert_eq!(out[0].value("xpeak"), Some(8.0));
    }

    #[test]
    fn test_sample_number_once_per_reading() {
        let mut store = AccumulatorStore::new();
        observe(&mut store, "Motor1", "x", &[1.0]);
        observe(&mut store, "Motor1", "y", &[1.0]);
        observe(&mut store, "Motor1", "z", &[1.0]);
        observe(&mut store, "Pump1", "flow", &[1.0]);

        let mut emitter = builder(
            &FilterConfig::default()
                .peak(true)
                .sample_numbering("partNo"),
        );
        let out = emitter.emit(&mut store, None);

        assert_eq!(
            names(&out[0]),
            vec!["x", "xpeak", "partNo", "y", "ypeak", "z", "zpeak"]
        );
        assert_eq!(out[0].value("partNo"), Some(0.0));
        assert_eq!(out[1].value("partNo"), Some(1.0));
        assert_eq!(emitter.counter().current(), 2);

        observe(&mut store, "Motor1", "x", &[1.0]);
        let out = emitter.emit(&mut store, None);
        assert_eq!(out[0].value("partNo"), Some(2.0));
    }

    #[test]
    fn test_empty_drain_emits_nothing() {
        let mut store = AccumulatorStore::new();
        let mut emitter = builder(&FilterConfig::default().sample_numbering("partNo"));

        assert!(emitter.emit(&mut store, None).is_empty());
        assert_eq!(emitter.counter().current(), 0);

        observe(&mut store, "Motor1", "x", &[1.0]);
        emitter.emit(&mut store, None);
        assert!(emitter.emit(&mut store, None).is_empty());
        assert_eq!(emitter.counter().current(), 1);
    }

    #[test]
    fn test_emit_copies_timestamp() {
        let ts = "2026-05-04T10:00:00Z".parse::<DateTime<Utc>>().expect("ts");
        let mut store = AccumulatorStore::new();
        observe(&mut store, "Motor1", "x", &[1.0]);

        let out = builder(&FilterConfig::default()).emit(&mut store, Some(ts));
        assert_eq!(out[0].timestamp, Some(ts));
    }

    #[test]
    fn test_set_options_keeps_counter() {
        let mut store = AccumulatorStore::new();
        let mut emitter = builder(&FilterConfig::default().sample_numbering("partNo"));
        observe(&mut store, "Motor1", "x", &[1.0]);
        emitter.emit(&mut store, None);

        emitter.set_options(EmissionOptions::from_config(
            &FilterConfig::default().sample_numbering("cycle"),
        ));
        observe(&mut store, "Motor1", "x", &[1.0]);
        let out = emitter.emit(&mut store, None);
        assert_eq!(out[0].value("cycle"), Some(1.0));
        assert_eq!(
            emitter.sample_datapoint(),
            Some(Datapoint::new("cycle", 2i64))
        );
    }
}
