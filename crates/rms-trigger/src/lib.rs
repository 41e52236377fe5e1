// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Triggered RMS filter
//!
//! Accumulates per-signal running statistics over a stream of sensor
//! readings and emits RMS (and optionally peak-to-peak) readings each time a
//! designated trigger signal crosses its configured edge.
//!
//! # Features
//!
//! - **RMS accumulation**: Sum of squares and sample count per (asset, datapoint)
//! - **Edge triggers**: Zero crossing, peak (direction reversal) or rapid edge, rising or falling
//! - **Output naming**: `%a` templates, with grouping of signals per output asset
//! - **Sample numbering**: Monotonic part/cycle numbers on emitted and raw readings
//! - **Asset filtering**: Regular expression selection of the assets to process
//!
//! # Quick Start
//!
//! ```rust
//! use rms_trigger::{Datapoint, FilterConfig, Reading, RmsFilter};
//!
//! let config = FilterConfig::default().trigger("Spindle", "angle");
//! let mut filter = RmsFilter::new(config).expect("valid config");
//!
//! let out = filter.process(vec![
//!     Reading::new("Spindle", vec![Datapoint::new("angle", -1.0), Datapoint::new("x", 3.0)]),
//!     Reading::new("Spindle", vec![Datapoint::new("angle", 1.0), Datapoint::new("x", 4.0)]),
//! ]);
//!
//! assert_eq!(out.len(), 1);
//! assert_eq!(out[0].asset_name, "Spindle RMS");
//! ```
//!
//! # Configuration File
//!
//! ```toml
//! triggerAsset = "Spindle"
//! triggerDatapoint = "angle"
//! triggerType = "zero crossing"   # or "peak", "rapid edge"
//! triggerEdge = "rising"          # or "falling"
//! assetName = "%a RMS"
//! peak = true
//! rawData = false
//! match = "Spindle|Motor.*"
//! addSampleNo = true
//! sampleName = "partNo"
//! ```

pub mod accumulator;
pub mod config;
pub mod emission;
pub mod filter;
pub mod matcher;
pub mod reading;
pub mod stats;
pub mod transform;
pub mod trigger;

pub use accumulator::{Accumulator, AccumulatorStore, SignalKey, SignalSummary};
pub use config::{ConfigError, FilterConfig, TriggerEdge, TriggerType};
pub use emission::{EmissionBuilder, EmissionOptions, SampleCounter};
pub use filter::{FilterError, RmsFilter};
pub use matcher::AssetMatcher;
pub use reading::{Datapoint, DatapointValue, Reading};
pub use stats::{FilterStats, FilterStatsSnapshot};
pub use transform::AssetNameTemplate;
pub use trigger::{TriggerDetector, TriggerState};
