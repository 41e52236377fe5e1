// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Readings and datapoints.
//!
//! A [`Reading`] is one timestamped observation of an asset, carrying an
//! ordered list of named [`Datapoint`]s. Only integer and float datapoints
//! take part in RMS accumulation; anything else is carried through as an
//! opaque JSON value.
//!
//! ```text
//! {"asset": "Motor1", "timestamp": "2026-01-01T00:00:00Z",
//!  "datapoints": [{"name": "x", "value": 0.25}, {"name": "state", "value": "run"}]}
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Value held by a datapoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DatapointValue {
    /// Integer value.
    Integer(i64),
    /// Floating-point value. Non-finite values travel as `"inf"`, `"-inf"`
    /// and `"NaN"`.
    Float(#[serde(with = "float_serde")] f64),
    /// Any other value (string, array, object, ...). Ignored by the filter.
    Other(serde_json::Value),
}

impl DatapointValue {
    /// Numeric value, if this datapoint is an integer or a float.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Integer(i) => Some(*i as f64),
            Self::Float(f) => Some(*f),
            Self::Other(_) => None,
        }
    }
}

impl From<i64> for DatapointValue {
    fn from(v: i64) -> Self {
        Self::Integer(v)
    }
}

impl From<f64> for DatapointValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<&str> for DatapointValue {
    fn from(v: &str) -> Self {
        Self::Other(serde_json::Value::String(v.to_string()))
    }
}

mod float_serde {
    use serde::de::{self, Unexpected};
    use serde::{Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum FloatRepr {
        Number(f64),
        Text(String),
    }

    pub fn serialize<S>(value: &f64, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        if value.is_nan() {
            serializer.serialize_str("NaN")
        } else if value.is_infinite() {
            serializer.serialize_str(if *value > 0.0 { "inf" } else { "-inf" })
        } else {
            serializer.serialize_f64(*value)
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<f64, D::Error>
    where
        D: Deserializer<'de>,
    {
        match FloatRepr::deserialize(deserializer)? {
            FloatRepr::Number(v) => Ok(v),
            FloatRepr::Text(s) => match s.as_str() {
                "inf" => Ok(f64::INFINITY),
                "-inf" => Ok(f64::NEG_INFINITY),
                "NaN" => Ok(f64::NAN),
                other => Err(de::Error::invalid_value(
                    Unexpected::Str(other),
                    &"a number, \"inf\", \"-inf\" or \"NaN\"",
                )),
            },
        }
    }
}

/// Named value inside a reading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Datapoint {
    pub name: String,
    pub value: DatapointValue,
}

impl Datapoint {
    /// Create a new datapoint.
    pub fn new(name: impl Into<String>, value: impl Into<DatapointValue>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// One observation of an asset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    /// Asset name.
    #[serde(rename = "asset")]
    pub asset_name: String,

    /// Observation time, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,

    /// Datapoints in insertion order.
    #[serde(default)]
    pub datapoints: Vec<Datapoint>,
}

impl Reading {
    /// Create a reading without a timestamp.
    pub fn new(asset_name: impl Into<String>, datapoints: Vec<Datapoint>) -> Self {
        Self {
            asset_name: asset_name.into(),
            timestamp: None,
            datapoints,
        }
    }

    /// Set the observation time.
    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// Append a datapoint.
    pub fn add_datapoint(&mut self, datapoint: Datapoint) {
        self.datapoints.push(datapoint);
    }

    /// Find the first datapoint with the given name.
    pub fn datapoint(&self, name: &str) -> Option<&Datapoint> {
        self.datapoints.iter().find(|dp| dp.name == name)
    }

    /// Numeric value of the first datapoint with the given name.
    pub fn value(&self, name: &str) -> Option<f64> {
        self.datapoint(name).and_then(|dp| dp.value.as_f64())
    }
}
