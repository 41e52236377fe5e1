// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Edge detection on the trigger datapoint.
//!
//! The detector sees only the values of the designated trigger signal. Each
//! call updates the detector state, whether or not it fires, and fires at
//! most once.
//!
//! | Mode | Rising fires when | Falling fires when |
//! |---|---|---|
//! | zero crossing | previous < 0 and value >= 0 | previous >= 0 and value <= 0 |
//! | rapid edge | value - previous > 1000 | previous - value > 1000 |
//! | peak (reversal) | not decreasing and value < previous | decreasing and value > previous |

use crate::config::{TriggerEdge, TriggerType};

/// Minimum jump between consecutive samples for a rapid edge.
pub const RAPID_EDGE_THRESHOLD: f64 = 1000.0;

/// Mutable detector state, one shape per trigger mode.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TriggerState {
    ZeroCrossing { was_negative: bool },
    RapidEdge { last_value: f64 },
    Reversal { was_decreasing: bool, last_value: f64 },
}

impl TriggerState {
    /// Initial state for a trigger mode.
    pub fn for_type(trigger_type: TriggerType) -> Self {
        match trigger_type {
            TriggerType::ZeroCrossing => Self::ZeroCrossing {
                was_negative: false,
            },
            TriggerType::RapidEdge => Self::RapidEdge { last_value: 0.0 },
            TriggerType::Peak => Self::Reversal {
                was_decreasing: false,
                last_value: 0.0,
            },
        }
    }

    /// Check if this state belongs to the given trigger mode.
    pub fn is_type(&self, trigger_type: TriggerType) -> bool {
        matches!(
            (self, trigger_type),
            (Self::ZeroCrossing { .. }, TriggerType::ZeroCrossing)
                | (Self::RapidEdge { .. }, TriggerType::RapidEdge)
                | (Self::Reversal { .. }, TriggerType::Peak)
        )
    }
}

/// Stateful edge detector.
#[derive(Debug, Clone)]
pub struct TriggerDetector {
    edge: TriggerEdge,
    state: TriggerState,
}

impl TriggerDetector {
    /// Create a detector in its initial state.
    pub fn new(trigger_type: TriggerType, edge: TriggerEdge) -> Self {
        Self {
            edge,
            state: TriggerState::for_type(trigger_type),
        }
    }

    /// Feed one trigger sample. Returns true if the trigger fires.
    pub fn observe(&mut self, value: f64) -> bool {
        let rising = self.edge == TriggerEdge::Rising;

        match &mut self.state {
            TriggerState::ZeroCrossing { was_negative } => {
                let fired = if rising {
                    *was_negative && value >= 0.0
                } else {
                    !*was_negative && value <= 0.0
                };
                *was_negative = value < 0.0;
                fired
            }
            TriggerState::RapidEdge { last_value } => {
                let fired = if rising {
                    value - *last_value > RAPID_EDGE_THRESHOLD
                } else {
                    *last_value - value > RAPID_EDGE_THRESHOLD
                };
                *last_value = value;
                fired
            }
            TriggerState::Reversal {
                was_decreasing,
                last_value,
            } => {
                let fired = if rising {
                    !*was_decreasing && value < *last_value
                } else {
                    *was_decreasing && value > *last_value
                };
                *was_decreasing = value < *last_value;
                *last_value = value;
                fired
            }
        }
    }

    /// Apply a new mode and edge.
    ///
    /// The current state is kept if the mode is unchanged; otherwise the
    /// detector restarts from the new mode's initial state.
    pub fn reconfigure(&mut self, trigger_type: TriggerType, edge: TriggerEdge) {
        if !self.state.is_type(trigger_type) {
            self.state = TriggerState::for_type(trigger_type);
        }
        self.edge = edge;
    }

    /// Current edge polarity.
    pub fn edge(&self) -> TriggerEdge {
        self.edge
    }

    /// Current state.
    pub fn state(&self) -> &TriggerState {
        &self.state
    }
}
