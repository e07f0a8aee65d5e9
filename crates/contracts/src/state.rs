//! Movement state labels and the ordered classification table.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A movement state label (e.g. `Still`, `Walk`, `Run`).
///
/// The label set is configuration; two states are equal when their labels are.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MovementState(String);

impl MovementState {
    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }

    pub fn label(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MovementState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for MovementState {
    fn from(label: &str) -> Self {
        Self::new(label)
    }
}

/// One row of the classification table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateBand {
    /// Upper bound of the band; `None` means unbounded
    #[serde(default)]
    pub upper: Option<f64>,

    /// Whether `upper` itself belongs to this band
    #[serde(default)]
    pub inclusive: bool,

    /// Label assigned to values in this band
    pub label: MovementState,
}

impl StateBand {
    /// Band matching values strictly below `bound`
    pub fn below(bound: f64, label: impl Into<String>) -> Self {
        Self {
            upper: Some(bound),
            inclusive: false,
            label: MovementState::new(label),
        }
    }

    /// Band matching values up to and including `bound`
    pub fn up_to(bound: f64, label: impl Into<String>) -> Self {
        Self {
            upper: Some(bound),
            inclusive: true,
            label: MovementState::new(label),
        }
    }

    /// Band matching every remaining value
    pub fn unbounded(label: impl Into<String>) -> Self {
        Self {
            upper: None,
            inclusive: false,
            label: MovementState::new(label),
        }
    }

    /// Whether `value` falls under this band's upper bound
    pub fn admits(&self, value: f64) -> bool {
        match self.upper {
            None => true,
            Some(bound) if self.inclusive => value <= bound,
            Some(bound) => value < bound,
        }
    }
}

/// Ordered classification table, evaluated in ascending bound order.
///
/// The first band is the rest state and the initial committed state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StateTable {
    bands: Vec<StateBand>,
}

impl StateTable {
    pub fn new(bands: Vec<StateBand>) -> Self {
        Self { bands }
    }

    pub fn bands(&self) -> &[StateBand] {
        &self.bands
    }

    /// Lowest label; `None` only for an empty table (rejected by validation)
    pub fn rest_state(&self) -> Option<&MovementState> {
        self.bands.first().map(|b| &b.label)
    }

    /// Three-state cadence table: Still < 30 <= Walk < 130 <= FastWalk.
    pub fn three_state_cadence() -> Self {
        Self::new(vec![
            StateBand::below(30.0, "Still"),
            StateBand::below(130.0, "Walk"),
            StateBand::unbounded("FastWalk"),
        ])
    }

    /// Six-state cadence table with an inclusive FastWalk ceiling at 140.
    pub fn six_state_cadence() -> Self {
        Self::new(vec![
            StateBand::below(20.0, "Still"),
            StateBand::below(45.0, "Transition"),
            StateBand::below(80.0, "Walk"),
            StateBand::below(115.0, "Transition"),
            StateBand::up_to(140.0, "FastWalk"),
            StateBand::unbounded("Run"),
        ])
    }

    /// Table over normalized activity in [0, 1].
    pub fn activity_levels() -> Self {
        Self::new(vec![
            StateBand::below(0.05, "Still"),
            StateBand::below(0.35, "Walk"),
            StateBand::up_to(1.0, "Run"),
        ])
    }
}

impl Default for StateTable {
    fn default() -> Self {
        Self::three_state_cadence()
    }
}
