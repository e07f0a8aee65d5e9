//! State classification with optional hysteresis.
//!
//! Classification maps a value to the first band whose upper bound admits it.
//! Commit then decides whether that candidate replaces the current state:
//!
//! ```text
//! Stable(current) --candidate != current--> Pending(candidate, since)
//! Pending(c, since) --same c, now - since >= stability, evidence ok--> Stable(c)
//! Pending(c, _)     --different candidate--> Pending(candidate, now)
//! Pending(_, _)     --candidate == current--> Stable(current)
//! ```

use contracts::{ClassifierConfig, HysteresisConfig, MovementState, StateTable, StateTransition};
use tracing::debug;

/// Candidate awaiting commit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingState {
    pub candidate: MovementState,
    pub since_ms: i64,
}

#[derive(Debug, Clone)]
pub struct StateClassifier {
    table: StateTable,
    hysteresis: Option<HysteresisConfig>,
    rest: MovementState,
    current: MovementState,
    pending: Option<PendingState>,
}

impl StateClassifier {
    pub fn new(config: &ClassifierConfig) -> Self {
        let rest = config
            .bands
            .rest_state()
            .cloned()
            .unwrap_or_else(|| MovementState::new("Still"));

        Self {
            table: config.bands.clone(),
            hysteresis: config.hysteresis.clone(),
            current: rest.clone(),
            rest,
            pending: None,
        }
    }

    /// Label for `value`.
    ///
    /// Non-finite values map to the rest state; values above every bound map
    /// to the topmost band.
    pub fn classify(&self, value: f64) -> MovementState {
        if !value.is_finite() {
            return self.rest.clone();
        }

        let bands = self.table.bands();
        bands
            .iter()
            .find(|band| band.admits(value))
            .or_else(|| bands.last())
            .map(|band| band.label.clone())
            .unwrap_or_else(|| self.rest.clone())
    }

    /// Feed one candidate; returns the transition if it committed.
    ///
    /// `evidence` is the size of the history behind the candidate and only
    /// matters for non-rest candidates under hysteresis.
    pub fn commit(
        &mut self,
        candidate: MovementState,
        now_ms: i64,
        evidence: usize,
    ) -> Option<StateTransition> {
        if candidate == self.current {
            self.pending = None;
            return None;
        }

        let Some((stability, min_evidence)) = self
            .hysteresis
            .as_ref()
            .map(|h| (stability_ms(h), h.min_evidence))
        else {
            return Some(self.adopt(candidate, now_ms));
        };

        match &self.pending {
            Some(pending) if pending.candidate == candidate => {
                let held_ms = now_ms.saturating_sub(pending.since_ms);
                let stable = held_ms >= stability;
                let supported = candidate == self.rest || evidence >= min_evidence;

                if stable && supported {
                    Some(self.adopt(candidate, now_ms))
                } else {
                    None
                }
            }
            _ => {
                self.pending = Some(PendingState {
                    candidate,
                    since_ms: now_ms,
                });
                None
            }
        }
    }

    fn adopt(&mut self, candidate: MovementState, now_ms: i64) -> StateTransition {
        self.pending = None;
        let from = std::mem::replace(&mut self.current, candidate.clone());
        debug!(from = %from, to = %candidate, at_ms = now_ms, "state committed");
        StateTransition {
            from,
            to: candidate,
            at_ms: now_ms,
        }
    }

    pub fn current(&self) -> &MovementState {
        &self.current
    }

    pub fn pending(&self) -> Option<&PendingState> {
        self.pending.as_ref()
    }

    pub fn rest_state(&self) -> &MovementState {
        &self.rest
    }

    pub fn table(&self) -> &StateTable {
        &self.table
    }
}

fn stability_ms(hysteresis: &HysteresisConfig) -> i64 {
    i64::try_from(hysteresis.stability_window_ms).unwrap_or(i64::MAX)
}
