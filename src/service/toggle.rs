//! The station state machine.
//!
//! Every request is reduced to the end state the user wants, then [apply] moves a [StationState] there while keeping `stopped` ⇒ `passed`
//! and stamping first-achievement dates that are never cleared afterwards.

use crate::prelude::*;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Marks {
    pub passed: bool,
    pub stopped: bool,
}

impl Marks {
    pub fn of(state: &StationState) -> Self {
        Self {
            passed: state.passed,
            stopped: state.stopped,
        }
    }

    /// Settle `stopped` without `passed` by looking at which mark changed: unpassing clears both, stopping sets both.
    pub fn resolve(self, previous: Marks) -> Marks {
        if !self.stopped || self.passed {
            return self;
        }

        let stopped = !previous.passed;
        Marks {
            passed: stopped,
            stopped,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkKind {
    Passed,
    Stopped,
}

/// The body of a toggle request.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ToggleRequest {
    /// The marks the station should end up with.
    EndState {
        passed: bool,
        stopped: bool,
        /// When set, the toggle only goes through if the stored state was last updated at this instant.
        #[serde(default, rename = "expectedUpdatedAt")]
        expected_updated_at: Option<Timestamp>,
    },
    /// Checking or unchecking a single mark, as older clients send it.
    Delta {
        #[serde(rename = "type")]
        kind: MarkKind,
        #[serde(default)]
        checked: bool,
    },
}

impl ToggleRequest {
    /// The end state this request asks for, given the current marks.
    pub fn desired(&self, current: Marks) -> Marks {
        match *self {
            ToggleRequest::EndState {
                passed, stopped, ..
            } => Marks { passed, stopped },
            ToggleRequest::Delta {
                kind: MarkKind::Passed,
                checked,
            } => Marks {
                passed: checked,
                stopped: checked && current.stopped,
            },
            ToggleRequest::Delta {
                kind: MarkKind::Stopped,
                checked,
            } => Marks {
                passed: checked || current.passed,
                stopped: checked,
            },
        }
    }

    pub fn expected_updated_at(&self) -> Option<Timestamp> {
        match self {
            ToggleRequest::EndState {
                expected_updated_at,
                ..
            } => *expected_updated_at,
            ToggleRequest::Delta { .. } => None,
        }
    }
}

/// Move `state` to the `desired` marks.
pub fn apply(state: &mut StationState, desired: Marks, now: Timestamp) {
    let previous = Marks::of(state);
    let desired = desired.resolve(previous);

    if desired.stopped && !previous.stopped {
        state.first_stopped_at.get_or_insert(now);
    }

    if desired.passed && !previous.passed {
        state.first_passed_at.get_or_insert(now);
    }

    state.passed = desired.passed;
    state.stopped = desired.stopped;
    state.updated_at = now;
}
