// Copyright (c) 2025 - Cowboy AI, Inc.
//! Application lifecycle state machine
//!
//! # States
//!
//! - Planned: registered but not in service (default initial state)
//! - Active: in service
//! - Deprecated: scheduled for removal, may carry a sunset date
//! - Retired: out of service (terminal)
//!
//! Application interfaces reuse the same table for their status, starting
//! at `Active`.
//!
//! A request to move to the current state is rejected like any other edge
//! missing from [`TRANSITIONS`]; it would produce no meaningful event.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::{StateMachine, TransitionError, TransitionResult};
use crate::errors::DomainError;

/// Lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Lifecycle {
    Planned,
    Active,
    Deprecated,
    Retired,
}

/// Allowed `(from, to)` edges
pub const TRANSITIONS: &[(Lifecycle, Lifecycle)] = &[
    (Lifecycle::Planned, Lifecycle::Active),
    (Lifecycle::Active, Lifecycle::Deprecated),
    (Lifecycle::Deprecated, Lifecycle::Retired),
];

impl Lifecycle {
    pub const ALL: [Lifecycle; 4] = [
        Lifecycle::Planned,
        Lifecycle::Active,
        Lifecycle::Deprecated,
        Lifecycle::Retired,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Lifecycle::Planned => "planned",
            Lifecycle::Active => "active",
            Lifecycle::Deprecated => "deprecated",
            Lifecycle::Retired => "retired",
        }
    }

    /// Whether the edge is in the table
    pub fn can_transition_to(&self, target: Lifecycle) -> bool {
        TRANSITIONS.contains(&(*self, target))
    }

    /// States reachable in one step
    pub fn next_states(&self) -> Vec<Lifecycle> {
        TRANSITIONS
            .iter()
            .filter(|(from, _)| from == self)
            .map(|(_, to)| *to)
            .collect()
    }
}

impl Default for Lifecycle {
    fn default() -> Self {
        Lifecycle::Planned
    }
}

impl fmt::Display for Lifecycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Lifecycle {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Lifecycle::ALL
            .iter()
            .copied()
            .find(|state| state.as_str() == wanted)
            .ok_or_else(|| {
                DomainError::validation(
                    "lifecycle",
                    format!("'{s}' is not one of planned, active, deprecated, retired"),
                )
            })
    }
}

impl StateMachine for Lifecycle {
    type Input = Lifecycle;
    type Output = ();

    fn transition(&self, target: &Lifecycle) -> TransitionResult<(Self, ())> {
        if self.can_transition_to(*target) {
            Ok((*target, ()))
        } else {
            Err(TransitionError::InvalidTransition {
                from: self.to_string(),
                to: target.to_string(),
            })
        }
    }

    fn is_terminal(&self) -> bool {
        self.next_states().is_empty()
    }
}
