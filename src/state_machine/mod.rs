// Copyright (c) 2025 - Cowboy AI, Inc.
//! Finite State Machine Abstractions
//!
//! Lifecycle attributes are modelled as small enums with a declarative
//! transition table. Transitions are pure functions:
//!
//! ```text
//! (State, Input) → Result<(State, Output), TransitionError>
//! ```
//!
//! Handlers call [`StateMachine::transition`] before emitting an event, so a
//! rejected edge never reaches the event store.

pub mod lifecycle;

pub use lifecycle::Lifecycle;

use crate::errors::DomainError;

/// Result of a state transition
pub type TransitionResult<S> = Result<S, TransitionError>;

/// Errors that can occur during state transitions
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransitionError {
    /// Transition from current state to target state is not allowed
    #[error("Invalid transition from {from} to {to}")]
    InvalidTransition { from: String, to: String },

    /// Aggregate is in a terminal state
    #[error("{0} is a terminal state")]
    Terminal(String),
}

impl From<TransitionError> for DomainError {
    fn from(err: TransitionError) -> Self {
        match err {
            TransitionError::InvalidTransition { from, to } => {
                DomainError::InvalidTransition { from, to }
            }
            TransitionError::Terminal(state) => {
                DomainError::validation("lifecycle", format!("{state} is a terminal state"))
            }
        }
    }
}

/// Trait for finite state machines
pub trait StateMachine: Sized + Clone {
    /// Input type that triggers transitions
    type Input;

    /// Output type produced by transitions (use () if none)
    type Output;

    /// Attempt to transition to a new state given an input
    fn transition(&self, input: &Self::Input) -> TransitionResult<(Self, Self::Output)>;

    /// Check if a transition is valid without performing it
    fn can_transition(&self, input: &Self::Input) -> bool {
        self.transition(input).is_ok()
    }

    /// Whether no further transition is possible
    fn is_terminal(&self) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Switch {
        Off,
        On,
        Broken,
    }

    impl StateMachine for Switch {
        type Input = ();
        type Output = ();

        fn transition(&self, _: &()) -> TransitionResult<(Self, ())> {
            match self {
                Switch::Off => Ok((Switch::On, ())),
                Switch::On => Ok((Switch::Off, ())),
                Switch::Broken => Err(TransitionError::Terminal("broken".into())),
            }
        }

        fn is_terminal(&self) -> bool {
            matches!(self, Switch::Broken)
        }
    }

    #[test]
    fn test_default_can_transition() {
        assert!(Switch::Off.can_transition(&()));
        assert!(!Switch::Broken.can_transition(&()));
        assert!(Switch::Broken.is_terminal());
    }

    #[test]
    fn test_transition_error_maps_to_domain_error() {
        let err: DomainError = TransitionError::InvalidTransition {
            from: "deprecated".into(),
            to: "planned".into(),
        }
        .into();
        assert_eq!(err.code(), "invalid_transition");

        let err: DomainError = TransitionError::Terminal("retired".into()).into();
        assert_eq!(err.code(), "validation_error");
    }
}
