//! Error types for model construction.
//!
//! Every variant is a fatal configuration error surfaced while building the
//! MDP tables. Solving has no recoverable failure path: a solver that runs
//! out of iterations still returns its best estimate, reported through
//! [`crate::SolveStatus`] rather than an error.

use thiserror::Error;

/// Fatal configuration errors raised during model construction.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// State or action counts must be positive.
    #[error("model must have positive state and action counts, got {states} states and {actions} actions")]
    EmptyModel { states: usize, actions: usize },

    /// A terminal state index falls outside the state space.
    #[error("terminal state {state} is out of range for {states} states")]
    TerminalOutOfRange { state: usize, states: usize },

    /// The success and failure terminals must be distinct states.
    #[error("success and failure terminals coincide at state {state}")]
    TerminalsCoincide { state: usize },

    /// The successor function produced a state outside `0..num_states`.
    #[error("successor of state {state} under action {action} leaves the state space")]
    SuccessorOutOfRange { state: usize, action: usize },

    /// The intended-transition probability must lie in `[0, 1]`.
    #[error("intended-transition probability must lie in [0, 1], got {0}")]
    InvalidProbability(f64),

    /// The discount factor must lie in `[0, 1]`.
    #[error("discount factor must lie in [0, 1], got {0}")]
    InvalidDiscount(f64),

    /// A transition distribution failed to normalize after construction.
    #[error("transition probabilities for state {state}, action {action} sum to {sum}, expected 1")]
    UnnormalizedTransition {
        state: usize,
        action: usize,
        sum: f64,
    },
}

/// Result type alias for model construction.
pub type Result<T> = std::result::Result<T, Error>;
