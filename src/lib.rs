//! Optimal decision making for the 5-step corridor treasure hunt, a small
//! fully-known Markov Decision Process, solved exactly by value iteration.
//!
//! The pipeline has two stages: [`CorridorConfig::build`] constructs the
//! dense transition and reward tables, and [`value_iteration`] runs
//! synchronous Bellman backups on them until the value function converges,
//! then extracts the greedy policy.

pub mod error;
pub mod model;
pub mod solver;

pub use error::{Error, Result};
pub use model::{Action, CorridorConfig, Mdp};
pub use solver::{bellman_backup, value_iteration, SolveConfig, SolveStatus, Solution};
