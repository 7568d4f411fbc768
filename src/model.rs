//! Model construction for the corridor MDP.
//!
//! The agent walks a corridor of discrete states with a trap terminal at one
//! end and a treasure terminal at the other. Each move goes where intended
//! with probability `p_intended` and slips the opposite way with the
//! remaining probability. [`CorridorConfig::build`] turns those rules into
//! dense transition and reward tables, which are immutable from then on.

use ndarray::Array3;

use crate::error::{Error, Result};

/// Tolerance for checking that transition distributions sum to 1.
const PROBABILITY_TOLERANCE: f64 = 1e-9;

/// One of the two moves available in every non-terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Left,
    Right,
}

impl Action {
    /// All actions, in index order.
    pub const ALL: [Action; 2] = [Action::Left, Action::Right];

    /// The direction the agent moves when it slips.
    #[must_use]
    pub fn opposite(self) -> Action {
        match self {
            Action::Left => Action::Right,
            Action::Right => Action::Left,
        }
    }

    /// Index of this action in the action space (LEFT=0, RIGHT=1).
    #[must_use]
    pub fn index(self) -> usize {
        match self {
            Action::Left => 0,
            Action::Right => 1,
        }
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Action::Left => write!(f, "L"),
            Action::Right => write!(f, "R"),
        }
    }
}

/// Configuration for the corridor MDP.
///
/// The default is the canonical 5-step treasure hunt: trap at state 0
/// (reward -1), treasure at state 4 (reward +1), living cost -0.04 for every
/// other destination, 80% chance of moving as intended, discount 0.95.
#[derive(Debug, Clone, PartialEq)]
pub struct CorridorConfig {
    /// Number of states in the corridor.
    pub num_states: usize,
    /// The penalizing terminal (the trap).
    pub failure_state: usize,
    /// The rewarding terminal (the treasure).
    pub success_state: usize,
    /// Reward for arriving at the success terminal.
    pub success_reward: f64,
    /// Reward for arriving at the failure terminal.
    pub failure_reward: f64,
    /// Reward for arriving at any non-terminal state.
    pub living_cost: f64,
    /// Probability of moving in the intended direction.
    pub p_intended: f64,
    /// Discount factor.
    pub gamma: f64,
}

impl Default for CorridorConfig {
    fn default() -> Self {
        Self {
            num_states: 5,
            failure_state: 0,
            success_state: 4,
            success_reward: 1.0,
            failure_reward: -1.0,
            living_cost: -0.04,
            p_intended: 0.8,
            gamma: 0.95,
        }
    }
}

impl CorridorConfig {
    /// Whether `state` is one of the two absorbing terminals.
    #[must_use]
    pub fn is_terminal(&self, state: usize) -> bool {
        state == self.failure_state || state == self.success_state
    }

    /// The state reached from `state` when moving in direction `action`.
    ///
    /// Terminal states absorb: the successor is the state itself. Otherwise
    /// the successor is one step left or right with no bounds clamping; the
    /// corridor must place terminals at both ends so the step stays in
    /// range. A step that leaves the state space is a configuration error.
    pub fn successor(&self, state: usize, action: Action) -> Result<usize> {
        if self.is_terminal(state) {
            return Ok(state);
        }
        let next = match action {
            Action::Left => state.checked_sub(1),
            Action::Right => Some(state + 1),
        };
        match next {
            Some(s) if s < self.num_states => Ok(s),
            _ => Err(Error::SuccessorOutOfRange {
                state,
                action: action.index(),
            }),
        }
    }

    /// Reward for arriving at `destination`, regardless of origin or action.
    fn arrival_reward(&self, destination: usize) -> f64 {
        if destination == self.success_state {
            self.success_reward
        } else if destination == self.failure_state {
            self.failure_reward
        } else {
            self.living_cost
        }
    }

    fn validate(&self) -> Result<()> {
        if self.num_states == 0 {
            return Err(Error::EmptyModel {
                states: self.num_states,
                actions: Action::ALL.len(),
            });
        }
        for terminal in [self.failure_state, self.success_state] {
            if terminal >= self.num_states {
                return Err(Error::TerminalOutOfRange {
                    state: terminal,
                    states: self.num_states,
                });
            }
        }
        if self.failure_state == self.success_state {
            return Err(Error::TerminalsCoincide {
                state: self.success_state,
            });
        }
        if !(0.0..=1.0).contains(&self.p_intended) {
            return Err(Error::InvalidProbability(self.p_intended));
        }
        if !(0.0..=1.0).contains(&self.gamma) {
            return Err(Error::InvalidDiscount(self.gamma));
        }
        Ok(())
    }

    /// Builds the transition and reward tables for this configuration.
    ///
    /// Terminal states self-absorb with probability 1 and reward 0. For a
    /// non-terminal state, probability mass `p_intended` goes to the intended
    /// successor and the remainder to the slip successor; the two
    /// contributions accumulate rather than overwrite, so the tables stay
    /// correct even in geometries where both moves land on the same state.
    ///
    /// # Examples
    ///
    /// ```
    /// use corridor_mdp::CorridorConfig;
    ///
    /// let mdp = CorridorConfig::default().build().unwrap();
    /// assert_eq!(mdp.num_states, 5);
    /// // Terminals absorb.
    /// assert_eq!(mdp.transitions[[0, 0, 0]], 1.0);
    /// assert_eq!(mdp.transitions[[4, 1, 4]], 1.0);
    /// ```
    pub fn build(&self) -> Result<Mdp> {
        self.validate()?;

        let num_actions = Action::ALL.len();
        let mut transitions = Array3::zeros((self.num_states, num_actions, self.num_states));
        let mut rewards = Array3::zeros((self.num_states, num_actions, self.num_states));
        let p_slip = 1.0 - self.p_intended;

        for s in 0..self.num_states {
            for action in Action::ALL {
                let a = action.index();
                if self.is_terminal(s) {
                    transitions[[s, a, s]] = 1.0;
                    rewards[[s, a, s]] = 0.0;
                    continue;
                }

                let s_intended = self.successor(s, action)?;
                let s_slip = self.successor(s, action.opposite())?;

                transitions[[s, a, s_intended]] += self.p_intended;
                transitions[[s, a, s_slip]] += p_slip;

                for target in [s_intended, s_slip] {
                    rewards[[s, a, target]] = self.arrival_reward(target);
                }
            }
        }

        let mdp = Mdp {
            num_states: self.num_states,
            num_actions,
            gamma: self.gamma,
            failure_state: self.failure_state,
            success_state: self.success_state,
            transitions,
            rewards,
        };
        mdp.check_normalized()?;
        Ok(mdp)
    }
}

/// A fully-built corridor MDP: dense transition and reward tables indexed
/// `[state, action, next_state]`, frozen after construction.
#[derive(Debug, Clone)]
pub struct Mdp {
    /// Number of states.
    pub num_states: usize,
    /// Number of actions available in every state.
    pub num_actions: usize,
    /// Discount factor.
    pub gamma: f64,
    /// The penalizing terminal.
    pub failure_state: usize,
    /// The rewarding terminal.
    pub success_state: usize,
    /// `transitions[[s, a, s']]` is the probability of reaching `s'` from
    /// `s` under action `a`. Each `(s, a)` row sums to 1.
    pub transitions: Array3<f64>,
    /// `rewards[[s, a, s']]` is the immediate reward for that transition.
    pub rewards: Array3<f64>,
}

impl Mdp {
    /// Whether `state` is one of the two absorbing terminals.
    #[must_use]
    pub fn is_terminal(&self, state: usize) -> bool {
        state == self.failure_state || state == self.success_state
    }

    fn check_normalized(&self) -> Result<()> {
        for s in 0..self.num_states {
            for a in 0..self.num_actions {
                let sum: f64 = (0..self.num_states)
                    .map(|sp| self.transitions[[s, a, sp]])
                    .sum();
                if (sum - 1.0).abs() > PROBABILITY_TOLERANCE {
                    return Err(Error::UnnormalizedTransition {
                        state: s,
                        action: a,
                        sum,
                    });
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_action_opposite_and_index() {
        assert_eq!(Action::Left.opposite(), Action::Right);
        assert_eq!(Action::Right.opposite(), Action::Left);
        assert_eq!(Action::Left.index(), 0);
        assert_eq!(Action::Right.index(), 1);
        assert_eq!(Action::Left.to_string(), "L");
        assert_eq!(Action::Right.to_string(), "R");
    }

    #[test]
    fn test_successor_absorbs_at_terminals() {
        let config = CorridorConfig::default();
        for action in Action::ALL {
            assert_eq!(config.successor(0, action).unwrap(), 0);
            assert_eq!(config.successor(4, action).unwrap(), 4);
        }
        assert_eq!(config.successor(2, Action::Left).unwrap(), 1);
        assert_eq!(config.successor(2, Action::Right).unwrap(), 3);
    }

    #[test]
    fn test_transition_rows_sum_to_one() {
        let mdp = CorridorConfig::default().build().unwrap();
        for s in 0..mdp.num_states {
            for a in 0..mdp.num_actions {
                let sum: f64 = (0..mdp.num_states).map(|sp| mdp.transitions[[s, a, sp]]).sum();
                assert_relative_eq!(sum, 1.0, epsilon = 1e-9);
            }
        }
    }

    #[test]
    fn test_terminal_absorption() {
        let mdp = CorridorConfig::default().build().unwrap();
        for s in [0, 4] {
            for a in 0..mdp.num_actions {
                assert_eq!(mdp.transitions[[s, a, s]], 1.0);
                assert_eq!(mdp.rewards[[s, a, s]], 0.0);
                for sp in 0..mdp.num_states {
                    if sp != s {
                        assert_eq!(mdp.transitions[[s, a, sp]], 0.0);
                    }
                }
            }
        }
    }

    #[test]
    fn test_intended_and_slip_split() {
        let mdp = CorridorConfig::default().build().unwrap();
        // From state 2, RIGHT goes to 3 with 0.8 and slips back to 1 with 0.2.
        assert_relative_eq!(mdp.transitions[[2, 1, 3]], 0.8);
        assert_relative_eq!(mdp.transitions[[2, 1, 1]], 0.2);
        // LEFT mirrors it.
        assert_relative_eq!(mdp.transitions[[2, 0, 1]], 0.8);
        assert_relative_eq!(mdp.transitions[[2, 0, 3]], 0.2);
    }

    #[test]
    fn test_rewards_by_destination() {
        let mdp = CorridorConfig::default().build().unwrap();
        // Arriving at the treasure pays +1 no matter how.
        assert_eq!(mdp.rewards[[3, 1, 4]], 1.0);
        assert_eq!(mdp.rewards[[3, 0, 4]], 1.0);
        // Arriving at the trap costs -1.
        assert_eq!(mdp.rewards[[1, 0, 0]], -1.0);
        assert_eq!(mdp.rewards[[1, 1, 0]], -1.0);
        // Any other destination costs the living cost.
        assert_eq!(mdp.rewards[[2, 1, 3]], -0.04);
        assert_eq!(mdp.rewards[[2, 0, 1]], -0.04);
    }

    #[test]
    fn test_three_state_corridor() {
        let config = CorridorConfig {
            num_states: 3,
            success_state: 2,
            p_intended: 0.7,
            ..CorridorConfig::default()
        };
        let mdp = config.build().unwrap();
        assert_relative_eq!(mdp.transitions[[1, 1, 2]], 0.7);
        assert_relative_eq!(mdp.transitions[[1, 1, 0]], 0.3);
        assert_eq!(mdp.rewards[[1, 1, 2]], 1.0);
        assert_eq!(mdp.rewards[[1, 1, 0]], -1.0);
    }

    #[test]
    fn test_deterministic_transitions_still_normalize() {
        // p_intended = 1 puts zero mass on the slip target; rows still sum to 1.
        let config = CorridorConfig {
            p_intended: 1.0,
            ..CorridorConfig::default()
        };
        let mdp = config.build().unwrap();
        assert_relative_eq!(mdp.transitions[[2, 1, 3]], 1.0);
        assert_relative_eq!(mdp.transitions[[2, 1, 1]], 0.0);
    }

    #[test]
    fn test_rejects_empty_model() {
        let config = CorridorConfig {
            num_states: 0,
            ..CorridorConfig::default()
        };
        assert_eq!(
            config.build().unwrap_err(),
            Error::EmptyModel { states: 0, actions: 2 }
        );
    }

    #[test]
    fn test_rejects_terminal_out_of_range() {
        let config = CorridorConfig {
            success_state: 9,
            ..CorridorConfig::default()
        };
        assert_eq!(
            config.build().unwrap_err(),
            Error::TerminalOutOfRange { state: 9, states: 5 }
        );
    }

    #[test]
    fn test_rejects_coincident_terminals() {
        let config = CorridorConfig {
            failure_state: 4,
            success_state: 4,
            ..CorridorConfig::default()
        };
        assert_eq!(config.build().unwrap_err(), Error::TerminalsCoincide { state: 4 });
    }

    #[test]
    fn test_rejects_bad_probability_and_discount() {
        let config = CorridorConfig {
            p_intended: 1.2,
            ..CorridorConfig::default()
        };
        assert_eq!(config.build().unwrap_err(), Error::InvalidProbability(1.2));

        let config = CorridorConfig {
            gamma: -0.1,
            ..CorridorConfig::default()
        };
        assert_eq!(config.build().unwrap_err(), Error::InvalidDiscount(-0.1));
    }

    #[test]
    fn test_successor_out_of_range_is_fatal() {
        // Terminals both at the right end leave state 0 free to step off the
        // left edge, which the builder must report rather than clamp.
        let config = CorridorConfig {
            num_states: 5,
            failure_state: 3,
            success_state: 4,
            ..CorridorConfig::default()
        };
        assert_eq!(
            config.build().unwrap_err(),
            Error::SuccessorOutOfRange { state: 0, action: 0 }
        );
    }
}
