//! Value iteration over a built corridor MDP.
//!
//! Synchronous Bellman backups: each sweep computes a fresh action-value
//! table from the previous value function, takes the max over actions, and
//! replaces the value vector wholesale. With a discount below 1 the backup
//! is a contraction, so the sweep converges geometrically to the optimal
//! value function; the greedy policy is read off at the end.

use ndarray::Array2;

use crate::model::{Action, Mdp};

/// Stopping parameters for [`value_iteration`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolveConfig {
    /// Stop once the largest absolute change in the value vector drops
    /// below this threshold.
    pub tolerance: f64,
    /// Hard cap on the number of sweeps.
    pub max_iterations: usize,
}

impl Default for SolveConfig {
    fn default() -> Self {
        Self {
            tolerance: 1e-8,
            max_iterations: 10_000,
        }
    }
}

/// How the iteration stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolveStatus {
    /// The value function changed by less than the tolerance.
    Converged,
    /// The iteration cap was hit first; the result is the best estimate so
    /// far and may not be optimal.
    IterationLimit,
}

/// The solved value function and greedy policy.
#[derive(Debug, Clone, PartialEq)]
pub struct Solution {
    /// Optimal expected discounted return per state. Terminals are 0.
    pub values: Vec<f64>,
    /// Greedy action per state. Terminals carry [`Action::Left`] as a
    /// placeholder; no action is ever taken there.
    pub policy: Vec<Action>,
    /// Whether the run converged or exhausted its iteration budget.
    pub status: SolveStatus,
    /// Number of sweeps performed.
    pub iterations: usize,
    /// Largest absolute value change in the final sweep.
    pub residual: f64,
}

/// Computes the action-value table
/// `Q[s, a] = sum over s' of T[s, a, s'] * (R[s, a, s'] + gamma * V[s'])`
/// for the given value vector.
///
/// Pure function of the model and `values`; returns a fresh table.
#[must_use]
pub fn bellman_backup(mdp: &Mdp, values: &[f64]) -> Array2<f64> {
    let mut q = Array2::zeros((mdp.num_states, mdp.num_actions));
    for s in 0..mdp.num_states {
        for a in 0..mdp.num_actions {
            let mut expected = 0.0;
            for sp in 0..mdp.num_states {
                let p = mdp.transitions[[s, a, sp]];
                if p == 0.0 {
                    continue;
                }
                expected += p * (mdp.rewards[[s, a, sp]] + mdp.gamma * values[sp]);
            }
            q[[s, a]] = expected;
        }
    }
    q
}

fn greedy_action(q: &Array2<f64>, s: usize, num_actions: usize) -> Action {
    let mut best_a = 0;
    let mut best = f64::NEG_INFINITY;
    for a in 0..num_actions {
        // Strict comparison keeps the first maximizing action on ties.
        if q[[s, a]] > best {
            best = q[[s, a]];
            best_a = a;
        }
    }
    Action::ALL[best_a]
}

/// Runs value iteration to convergence and extracts the greedy policy.
///
/// Starts from the all-zero value vector. Each sweep pins terminal states to
/// 0 and sets every other state to its best action value. Stops when the
/// largest absolute change falls below `config.tolerance`, or after
/// `config.max_iterations` sweeps, in which case the last estimate is
/// returned with [`SolveStatus::IterationLimit`].
///
/// # Examples
///
/// ```
/// use corridor_mdp::{value_iteration, Action, CorridorConfig, SolveConfig, SolveStatus};
///
/// let mdp = CorridorConfig::default().build().unwrap();
/// let solution = value_iteration(&mdp, &SolveConfig::default());
///
/// assert_eq!(solution.status, SolveStatus::Converged);
/// // Heading for the treasure dominates despite the slip risk.
/// assert_eq!(solution.policy[2], Action::Right);
/// ```
#[must_use]
pub fn value_iteration(mdp: &Mdp, config: &SolveConfig) -> Solution {
    let n = mdp.num_states;
    let mut values = vec![0.0; n];
    let mut status = SolveStatus::IterationLimit;
    let mut iterations = config.max_iterations;
    let mut residual = f64::INFINITY;

    for sweep in 0..config.max_iterations {
        let q = bellman_backup(mdp, &values);
        let mut next = vec![0.0; n];
        for s in 0..n {
            if mdp.is_terminal(s) {
                continue;
            }
            let mut best = f64::NEG_INFINITY;
            for a in 0..mdp.num_actions {
                if q[[s, a]] > best {
                    best = q[[s, a]];
                }
            }
            next[s] = best;
        }

        residual = next
            .iter()
            .zip(&values)
            .map(|(new, old)| (new - old).abs())
            .fold(0.0, f64::max);
        values = next;

        log::debug!("sweep {}: residual {:e}", sweep + 1, residual);
        if residual < config.tolerance {
            status = SolveStatus::Converged;
            iterations = sweep + 1;
            break;
        }
    }

    if status == SolveStatus::IterationLimit {
        log::warn!(
            "value iteration hit the {}-sweep cap with residual {:e} (tolerance {:e}); returning best estimate",
            config.max_iterations,
            residual,
            config.tolerance
        );
    }

    let q_final = bellman_backup(mdp, &values);
    let mut policy = vec![Action::Left; n];
    for (s, action) in policy.iter_mut().enumerate() {
        if !mdp.is_terminal(s) {
            *action = greedy_action(&q_final, s, mdp.num_actions);
        }
    }

    Solution {
        values,
        policy,
        status,
        iterations,
        residual,
    }
}
