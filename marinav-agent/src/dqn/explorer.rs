//! Exploration strategy of DQN.
use crate::mlp::argmax;
use ndarray::ArrayView1;
use serde::{Deserialize, Serialize};

/// Epsilon-greedy explorer for DQN.
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct EpsilonGreedy {
    /// Probability of taking a uniformly random action.
    pub eps: f64,
}

impl Default for EpsilonGreedy {
    fn default() -> Self {
        Self { eps: 0.05 }
    }
}

impl EpsilonGreedy {
    /// Constructs epsilon-greedy explorer.
    pub fn new(eps: f64) -> Self {
        Self { eps }
    }

    /// Takes an action based on the action values.
    pub fn action(&self, action_values: ArrayView1<f32>, rng: &mut fastrand::Rng) -> usize {
        if rng.f64() < self.eps {
            rng.usize(..action_values.len())
        } else {
            argmax(action_values)
        }
    }
}
