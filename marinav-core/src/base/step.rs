//! Environment step.
use super::Env;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Classification of the state the robot is in after a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EpisodeState {
    /// The episode goes on.
    #[serde(rename = "normal")]
    Normal,

    /// The robot reached the goal.
    #[serde(rename = "reach goal")]
    ReachGoal,

    /// The robot hit an obstacle.
    #[serde(rename = "collision")]
    Collision,

    /// The robot left the map.
    #[serde(rename = "out of boundary")]
    OutOfBoundary,
}

impl EpisodeState {
    /// Only reaching the goal counts as success.
    pub fn is_success(&self) -> bool {
        *self == Self::ReachGoal
    }
}

impl fmt::Display for EpisodeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Normal => "normal",
            Self::ReachGoal => "reach goal",
            Self::Collision => "collision",
            Self::OutOfBoundary => "out of boundary",
        };
        write!(f, "{}", s)
    }
}

/// Represents the outcome of applying an action, `(o_t+1, r_t, done)`,
/// together with the state classification.
pub struct Step<E: Env> {
    /// Observation.
    pub obs: E::Obs,

    /// Reward.
    pub reward: f64,

    /// Flag denoting if episode is terminated.
    pub is_done: bool,

    /// State of the robot after the step.
    pub state: EpisodeState,
}

impl<E: Env> Step<E> {
    /// Constructs a [`Step`] object.
    pub fn new(obs: E::Obs, reward: f64, is_done: bool, state: EpisodeState) -> Self {
        Step {
            obs,
            reward,
            is_done,
            state,
        }
    }
}
