//! Policies.
//!
//! Agent families expose incompatible action-selection contracts. Each family
//! has its own trait here; [`crate::rollout`] adapts them to a single protocol.
use super::Env;
use anyhow::Result;

/// Action chosen by a distributional agent, with the predicted return
/// distribution it was chosen from.
#[derive(Debug, Clone, PartialEq)]
pub struct QuantileAction {
    /// The greedy action under the risk measure.
    pub act: usize,

    /// Predicted return quantiles, one row per tau, one column per action.
    pub quantiles: Vec<Vec<f32>>,

    /// Probability levels of the rows of `quantiles`.
    pub taus: Vec<f32>,
}

/// An agent predicting a distribution of returns per action.
pub trait QuantilePolicy<E: Env> {
    /// Selects an action under the given CVaR level in `(0, 1]`.
    fn act_eval(&mut self, obs: &E::Obs, cvar: f32) -> Result<QuantileAction>;

    /// Selects an action under a CVaR level the agent derives from `obs`.
    fn act_adaptive_eval(&mut self, obs: &E::Obs) -> Result<QuantileAction>;
}

/// An agent estimating a value for each action.
pub trait GreedyPolicy<E: Env> {
    /// Returns the action with the highest value if `deterministic`,
    /// otherwise an exploratory action.
    fn predict(&mut self, obs: &E::Obs, deterministic: bool) -> Result<usize>;
}

/// A classical controller mapping observations to actions directly.
pub trait ReactivePolicy<E: Env> {
    /// Computes the action for the observation.
    fn act(&mut self, obs: &E::Obs) -> Result<usize>;
}
