//! Adapters from agent families to a single action-selection protocol.
use crate::{
    error::MarinavError, Env, GreedyPolicy, QuantileAction, QuantilePolicy, ReactivePolicy,
};
use anyhow::Result;
use serde::{Deserialize, Serialize};

/// An action together with optional quantile telemetry.
#[derive(Debug, Clone, PartialEq)]
pub struct Decision {
    /// Action applied to the environment.
    pub act: usize,

    /// One sample per risk level of the protocol, if it reports any.
    pub telemetry: Option<Vec<QuantileAction>>,
}

impl Decision {
    /// A decision without telemetry.
    pub fn plain(act: usize) -> Self {
        Self {
            act,
            telemetry: None,
        }
    }
}

/// Selects actions for an episode rollout.
pub trait Protocol<E: Env> {
    /// Selects the action for the observation.
    fn select_action(&mut self, obs: &E::Obs) -> Result<Decision>;

    /// Risk levels of the telemetry in [`Decision::telemetry`], if any.
    fn risk_levels(&self) -> Option<&[f32]> {
        None
    }
}

/// How a distributional agent obtains its risk level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskMode {
    /// Query the agent at each configured risk level.
    Fixed,

    /// Let the agent choose the risk level from the observation.
    Adaptive,
}

/// Protocol of distributional agents.
///
/// The agent is queried once per configured risk level at every step. Only the
/// action of the selected level is applied, but the quantiles of all levels
/// are reported.
pub struct Distributional<P> {
    policy: P,
    cvars: Vec<f32>,
    selected: usize,
    mode: RiskMode,
}

impl<P> Distributional<P> {
    /// Constructs the protocol.
    ///
    /// `selected` is the position in `cvars` of the level driving the robot.
    pub fn new(policy: P, cvars: Vec<f32>, selected: usize, mode: RiskMode) -> Result<Self> {
        if cvars.is_empty() {
            return Err(MarinavError::EmptyRiskLevels.into());
        }
        if let Some(c) = cvars.iter().find(|c| !(**c > 0.0 && **c <= 1.0)) {
            return Err(MarinavError::InvalidRiskLevel(*c).into());
        }
        if selected >= cvars.len() {
            return Err(MarinavError::SelectedRiskLevelOutOfRange {
                index: selected,
                len: cvars.len(),
            }
            .into());
        }
        Ok(Self {
            policy,
            cvars,
            selected,
            mode,
        })
    }

    /// The protocol with the single risk-neutral level `1.0`.
    pub fn risk_neutral(policy: P, mode: RiskMode) -> Self {
        Self {
            policy,
            cvars: vec![1.0],
            selected: 0,
            mode,
        }
    }

    /// The agent.
    pub fn policy(&self) -> &P {
        &self.policy
    }
}

impl<E: Env, P: QuantilePolicy<E>> Protocol<E> for Distributional<P> {
    fn select_action(&mut self, obs: &E::Obs) -> Result<Decision> {
        let mut samples = Vec::with_capacity(self.cvars.len());
        for cvar in self.cvars.iter() {
            let sample = match self.mode {
                RiskMode::Fixed => self.policy.act_eval(obs, *cvar)?,
                RiskMode::Adaptive => self.policy.act_adaptive_eval(obs)?,
            };
            samples.push(sample);
        }
        Ok(Decision {
            act: samples[self.selected].act,
            telemetry: Some(samples),
        })
    }

    fn risk_levels(&self) -> Option<&[f32]> {
        Some(&self.cvars)
    }
}

/// Protocol of value-based agents, always taking the greedy action.
pub struct Greedy<P> {
    policy: P,
}

impl<P> Greedy<P> {
    /// Constructs the protocol.
    pub fn new(policy: P) -> Self {
        Self { policy }
    }
}

impl<E: Env, P: GreedyPolicy<E>> Protocol<E> for Greedy<P> {
    fn select_action(&mut self, obs: &E::Obs) -> Result<Decision> {
        Ok(Decision::plain(self.policy.predict(obs, true)?))
    }
}

/// Protocol of classical reactive controllers.
pub struct Reactive<P> {
    policy: P,
}

impl<P> Reactive<P> {
    /// Constructs the protocol.
    pub fn new(policy: P) -> Self {
        Self { policy }
    }
}

impl<E: Env, P: ReactivePolicy<E>> Protocol<E> for Reactive<P> {
    fn select_action(&mut self, obs: &E::Obs) -> Result<Decision> {
        Ok(Decision::plain(self.policy.act(obs)?))
    }
}
