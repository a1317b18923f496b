//! Episode rollouts.
//!
//! [`run_episode`] drives one episode for one (protocol, environment) pair.
//! Agent families plug in through the [`Protocol`] adapters in this module;
//! distributional agents additionally report their predicted quantiles, which
//! are appended to the episode record.
mod protocol;
mod trace;
use crate::{record::Record, Env, EpisodeState, Robot};
use anyhow::Result;
use log::{trace, warn};
pub use protocol::{Decision, Distributional, Greedy, Protocol, Reactive, RiskMode};
pub use trace::{QuantileStep, QuantileTrace, QuantileTraces};

/// Step ceiling of an episode.
///
/// Episodes normally end by the environment reporting `done`. The ceiling
/// stops policies that never get there.
pub const MAX_STEPS: usize = 1000;

/// Result of an episode.
#[derive(Debug, Clone, PartialEq)]
pub struct EpisodeOutcome {
    /// Episode data of the environment, with quantile telemetry if any.
    pub record: Record,

    /// If the robot reached the goal.
    pub success: bool,

    /// Simulated time, `dt * n_substeps * steps`.
    pub time: f64,

    /// Energy consumed by the actions.
    pub energy: f64,

    /// The number of decisions.
    pub steps: usize,

    /// Discounted sum of rewards.
    pub discounted_return: f64,

    /// State of the robot at the end of the episode.
    pub final_state: EpisodeState,

    /// Quantile traces, for protocols reporting them.
    pub traces: Option<QuantileTraces>,
}

/// Runs an episode from `first_obs` until the environment reports `done` or
/// `max_steps` decisions have been made.
///
/// Errors of the agent or the environment abort the episode and are returned
/// as they are.
pub fn run_episode<E: Env>(
    env: &mut E,
    protocol: &mut dyn Protocol<E>,
    first_obs: E::Obs,
    max_steps: usize,
) -> Result<EpisodeOutcome> {
    let mut obs = first_obs;
    let mut traces = protocol.risk_levels().map(QuantileTraces::new);
    let mut discounted_return = 0.0;
    let mut energy = 0.0;
    let mut length = 0;
    let mut is_done = false;
    let mut state = EpisodeState::Normal;

    while !is_done && length < max_steps {
        let decision = protocol.select_action(&obs)?;
        if let (Some(traces), Some(samples)) = (traces.as_mut(), decision.telemetry) {
            traces.push(samples)?;
        }

        let step = env.step(decision.act)?;
        discounted_return += env.discount().powi(length as i32) * step.reward;
        length += 1;
        energy += env.robot().action_energy_cost(decision.act);
        trace!(
            "step {}: act = {}, reward = {}, state = {}",
            length,
            decision.act,
            step.reward,
            step.state
        );

        obs = step.obs;
        is_done = step.is_done;
        state = step.state;
    }

    if !is_done {
        warn!("Episode stopped at the step ceiling ({} steps)", max_steps);
    }

    let robot = env.robot();
    let time = robot.dt() * robot.n_substeps() as f64 * length as f64;
    let mut record = env.episode_data();
    if let Some(traces) = traces.as_ref() {
        traces.write_to(&mut record)?;
    }

    Ok(EpisodeOutcome {
        record,
        success: state.is_success(),
        time,
        energy,
        steps: length,
        discounted_return,
        final_state: state,
        traces,
    })
}
