//! Environment.
use super::{Obs, Robot, Step};
use crate::{hazard::HazardField, record::Record};
use anyhow::Result;

/// Represents a navigation environment with a flow field and static hazards.
///
/// The harness treats the dynamics as a black box. It only relies on the
/// methods below, and on [`HazardField`] being the single source of truth for
/// the layout of vortex cores and obstacles.
pub trait Env {
    /// Configurations.
    type Config: Clone;

    /// Observation of the environment.
    type Obs: Obs;

    /// The simulated vehicle.
    type Robot: Robot;

    /// Builds an environment with a given random seed.
    fn build(config: &Self::Config, seed: i64) -> Result<Self>
    where
        Self: Sized;

    /// Performs an environment step with a discrete action.
    fn step(&mut self, act: usize) -> Result<Step<Self>>
    where
        Self: Sized;

    /// Puts the robot back to the start of the current layout and returns
    /// the observation there.
    fn reset(&mut self) -> Result<Self::Obs>;

    /// Returns the observation of the current state.
    fn observation(&self) -> Self::Obs;

    /// Returns the flow velocity `[vx, vy]` at the given position.
    fn velocity(&self, x: f64, y: f64) -> [f64; 2];

    /// Returns a description of the episode so far.
    fn episode_data(&self) -> Record;

    /// Discount factor of the reward.
    fn discount(&self) -> f64;

    /// The robot.
    fn robot(&self) -> &Self::Robot;

    /// The robot, for modification.
    fn robot_mut(&mut self) -> &mut Self::Robot;

    /// Layout of hazards, start and goal.
    fn hazards(&self) -> &HazardField;

    /// Layout of hazards, start and goal, for modification.
    fn hazards_mut(&mut self) -> &mut HazardField;
}
