//! This module is used for tests.
//!
//! [`DummyEnv`] moves its robot one unit along the x axis per step, whatever
//! the action, and reaches the goal after a configurable number of steps.
use crate::{
    hazard::HazardField,
    record::{Record, RecordValue},
    EpisodeState, Obs, Robot, Step,
};
use anyhow::Result;

#[derive(Clone, Debug, PartialEq)]
/// Dummy observation, `[x, y, steps]`.
pub struct DummyObs(pub Vec<f64>);

impl Obs for DummyObs {
    fn features(&self) -> &[f64] {
        &self.0
    }
}

/// Dummy robot.
#[derive(Clone, Debug, Default)]
pub struct DummyRobot {
    /// Position.
    pub pos: [f64; 2],

    /// Initial heading.
    pub init_theta: f64,

    /// Initial speed.
    pub init_speed: f64,

    /// Flow velocity given at the last reset.
    pub current_velocity: [f64; 2],

    /// Steps since the last reset.
    pub steps: usize,

    /// Actions since the last reset.
    pub actions: Vec<usize>,
}

impl Robot for DummyRobot {
    fn dt(&self) -> f64 {
        0.05
    }

    fn n_substeps(&self) -> usize {
        10
    }

    fn action_energy_cost(&self, act: usize) -> f64 {
        0.1 * (act + 1) as f64
    }

    fn set_init_theta(&mut self, theta: f64) {
        self.init_theta = theta;
    }

    fn set_init_speed(&mut self, speed: f64) {
        self.init_speed = speed;
    }

    fn reset_state(&mut self, x: f64, y: f64, current_velocity: [f64; 2]) {
        self.pos = [x, y];
        self.current_velocity = current_velocity;
        self.steps = 0;
        self.actions.clear();
    }
}

/// Dummy env.
pub struct DummyEnv {
    robot: DummyRobot,
    hazards: HazardField,
    steps_to_goal: Option<usize>,
    terminal: EpisodeState,
    rewards: Vec<f64>,
    current: [f64; 2],
}

impl DummyEnv {
    /// An environment in which the goal is reached after `steps_to_goal` steps.
    pub fn new(steps_to_goal: usize) -> Self {
        Self {
            robot: DummyRobot::default(),
            hazards: HazardField::default(),
            steps_to_goal: Some(steps_to_goal),
            terminal: EpisodeState::ReachGoal,
            rewards: vec![1.0],
            current: [0.0, 0.0],
        }
    }

    /// An environment whose episodes never end.
    pub fn endless() -> Self {
        Self {
            steps_to_goal: None,
            ..Self::new(0)
        }
    }

    /// Ends episodes in `state` instead of reaching the goal.
    pub fn with_terminal(mut self, state: EpisodeState) -> Self {
        self.terminal = state;
        self
    }

    /// Cycles through `rewards`, one per step.
    pub fn with_rewards(mut self, rewards: Vec<f64>) -> Self {
        self.rewards = rewards;
        self
    }

    /// Sets a uniform flow velocity.
    pub fn with_current(mut self, current: [f64; 2]) -> Self {
        self.current = current;
        self
    }
}

impl crate::Env for DummyEnv {
    type Config = usize;
    type Obs = DummyObs;
    type Robot = DummyRobot;

    fn build(config: &Self::Config, _seed: i64) -> Result<Self> {
        Ok(Self::new(*config))
    }

    fn step(&mut self, act: usize) -> Result<Step<Self>> {
        self.robot.steps += 1;
        self.robot.pos[0] += 1.0;
        self.robot.actions.push(act);
        let reward = self.rewards[(self.robot.steps - 1) % self.rewards.len()];
        let (is_done, state) = match self.steps_to_goal {
            Some(n) if self.robot.steps >= n => (true, self.terminal),
            _ => (false, EpisodeState::Normal),
        };
        Ok(Step::new(self.observation(), reward, is_done, state))
    }

    fn reset(&mut self) -> Result<Self::Obs> {
        let [x, y] = self.hazards.start;
        self.robot.reset_state(x, y, self.current);
        Ok(self.observation())
    }

    fn observation(&self) -> Self::Obs {
        DummyObs(vec![
            self.robot.pos[0],
            self.robot.pos[1],
            self.robot.steps as f64,
        ])
    }

    fn velocity(&self, _x: f64, _y: f64) -> [f64; 2] {
        self.current
    }

    fn episode_data(&self) -> Record {
        let actions = self.robot.actions.iter().map(|a| *a as f64).collect();
        let robot = Record::from_slice(&[("actions", RecordValue::Array1(actions))]);
        Record::from_slice(&[("robot", RecordValue::Record(robot))])
    }

    fn discount(&self) -> f64 {
        0.9
    }

    fn robot(&self) -> &Self::Robot {
        &self.robot
    }

    fn robot_mut(&mut self) -> &mut Self::Robot {
        &mut self.robot
    }

    fn hazards(&self) -> &HazardField {
        &self.hazards
    }

    fn hazards_mut(&mut self) -> &mut HazardField {
        &mut self.hazards
    }
}
