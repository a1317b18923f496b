//! Marine navigation environment.
use crate::{config::MarineNavConfig, flow, obs::MarineNavObs, robot::MarineRobot, sonar};
use anyhow::{anyhow, Result};
use log::{debug, trace};
use marinav_core::{
    hazard::HazardField,
    record::{Record, RecordValue},
    Env, EpisodeState, Robot, Step,
};

fn distance(a: [f64; 2], b: [f64; 2]) -> f64 {
    ((a[0] - b[0]).powi(2) + (a[1] - b[1]).powi(2)).sqrt()
}

/// A robot crossing a rectangular map in a field of Rankine vortices, among
/// circular obstacles.
///
/// Per decision, the action is held for `n_substeps` sub-steps, each of which
/// samples the flow at the robot. The reward is the timestep penalty plus the
/// progress towards the goal, plus the collision penalty or the goal reward on
/// termination. Episodes end on collision, on reaching the goal and on leaving
/// the map.
///
/// The dynamics have no random component, so the environment does not depend
/// on the seed it is built with. The seed is only kept to label the run.
pub struct MarineNavEnv {
    config: MarineNavConfig,
    robot: MarineRobot,
    hazards: HazardField,
    seed: i64,
}

impl MarineNavEnv {
    /// Configuration.
    pub fn config(&self) -> &MarineNavConfig {
        &self.config
    }

    /// Seed the environment was built with. It does not affect the dynamics.
    pub fn seed(&self) -> i64 {
        self.seed
    }

    fn collides(&self) -> bool {
        let index = match self.hazards.obstacle_index() {
            Some(index) => index,
            None => return false,
        };
        let p = self.robot.position();
        let max_r = self.hazards.obstacles().iter().fold(0.0f64, |m, o| m.max(o.r));
        index
            .within(p, self.robot.radius() + max_r)
            .into_iter()
            .map(|ix| &self.hazards.obstacles()[ix])
            .any(|o| distance(p, o.center()) <= self.robot.radius() + o.r)
    }

    fn out_of_boundary(&self) -> bool {
        let [x, y] = self.robot.position();
        x < 0.0 || x > self.config.width || y < 0.0 || y > self.config.height
    }

    /// Classifies the current state of the robot.
    pub fn state(&self) -> EpisodeState {
        if self.collides() {
            EpisodeState::Collision
        } else if distance(self.robot.position(), self.hazards.goal) <= self.config.goal_distance {
            EpisodeState::ReachGoal
        } else if self.out_of_boundary() {
            EpisodeState::OutOfBoundary
        } else {
            EpisodeState::Normal
        }
    }
}

impl Env for MarineNavEnv {
    type Config = MarineNavConfig;
    type Obs = MarineNavObs;
    type Robot = MarineRobot;

    /// Builds an environment without hazards. The start and the goal are
    /// placed near opposite corners of the map; a
    /// [`ScenarioBuilder`](marinav_core::scenario::ScenarioBuilder) replaces
    /// them. `seed` is recorded but not used.
    fn build(config: &Self::Config, seed: i64) -> Result<Self> {
        let hazards = HazardField::new(
            [0.1 * config.width, 0.1 * config.height],
            [0.9 * config.width, 0.9 * config.height],
        );
        let mut env = Self {
            config: config.clone(),
            robot: MarineRobot::new(config.robot.clone()),
            hazards,
            seed,
        };
        env.reset()?;
        debug!("Built MarineNavEnv with seed {}", seed);
        Ok(env)
    }

    fn step(&mut self, act: usize) -> Result<Step<Self>> {
        if act >= self.robot.n_actions() {
            return Err(anyhow!(
                "Action {} is out of range for {} actions",
                act,
                self.robot.n_actions()
            ));
        }

        let dis_before = distance(self.robot.position(), self.hazards.goal);
        for _ in 0..self.robot.n_substeps() {
            let current_velocity = self.velocity(self.robot.x, self.robot.y);
            self.robot.update_state(act, current_velocity);
        }
        self.robot.log_decision(act);
        let dis_after = distance(self.robot.position(), self.hazards.goal);

        let state = self.state();
        let mut reward = self.config.timestep_penalty + dis_before - dis_after;
        match state {
            EpisodeState::Collision => reward += self.config.collision_penalty,
            EpisodeState::ReachGoal => reward += self.config.goal_reward,
            _ => {}
        }
        trace!(
            "robot at ({:.2}, {:.2}), state = {}",
            self.robot.x,
            self.robot.y,
            state
        );

        let is_done = state != EpisodeState::Normal;
        Ok(Step::new(self.observation(), reward, is_done, state))
    }

    fn reset(&mut self) -> Result<Self::Obs> {
        let [x, y] = self.hazards.start;
        let current_velocity = self.velocity(x, y);
        self.robot.reset_state(x, y, current_velocity);
        Ok(self.observation())
    }

    fn observation(&self) -> Self::Obs {
        let p = self.robot.position();
        let goal = [self.hazards.goal[0] - p[0], self.hazards.goal[1] - p[1]];
        let sonar = sonar::scan(&self.config.sonar, &self.hazards, p, self.robot.theta);
        MarineNavObs::new(
            self.robot.to_robot_frame(goal),
            self.robot.to_robot_frame(self.robot.velocity),
            &sonar,
        )
    }

    fn velocity(&self, x: f64, y: f64) -> [f64; 2] {
        flow::velocity(&self.hazards, self.config.core_radius, x, y)
    }

    fn episode_data(&self) -> Record {
        let hazards = &self.hazards;
        let cores = hazards
            .cores()
            .iter()
            .map(|c| vec![c.x, c.y, if c.clockwise { 1.0 } else { 0.0 }, c.strength])
            .collect();
        let obstacles = hazards
            .obstacles()
            .iter()
            .map(|o| vec![o.x, o.y, o.r])
            .collect();
        let env = Record::from_slice(&[
            ("width", RecordValue::Scalar(self.config.width)),
            ("height", RecordValue::Scalar(self.config.height)),
            ("start", RecordValue::Array1(hazards.start.to_vec())),
            ("goal", RecordValue::Array1(hazards.goal.to_vec())),
            ("cores", RecordValue::Array2(cores)),
            ("obstacles", RecordValue::Array2(obstacles)),
        ]);
        Record::from_slice(&[
            ("env", RecordValue::Record(env)),
            ("robot", RecordValue::Record(self.robot.history())),
            ("state", RecordValue::String(self.state().to_string())),
        ])
    }

    fn discount(&self) -> f64 {
        self.config.discount
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

#[cfg(test)]
mod tests {
    use super::*;
    use marinav_core::{
        hazard::{Core, Obstacle},
        scenario::{Scenario, ScenarioBuilder},
        Obs,
    };
    use std::f64::consts::PI;

    fn env() -> Result<MarineNavEnv> {
        MarineNavEnv::build(&MarineNavConfig::default(), 0)
    }

    #[test]
    fn test_invalid_action() -> Result<()> {
        let mut env = env()?;
        assert!(env.step(9).is_err());
        Ok(())
    }

    #[test]
    fn test_reward_is_progress_minus_penalty() -> Result<()> {
        let mut env = env()?;
        let scenario = Scenario {
            init_theta: PI / 4.0,
            ..Scenario::open_water()
        };
        ScenarioBuilder::new(&scenario).apply(&mut env);
        let before = distance(env.robot().position(), env.hazards().goal);
        let step = env.step(4)?;
        let after = distance(env.robot().position(), env.hazards().goal);

        assert_eq!(step.state, EpisodeState::Normal);
        assert!(!step.is_done);
        assert!((step.reward - (-1.0 + before - after)).abs() < 1e-12);
        // a decision lasts 0.5 time units at speed 1
        assert!((before - after - 0.5).abs() < 0.05);
        Ok(())
    }

    #[test]
    fn test_collision_ends_episode() -> Result<()> {
        let mut env = env()?;
        let scenario = Scenario {
            init_theta: 0.0,
            obstacles: vec![Obstacle::new(17.0, 10.0, 1.5)],
            ..Scenario::open_water()
        };
        let obs = ScenarioBuilder::new(&scenario).apply(&mut env);
        // obstacle ahead is seen by the center beam
        assert!((obs.features()[4 + 2 * 3] - 0.5).abs() < 1e-9);

        let step = env.step(4)?;
        assert_eq!(step.state, EpisodeState::Collision);
        assert!(step.is_done);
        assert!(step.reward < -50.0);
        Ok(())
    }

    #[test]
    fn test_reaching_goal() -> Result<()> {
        let mut env = env()?;
        let scenario = Scenario {
            start: [40.0, 35.0],
            init_theta: 0.0,
            ..Scenario::open_water()
        };
        ScenarioBuilder::new(&scenario).apply(&mut env);
        let mut state = EpisodeState::Normal;
        let mut reward = 0.0;
        for _ in 0..10 {
            let step = env.step(4)?;
            state = step.state;
            reward = step.reward;
            if step.is_done {
                break;
            }
        }
        assert_eq!(state, EpisodeState::ReachGoal);
        assert!(reward > 99.0);
        Ok(())
    }

    #[test]
    fn test_leaving_the_map() -> Result<()> {
        let mut env = env()?;
        let scenario = Scenario {
            start: [0.2, 10.0],
            init_theta: PI,
            ..Scenario::open_water()
        };
        ScenarioBuilder::new(&scenario).apply(&mut env);
        let step = env.step(4)?;
        assert!(step.is_done);
        assert_eq!(step.state, EpisodeState::OutOfBoundary);
        Ok(())
    }

    #[test]
    fn test_flow_moves_robot() -> Result<()> {
        let mut env = env()?;
        let scenario = Scenario {
            init_speed: 0.0,
            cores: vec![Core::new(20.0, 10.0, false, PI * 10.0)],
            ..Scenario::open_water()
        };
        ScenarioBuilder::new(&scenario).apply(&mut env);
        // the ccw core east of the robot pushes it south
        env.step(4)?;
        assert!(env.robot().y < 10.0);
        Ok(())
    }

    #[test]
    fn test_episode_data() -> Result<()> {
        let mut env = env()?;
        ScenarioBuilder::new(&Scenario::adverse_flow()).apply(&mut env);
        env.step(0)?;
        env.step(8)?;

        let data = env.episode_data();
        let robot = data.get_record("robot")?;
        assert_eq!(robot.get_array1("actions")?, &[0.0, 8.0]);
        assert_eq!(robot.get_array1("traj_x")?.len(), 3);
        assert_eq!(robot.get_scalar("init_theta")?, 3.0 * PI / 4.0);
        let layout = data.get_record("env")?;
        assert_eq!(layout.get_array2("cores")?.len(), 8);
        assert_eq!(layout.get_array1("goal")?, &[45.0, 35.0]);
        Ok(())
    }
}
