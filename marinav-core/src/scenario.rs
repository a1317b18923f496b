//! Deterministic experiment conditions.
//!
//! A [`Scenario`] lists the hazards, start, goal and initial robot heading and
//! speed of an experiment condition as literals. [`ScenarioBuilder`] writes a
//! scenario into environments, so that every competing policy faces exactly
//! the same layout.
use crate::{
    error::MarinavError,
    hazard::{Core, Obstacle},
    Env, Robot,
};
use anyhow::Result;
use log::info;
use serde::{Deserialize, Serialize};
use std::{
    f64::consts::PI,
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// Declarative description of an experiment condition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    /// Name of the condition.
    pub name: String,

    /// Start position of the robot.
    pub start: [f64; 2],

    /// Goal position.
    pub goal: [f64; 2],

    /// Initial heading of the robot.
    pub init_theta: f64,

    /// Initial speed of the robot relative to the water.
    pub init_speed: f64,

    /// Vortex cores.
    pub cores: Vec<Core>,

    /// Obstacles.
    pub obstacles: Vec<Obstacle>,
}

impl Scenario {
    /// Names of the built-in scenarios.
    pub const NAMES: [&'static str; 2] = ["adverse_flow", "open_water"];

    /// A strong flow field around the line between start and goal, where the
    /// direct route is unfavorable.
    pub fn adverse_flow() -> Self {
        Self {
            name: "adverse_flow".to_string(),
            start: [15.0, 10.0],
            goal: [45.0, 35.0],
            init_theta: 3.0 * PI / 4.0,
            init_speed: 1.0,
            cores: vec![
                Core::new(14.0, 1.0, false, PI * 10.0),
                Core::new(10.0, 18.0, false, PI * 7.0),
                Core::new(15.0, 26.0, true, PI * 8.0),
                Core::new(25.0, 23.0, true, PI * 10.0),
                Core::new(13.0, 41.0, false, PI * 8.0),
                Core::new(40.0, 22.0, false, PI * 8.0),
                Core::new(36.0, 30.0, false, PI * 7.0),
                Core::new(37.0, 37.0, true, PI * 6.0),
            ],
            obstacles: vec![
                Obstacle::new(20.0, 36.0, 1.5),
                Obstacle::new(35.0, 19.0, 1.5),
                Obstacle::new(8.0, 25.0, 1.5),
                Obstacle::new(30.0, 33.0, 1.5),
            ],
        }
    }

    /// Still water without obstacles, with the same start and goal as
    /// [`Scenario::adverse_flow`].
    pub fn open_water() -> Self {
        Self {
            name: "open_water".to_string(),
            cores: vec![],
            obstacles: vec![],
            ..Self::adverse_flow()
        }
    }

    /// Returns the built-in scenario with the given name.
    pub fn by_name(name: &str) -> Result<Self> {
        match name {
            "adverse_flow" => Ok(Self::adverse_flow()),
            "open_water" => Ok(Self::open_water()),
            _ => Err(MarinavError::UnknownScenario(name.to_string()).into()),
        }
    }

    /// Constructs [`Scenario`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let scenario = serde_yaml::from_reader(rdr)?;
        Ok(scenario)
    }

    /// Saves [`Scenario`] as YAML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}

/// Writes a [`Scenario`] into environments.
pub struct ScenarioBuilder<'a> {
    scenario: &'a Scenario,
}

impl<'a> ScenarioBuilder<'a> {
    /// Constructs a builder for the scenario.
    pub fn new(scenario: &'a Scenario) -> Self {
        Self { scenario }
    }

    /// Replaces the layout of `env` with the scenario and returns the
    /// observation at the start.
    ///
    /// Hazards already in the environment are discarded. The robot starts
    /// drifting with the flow at the start position rather than at rest.
    pub fn apply<E: Env>(&self, env: &mut E) -> E::Obs {
        let s = self.scenario;
        let hazards = env.hazards_mut();
        hazards.clear();
        hazards.start = s.start;
        hazards.goal = s.goal;
        hazards.set_cores(s.cores.clone());
        hazards.set_obstacles(s.obstacles.clone());

        let current_v = env.velocity(s.start[0], s.start[1]);
        let robot = env.robot_mut();
        robot.set_init_theta(s.init_theta);
        robot.set_init_speed(s.init_speed);
        robot.reset_state(s.start[0], s.start[1], current_v);

        env.observation()
    }

    /// Applies the scenario to every environment, returning the observations
    /// in the order of the environments.
    pub fn apply_all<'e, E, I>(&self, envs: I) -> Vec<E::Obs>
    where
        E: Env + 'e,
        I: IntoIterator<Item = &'e mut E>,
    {
        let observations: Vec<_> = envs.into_iter().map(|env| self.apply(env)).collect();
        info!(
            "Applied scenario {:?} ({} cores, {} obstacles) to {} environments",
            self.scenario.name,
            self.scenario.cores.len(),
            self.scenario.obstacles.len(),
            observations.len()
        );
        observations
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{dummy::DummyEnv, Obs};
    use tempdir::TempDir;

    #[test]
    fn test_apply_replaces_previous_hazards() {
        let mut env = DummyEnv::new(10);
        ScenarioBuilder::new(&Scenario::adverse_flow()).apply(&mut env);
        assert_eq!(env.hazards().cores().len(), 8);
        assert_eq!(env.hazards().obstacles().len(), 4);

        ScenarioBuilder::new(&Scenario::open_water()).apply(&mut env);
        assert!(env.hazards().cores().is_empty());
        assert!(env.hazards().obstacles().is_empty());
        assert!(env.hazards().core_index().is_none());
        assert!(env.hazards().obstacle_index().is_none());
    }

    #[test]
    fn test_robot_starts_with_ambient_flow() {
        let mut env = DummyEnv::new(10).with_current([0.25, -0.5]);
        let obs = ScenarioBuilder::new(&Scenario::adverse_flow()).apply(&mut env);
        assert_eq!(env.robot().current_velocity, [0.25, -0.5]);
        assert_eq!(env.robot().init_theta, 3.0 * PI / 4.0);
        assert_eq!(obs.features()[..2], [15.0, 10.0]);
    }

    #[test]
    fn test_apply_all_keeps_environment_order() {
        let mut envs = vec![DummyEnv::new(3), DummyEnv::new(5)];
        let observations = ScenarioBuilder::new(&Scenario::open_water()).apply_all(envs.iter_mut());
        assert_eq!(observations.len(), 2);
        assert!(observations.iter().all(|o| o.features()[..2] == [15.0, 10.0]));
    }

    #[test]
    fn test_by_name_and_yaml_round_trip() -> Result<()> {
        assert!(Scenario::by_name("calm_lake").is_err());

        let scenario = Scenario::by_name("adverse_flow")?;
        let dir = TempDir::new("scenario")?;
        let path = dir.path().join("adverse_flow.yaml");
        scenario.save(&path)?;
        assert_eq!(Scenario::load(&path)?, scenario);
        Ok(())
    }
}
