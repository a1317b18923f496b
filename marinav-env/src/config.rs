//! Configuration of [`MarineNavEnv`](crate::MarineNavEnv).
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{
    f64::consts::PI,
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// Kinematic limits and action grid of the robot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RobotConfig {
    /// Length of a simulation sub-step.
    pub dt: f64,

    /// The number of sub-steps per decision.
    pub n_substeps: usize,

    /// Collision radius.
    pub radius: f64,

    /// Upper limit of the speed relative to the water.
    pub max_speed: f64,

    /// Linear accelerations of the action grid.
    pub accelerations: Vec<f64>,

    /// Angular velocities of the action grid.
    pub angular_velocities: Vec<f64>,
}

impl Default for RobotConfig {
    fn default() -> Self {
        Self {
            dt: 0.05,
            n_substeps: 10,
            radius: 0.8,
            max_speed: 2.0,
            accelerations: vec![-0.4, 0.0, 0.4],
            angular_velocities: vec![-PI / 6.0, 0.0, PI / 6.0],
        }
    }
}

/// Range sensor mounted on the robot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SonarConfig {
    /// The number of beams, spread evenly over the field of view.
    pub n_beams: usize,

    /// Field of view, centered at the heading.
    pub field_of_view: f64,

    /// Maximum detection range.
    pub range: f64,
}

impl Default for SonarConfig {
    fn default() -> Self {
        Self {
            n_beams: 7,
            field_of_view: PI / 2.0,
            range: 10.0,
        }
    }
}

/// Configuration of [`MarineNavEnv`](crate::MarineNavEnv).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarineNavConfig {
    /// Width of the map.
    pub width: f64,

    /// Height of the map.
    pub height: f64,

    /// Radius of the vortex cores. Inside of it the flow rotates rigidly.
    pub core_radius: f64,

    /// Distance to the goal at which the goal counts as reached.
    pub goal_distance: f64,

    /// Reward of every decision.
    pub timestep_penalty: f64,

    /// Reward added on collision.
    pub collision_penalty: f64,

    /// Reward added when reaching the goal.
    pub goal_reward: f64,

    /// Discount factor.
    pub discount: f64,

    /// Robot.
    pub robot: RobotConfig,

    /// Range sensor.
    pub sonar: SonarConfig,
}

impl Default for MarineNavConfig {
    fn default() -> Self {
        Self {
            width: 50.0,
            height: 50.0,
            core_radius: 0.5,
            goal_distance: 2.0,
            timestep_penalty: -1.0,
            collision_penalty: -50.0,
            goal_reward: 100.0,
            discount: 0.99,
            robot: RobotConfig::default(),
            sonar: SonarConfig::default(),
        }
    }
}

impl MarineNavConfig {
    /// Sets the size of the map.
    pub fn map_size(mut self, width: f64, height: f64) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Sets the distance at which the goal counts as reached.
    pub fn goal_distance(mut self, v: f64) -> Self {
        self.goal_distance = v;
        self
    }

    /// Sets the discount factor.
    pub fn discount(mut self, v: f64) -> Self {
        self.discount = v;
        self
    }

    /// Sets the configuration of the robot.
    pub fn robot(mut self, v: RobotConfig) -> Self {
        self.robot = v;
        self
    }

    /// Sets the configuration of the range sensor.
    pub fn sonar(mut self, v: SonarConfig) -> Self {
        self.sonar = v;
        self
    }

    /// The number of features of an observation.
    pub fn obs_dim(&self) -> usize {
        4 + 2 * self.sonar.n_beams
    }

    /// The number of discrete actions.
    pub fn n_actions(&self) -> usize {
        self.robot.accelerations.len() * self.robot.angular_velocities.len()
    }

    /// Constructs [`MarineNavConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let config = serde_yaml::from_reader(rdr)?;
        Ok(config)
    }

    /// Saves [`MarineNavConfig`] as YAML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempdir::TempDir;

    #[test]
    fn test_serde_config() -> Result<()> {
        let config = MarineNavConfig::default()
            .map_size(40.0, 30.0)
            .discount(0.95);
        let dir = TempDir::new("marine_nav_config")?;
        let path = dir.path().join("env.yaml");
        config.save(&path)?;
        assert_eq!(MarineNavConfig::load(&path)?, config);
        assert_eq!(config.obs_dim(), 18);
        assert_eq!(config.n_actions(), 9);
        Ok(())
    }
}
