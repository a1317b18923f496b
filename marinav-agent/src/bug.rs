//! Bug-style controller.
use crate::features::{angle, closest_index, length, max_index, wrap_to_pi, NavFeatures};
use anyhow::Result;
use marinav_core::{Env, Obs, ReactivePolicy};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Configuration of [`BugAgent`].
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct BugConfig {
    /// Returns closer than this switch the robot to obstacle avoidance.
    pub d0: f64,

    /// Below this speed over ground the robot accelerates.
    pub min_velocity: f64,

    /// Linear accelerations of the action grid.
    pub accelerations: Vec<f64>,

    /// Angular velocities of the action grid.
    pub angular_velocities: Vec<f64>,
}

impl Default for BugConfig {
    fn default() -> Self {
        Self {
            d0: 3.0,
            min_velocity: 1.0,
            accelerations: vec![-0.4, 0.0, 0.4],
            angular_velocities: vec![-PI / 6.0, 0.0, PI / 6.0],
        }
    }
}

/// Heads for the goal until an obstacle comes closer than `d0`, then keeps the
/// obstacle abeam by steering perpendicular to the closest return, away from
/// its side.
pub struct BugAgent {
    config: BugConfig,
}

impl BugAgent {
    /// Constructs the controller.
    pub fn new(config: BugConfig) -> Self {
        Self { config }
    }

    /// Target direction in the robot frame.
    pub fn target_angle(&self, f: &NavFeatures) -> f64 {
        match f.closest_return() {
            Some((p, d)) if d < self.config.d0 => {
                let obs_angle = angle(p);
                if obs_angle > 0.0 {
                    obs_angle - PI / 2.0
                } else {
                    obs_angle + PI / 2.0
                }
            }
            _ => angle(f.goal),
        }
    }

    fn act_(&self, f: &NavFeatures) -> usize {
        let c = &self.config;
        let speed = length(f.velocity);
        let v_angle = if speed > 1e-3 { angle(f.velocity) } else { 0.0 };
        let diff = wrap_to_pi(self.target_angle(f) - v_angle);

        let w_ix = closest_index(&c.angular_velocities, diff);
        let a_ix = if speed < c.min_velocity {
            max_index(&c.accelerations)
        } else {
            closest_index(&c.accelerations, 0.0)
        };
        a_ix * c.angular_velocities.len() + w_ix
    }
}

impl<E: Env> ReactivePolicy<E> for BugAgent {
    fn act(&mut self, obs: &E::Obs) -> Result<usize> {
        Ok(self.act_(&NavFeatures::parse(obs.features())?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use marinav_core::dummy::{DummyEnv, DummyObs};

    fn features(goal: [f64; 2], sonar: &[[f64; 2]]) -> NavFeatures {
        NavFeatures {
            goal,
            velocity: [1.5, 0.0],
            sonar: sonar.to_vec(),
        }
    }

    #[test]
    fn test_heads_for_goal_in_free_water() {
        let agent = BugAgent::new(BugConfig::default());
        assert_eq!(agent.act_(&features([10.0, 0.0], &[[0.0, 0.0]])), 4);
        assert_eq!(agent.act_(&features([0.0, 10.0], &[[5.0, 1.0]])), 5);
    }

    #[test]
    fn test_turns_away_from_close_obstacle() {
        let agent = BugAgent::new(BugConfig::default());
        // obstacle ahead on the left, goal ahead
        let f = features([10.0, 0.0], &[[2.0, 0.5], [0.0, 0.0]]);
        assert!(agent.target_angle(&f) < 0.0);
        assert_eq!(agent.act_(&f), 3);

        // obstacle ahead on the right
        let f = features([10.0, 0.0], &[[2.0, -0.5]]);
        assert!(agent.target_angle(&f) > 0.0);
        assert_eq!(agent.act_(&f), 5);
    }

    #[test]
    fn test_rejects_malformed_observation() {
        let mut agent = BugAgent::new(BugConfig::default());
        let result = ReactivePolicy::<DummyEnv>::act(&mut agent, &DummyObs(vec![1.0, 2.0, 3.0]));
        assert!(result.is_err());
    }
}
