//! Artificial potential field controller.
use crate::features::{angle, closest_index, length, max_index, wrap_to_pi, NavFeatures};
use anyhow::Result;
use marinav_core::{Env, Obs, ReactivePolicy};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Configuration of [`ApfAgent`].
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct ApfConfig {
    /// Attractive force constant.
    pub k_att: f64,

    /// Repulsive force constant.
    pub k_rep: f64,

    /// Mass of the robot, scaling forces to accelerations.
    pub mass: f64,

    /// Obstacles farther than this exert no force.
    pub d0: f64,

    /// Power of the goal distance in the repulsive force.
    pub n: i32,

    /// Below this speed over ground the robot always accelerates.
    pub min_velocity: f64,

    /// Linear accelerations of the action grid.
    pub accelerations: Vec<f64>,

    /// Angular velocities of the action grid.
    pub angular_velocities: Vec<f64>,
}

impl Default for ApfConfig {
    fn default() -> Self {
        Self {
            k_att: 50.0,
            k_rep: 500.0,
            mass: 500.0,
            d0: 10.0,
            n: 2,
            min_velocity: 1.0,
            accelerations: vec![-0.4, 0.0, 0.4],
            angular_velocities: vec![-PI / 6.0, 0.0, PI / 6.0],
        }
    }
}

/// Steers along the sum of an attraction to the goal and repulsions from
/// sonar returns.
///
/// The repulsion of a return at distance `d < d0` has a component away from
/// the return and, scaled by the goal distance, a component towards the goal,
/// so that the goal stays a minimum of the potential near obstacles.
pub struct ApfAgent {
    config: ApfConfig,
}

impl ApfAgent {
    /// Constructs the controller.
    pub fn new(config: ApfConfig) -> Self {
        Self { config }
    }

    /// Total force on the robot, in the robot frame.
    pub fn force(&self, f: &NavFeatures) -> [f64; 2] {
        let c = &self.config;
        let d_goal = length(f.goal);
        if d_goal == 0.0 {
            return [0.0, 0.0];
        }
        let goal_dir = [f.goal[0] / d_goal, f.goal[1] / d_goal];
        let mut force = [c.k_att * goal_dir[0], c.k_att * goal_dir[1]];

        for p in f.returns() {
            let d_obs = length(*p);
            if d_obs >= c.d0 {
                continue;
            }
            let proximity = 1.0 / d_obs - 1.0 / c.d0;
            let away = c.k_rep * proximity * d_goal.powi(c.n) / (d_obs * d_obs);
            let toward = 0.5 * c.n as f64 * c.k_rep * proximity * proximity * d_goal.powi(c.n - 1);
            force[0] += -away * p[0] / d_obs + toward * goal_dir[0];
            force[1] += -away * p[1] / d_obs + toward * goal_dir[1];
        }
        force
    }

    fn act_(&self, f: &NavFeatures) -> usize {
        let c = &self.config;
        let force = self.force(f);
        let speed = length(f.velocity);
        let v_angle = if speed > 1e-3 { angle(f.velocity) } else { 0.0 };
        let diff = wrap_to_pi(angle(force) - v_angle);

        let w_ix = closest_index(&c.angular_velocities, diff);
        let a_ix = if speed < c.min_velocity {
            max_index(&c.accelerations)
        } else {
            closest_index(&c.accelerations, length(force) / c.mass * diff.cos())
        };
        a_ix * c.angular_velocities.len() + w_ix
    }
}

impl<E: Env> ReactivePolicy<E> for ApfAgent {
    fn act(&mut self, obs: &E::Obs) -> Result<usize> {
        Ok(self.act_(&NavFeatures::parse(obs.features())?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn features(goal: [f64; 2], velocity: [f64; 2], sonar: &[[f64; 2]]) -> NavFeatures {
        NavFeatures {
            goal,
            velocity,
            sonar: sonar.to_vec(),
        }
    }

    #[test]
    fn test_turns_towards_goal() {
        let agent = ApfAgent::new(ApfConfig::default());
        // goal on the left, moving ahead
        assert_eq!(agent.act_(&features([0.0, 10.0], [1.5, 0.0], &[])), 5);
        // goal on the right
        assert_eq!(agent.act_(&features([0.0, -10.0], [1.5, 0.0], &[])), 3);
        // goal straight ahead
        assert_eq!(agent.act_(&features([10.0, 0.0], [1.5, 0.0], &[])), 4);
    }

    #[test]
    fn test_accelerates_when_slow() {
        let agent = ApfAgent::new(ApfConfig::default());
        assert_eq!(agent.act_(&features([10.0, 0.0], [0.2, 0.0], &[])), 7);
    }

    #[test]
    fn test_return_ahead_repels() {
        let agent = ApfAgent::new(ApfConfig::default());
        let free = agent.force(&features([20.0, 0.0], [1.0, 0.0], &[]));
        let blocked = agent.force(&features(
            [20.0, 0.0],
            [1.0, 0.0],
            &[[0.0, 0.0], [2.0, 0.5]],
        ));
        assert!(blocked[0] < free[0]);
        assert!(blocked[1] < 0.0);

        // returns beyond d0 are ignored
        let far = agent.force(&features([20.0, 0.0], [1.0, 0.0], &[[10.5, 0.0]]));
        assert_eq!(far, free);
    }
}
