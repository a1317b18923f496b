//! Unicycle robot drifting with the flow.
use crate::config::RobotConfig;
use marinav_core::{
    record::{Record, RecordValue},
    Robot,
};
use std::f64::consts::PI;

/// Robot steered by discrete (linear acceleration, angular velocity) pairs.
///
/// Action `i` applies `accelerations[i / n_w]` and `angular_velocities[i % n_w]`,
/// where `n_w` is the number of angular velocities. The velocity over ground is
/// the steering velocity plus the flow velocity at the robot.
#[derive(Debug, Clone)]
pub struct MarineRobot {
    config: RobotConfig,
    init_theta: f64,
    init_speed: f64,

    /// Position.
    pub x: f64,

    /// Position.
    pub y: f64,

    /// Heading in `[0, 2π)`.
    pub theta: f64,

    /// Speed relative to the water.
    pub speed: f64,

    /// Velocity over ground.
    pub velocity: [f64; 2],

    trajectory: Vec<[f64; 2]>,
    actions: Vec<usize>,
}

fn max_abs(values: &[f64]) -> f64 {
    values.iter().fold(0.0, |m, v| v.abs().max(m))
}

fn scaled(v: f64, max: f64) -> f64 {
    if max > 0.0 {
        v.abs() / max
    } else {
        0.0
    }
}

fn wrap_angle(theta: f64) -> f64 {
    theta.rem_euclid(2.0 * PI)
}

impl MarineRobot {
    /// Constructs a robot at the origin.
    pub fn new(config: RobotConfig) -> Self {
        Self {
            config,
            init_theta: 0.0,
            init_speed: 0.0,
            x: 0.0,
            y: 0.0,
            theta: 0.0,
            speed: 0.0,
            velocity: [0.0, 0.0],
            trajectory: vec![],
            actions: vec![],
        }
    }

    /// Collision radius.
    pub fn radius(&self) -> f64 {
        self.config.radius
    }

    /// The number of discrete actions.
    pub fn n_actions(&self) -> usize {
        self.config.accelerations.len() * self.config.angular_velocities.len()
    }

    /// Linear acceleration and angular velocity of an action.
    pub fn action(&self, act: usize) -> (f64, f64) {
        let n_w = self.config.angular_velocities.len();
        (
            self.config.accelerations[act / n_w],
            self.config.angular_velocities[act % n_w],
        )
    }

    /// Position.
    pub fn position(&self) -> [f64; 2] {
        [self.x, self.y]
    }

    /// Expresses a vector given in the world frame in the robot frame.
    pub fn to_robot_frame(&self, v: [f64; 2]) -> [f64; 2] {
        let (s, c) = self.theta.sin_cos();
        [c * v[0] + s * v[1], -s * v[0] + c * v[1]]
    }

    fn update_velocity(&mut self, current_velocity: [f64; 2]) {
        let (s, c) = self.theta.sin_cos();
        self.velocity = [
            self.speed * c + current_velocity[0],
            self.speed * s + current_velocity[1],
        ];
    }

    /// Advances the robot by one sub-step.
    pub fn update_state(&mut self, act: usize, current_velocity: [f64; 2]) {
        let dt = self.config.dt;
        self.update_velocity(current_velocity);
        self.x += self.velocity[0] * dt;
        self.y += self.velocity[1] * dt;

        let (a, w) = self.action(act);
        self.speed = (self.speed + a * dt).max(0.0).min(self.config.max_speed);
        self.theta = wrap_angle(self.theta + w * dt);
    }

    /// Appends a decision to the history of the robot.
    pub fn log_decision(&mut self, act: usize) {
        self.actions.push(act);
        self.trajectory.push(self.position());
    }

    /// Trajectory and actions since the last reset.
    pub fn history(&self) -> Record {
        let xs = self.trajectory.iter().map(|p| p[0]).collect();
        let ys = self.trajectory.iter().map(|p| p[1]).collect();
        let actions = self.actions.iter().map(|a| *a as f64).collect();
        Record::from_slice(&[
            ("init_theta", RecordValue::Scalar(self.init_theta)),
            ("init_speed", RecordValue::Scalar(self.init_speed)),
            ("traj_x", RecordValue::Array1(xs)),
            ("traj_y", RecordValue::Array1(ys)),
            ("actions", RecordValue::Array1(actions)),
        ])
    }
}

impl Robot for MarineRobot {
    fn dt(&self) -> f64 {
        self.config.dt
    }

    fn n_substeps(&self) -> usize {
        self.config.n_substeps
    }

    /// Sum of the magnitudes of acceleration and angular velocity, each scaled
    /// by the largest magnitude available.
    fn action_energy_cost(&self, act: usize) -> f64 {
        let (a, w) = self.action(act);
        scaled(a, max_abs(&self.config.accelerations))
            + scaled(w, max_abs(&self.config.angular_velocities))
    }

    fn set_init_theta(&mut self, theta: f64) {
        self.init_theta = theta;
    }

    fn set_init_speed(&mut self, speed: f64) {
        self.init_speed = speed;
    }

    fn reset_state(&mut self, x: f64, y: f64, current_velocity: [f64; 2]) {
        self.x = x;
        self.y = y;
        self.theta = wrap_angle(self.init_theta);
        self.speed = self.init_speed.max(0.0).min(self.config.max_speed);
        self.update_velocity(current_velocity);
        self.trajectory = vec![self.position()];
        self.actions.clear();
    }
}
