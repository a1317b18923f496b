//! Robot.

/// Kinematic and energy accessors of the simulated vehicle.
pub trait Robot {
    /// Length of a simulation sub-step.
    fn dt(&self) -> f64;

    /// The number of simulation sub-steps per decision.
    fn n_substeps(&self) -> usize;

    /// Energy consumed by applying the given action for one decision.
    fn action_energy_cost(&self, act: usize) -> f64;

    /// Sets the heading the robot starts with.
    fn set_init_theta(&mut self, theta: f64);

    /// Sets the speed the robot starts with.
    fn set_init_speed(&mut self, speed: f64);

    /// Places the robot at `(x, y)` with its initial heading and speed,
    /// drifting with `current_velocity`.
    fn reset_state(&mut self, x: f64, y: f64, current_velocity: [f64; 2]);
}
