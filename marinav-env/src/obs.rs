//! Observation of [`MarineNavEnv`](crate::MarineNavEnv).
use marinav_core::Obs;

/// Observation in the robot frame.
///
/// Features are laid out as `[goal (2), velocity (2), sonar (2 per beam)]`.
/// The goal is relative to the robot, the velocity is over ground. Each beam
/// reports the point where it hit an obstacle, or `(0, 0)` if it hit nothing.
#[derive(Debug, Clone, PartialEq)]
pub struct MarineNavObs {
    features: Vec<f64>,
}

impl MarineNavObs {
    /// Constructs an observation from its parts.
    pub fn new(goal: [f64; 2], velocity: [f64; 2], sonar: &[[f64; 2]]) -> Self {
        let mut features = Vec::with_capacity(4 + 2 * sonar.len());
        features.extend_from_slice(&goal);
        features.extend_from_slice(&velocity);
        for p in sonar.iter() {
            features.extend_from_slice(p);
        }
        Self { features }
    }

    /// Goal relative to the robot.
    pub fn goal(&self) -> [f64; 2] {
        [self.features[0], self.features[1]]
    }

    /// Velocity over ground.
    pub fn velocity(&self) -> [f64; 2] {
        [self.features[2], self.features[3]]
    }

    /// Reflection points of the beams.
    pub fn sonar(&self) -> impl Iterator<Item = [f64; 2]> + '_ {
        self.features[4..].chunks(2).map(|p| [p[0], p[1]])
    }
}

impl Obs for MarineNavObs {
    fn features(&self) -> &[f64] {
        &self.features
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout() {
        let obs = MarineNavObs::new([1.0, 2.0], [3.0, 4.0], &[[5.0, 6.0], [0.0, 0.0]]);
        assert_eq!(obs.features(), &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 0.0, 0.0]);
        assert_eq!(obs.goal(), [1.0, 2.0]);
        assert_eq!(obs.velocity(), [3.0, 4.0]);
        assert_eq!(obs.sonar().collect::<Vec<_>>(), vec![[5.0, 6.0], [0.0, 0.0]]);
    }
}
