//! Parsing of navigation observations.
use anyhow::Result;
use marinav_core::error::MarinavError;

/// View of an observation laid out as `[goal (2), velocity (2), sonar (2 per beam)]`
/// in the robot frame, where a beam that hit nothing reports `(0, 0)`.
#[derive(Debug, Clone, PartialEq)]
pub struct NavFeatures {
    /// Goal relative to the robot.
    pub goal: [f64; 2],

    /// Velocity over ground.
    pub velocity: [f64; 2],

    /// Reflection points of the beams.
    pub sonar: Vec<[f64; 2]>,
}

fn norm(v: [f64; 2]) -> f64 {
    (v[0] * v[0] + v[1] * v[1]).sqrt()
}

fn is_no_return(p: &[f64; 2]) -> bool {
    p[0].abs() < 1e-3 && p[1].abs() < 1e-3
}

impl NavFeatures {
    /// Parses a feature vector.
    pub fn parse(features: &[f64]) -> Result<Self> {
        if features.len() < 4 || features.len() % 2 != 0 {
            return Err(MarinavError::ShapeMismatch(format!(
                "navigation observation with {} features",
                features.len()
            ))
            .into());
        }
        Ok(Self {
            goal: [features[0], features[1]],
            velocity: [features[2], features[3]],
            sonar: features[4..].chunks(2).map(|p| [p[0], p[1]]).collect(),
        })
    }

    /// Beams that hit an obstacle.
    pub fn returns(&self) -> impl Iterator<Item = &[f64; 2]> + '_ {
        self.sonar.iter().filter(|p| !is_no_return(p))
    }

    /// The closest reflection point and its distance, if any beam hit.
    pub fn closest_return(&self) -> Option<([f64; 2], f64)> {
        self.returns().fold(None, |closest, p| {
            let d = norm(*p);
            match closest {
                Some((_, d_min)) if d_min <= d => closest,
                _ => Some((*p, d)),
            }
        })
    }
}

pub(crate) fn angle(v: [f64; 2]) -> f64 {
    v[1].atan2(v[0])
}

pub(crate) fn length(v: [f64; 2]) -> f64 {
    norm(v)
}

/// Wraps an angle into `[-π, π)`.
pub(crate) fn wrap_to_pi(mut a: f64) -> f64 {
    use std::f64::consts::PI;
    while a < -PI {
        a += 2.0 * PI;
    }
    while a >= PI {
        a -= 2.0 * PI;
    }
    a
}

/// Position of the value closest to `x`.
pub(crate) fn closest_index(values: &[f64], x: f64) -> usize {
    values
        .iter()
        .enumerate()
        .fold((0, f64::INFINITY), |(i_min, d_min), (i, v)| {
            let d = (v - x).abs();
            if d < d_min {
                (i, d)
            } else {
                (i_min, d_min)
            }
        })
        .0
}

/// Position of the largest value.
pub(crate) fn max_index(values: &[f64]) -> usize {
    values
        .iter()
        .enumerate()
        .fold((0, f64::NEG_INFINITY), |(i_max, v_max), (i, v)| {
            if *v > v_max {
                (i, *v)
            } else {
                (i_max, v_max)
            }
        })
        .0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_closest_return() -> Result<()> {
        let f = NavFeatures::parse(&[1.0, 2.0, 3.0, 4.0, 0.0, 0.0, 3.0, 4.0, 0.0, 2.0])?;
        assert_eq!(f.goal, [1.0, 2.0]);
        assert_eq!(f.sonar.len(), 3);
        assert_eq!(f.returns().count(), 2);
        assert_eq!(f.closest_return(), Some(([0.0, 2.0], 2.0)));

        assert!(NavFeatures::parse(&[1.0, 2.0, 3.0]).is_err());
        assert!(NavFeatures::parse(&[0.0; 5]).is_err());
        assert_eq!(NavFeatures::parse(&[0.0; 6])?.closest_return(), None);
        Ok(())
    }

    #[test]
    fn test_helpers() {
        assert_eq!(closest_index(&[-0.4, 0.0, 0.4], 0.15), 1);
        assert_eq!(closest_index(&[-0.4, 0.0, 0.4], 1.0), 2);
        assert_eq!(max_index(&[-0.4, 0.0, 0.4]), 2);
        assert!((wrap_to_pi(3.0 * std::f64::consts::PI / 2.0) + std::f64::consts::PI / 2.0).abs() < 1e-12);
    }
}
