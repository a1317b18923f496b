//! Range sensor.
use crate::config::SonarConfig;
use marinav_core::hazard::{HazardField, Obstacle};

/// Distance along the unit ray `p + t u` to the boundary of `obstacle`.
fn ray_distance(p: [f64; 2], u: [f64; 2], obstacle: &Obstacle) -> Option<f64> {
    let m = [p[0] - obstacle.x, p[1] - obstacle.y];
    let b = m[0] * u[0] + m[1] * u[1];
    let c = m[0] * m[0] + m[1] * m[1] - obstacle.r * obstacle.r;
    let disc = b * b - c;
    if disc < 0.0 {
        return None;
    }
    let sqrt = disc.sqrt();
    let t = if -b - sqrt >= 0.0 { -b - sqrt } else { -b + sqrt };
    if t >= 0.0 {
        Some(t)
    } else {
        None
    }
}

/// Beam angles relative to the heading.
pub fn beam_angles(config: &SonarConfig) -> Vec<f64> {
    match config.n_beams {
        0 => vec![],
        1 => vec![0.0],
        n => (0..n)
            .map(|i| -config.field_of_view / 2.0 + i as f64 * config.field_of_view / (n - 1) as f64)
            .collect(),
    }
}

/// Casts the beams from `p` with heading `theta`.
///
/// Returns one point per beam in the robot frame: where the beam hit the
/// closest obstacle within range, or `(0, 0)`.
pub fn scan(config: &SonarConfig, hazards: &HazardField, p: [f64; 2], theta: f64) -> Vec<[f64; 2]> {
    let angles = beam_angles(config);
    let index = match hazards.obstacle_index() {
        Some(index) => index,
        None => return vec![[0.0, 0.0]; angles.len()],
    };

    let max_r = hazards.obstacles().iter().fold(0.0f64, |m, o| m.max(o.r));
    let candidates = index.within(p, config.range + max_r);

    angles
        .iter()
        .map(|phi| {
            let u = [(theta + phi).cos(), (theta + phi).sin()];
            let closest = candidates
                .iter()
                .filter_map(|ix| ray_distance(p, u, &hazards.obstacles()[*ix]))
                .filter(|t| *t <= config.range)
                .fold(None, |m: Option<f64>, t| Some(m.map_or(t, |m| m.min(t))));
            match closest {
                Some(t) => [t * phi.cos(), t * phi.sin()],
                None => [0.0, 0.0],
            }
        })
        .collect()
}
