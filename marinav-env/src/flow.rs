//! Flow field of Rankine vortices.
use marinav_core::hazard::{Core, HazardField};
use std::f64::consts::PI;

/// Tangential speed of a Rankine vortex at distance `d` from its center.
///
/// Inside of the core the fluid rotates like a rigid body, outside of it the
/// speed decays with `1 / d`.
pub fn rankine_speed(strength: f64, core_radius: f64, d: f64) -> f64 {
    if d <= core_radius {
        strength / (2.0 * PI * core_radius * core_radius) * d
    } else {
        strength / (2.0 * PI * d)
    }
}

fn tangential(core: &Core, radial: [f64; 2], d: f64) -> [f64; 2] {
    // `radial` points from the query point to the core
    let [rx, ry] = [radial[0] / d, radial[1] / d];
    if core.clockwise {
        [-ry, rx]
    } else {
        [ry, -rx]
    }
}

/// Flow velocity at `(x, y)`.
///
/// Cores are visited closest first. A core contributes only if it does not lie
/// behind a core that already contributed, i.e. if its direction from the
/// query point has no positive component along the direction of any counted
/// core.
pub fn velocity(hazards: &HazardField, core_radius: f64, x: f64, y: f64) -> [f64; 2] {
    let index = match hazards.core_index() {
        Some(index) => index,
        None => return [0.0, 0.0],
    };

    let mut counted: Vec<[f64; 2]> = vec![];
    let mut v = [0.0, 0.0];
    for (ix, d) in index.nearest_first([x, y]) {
        let core = &hazards.cores()[ix];
        let radial = [core.x - x, core.y - y];
        let occluded = counted
            .iter()
            .any(|c| c[0] * radial[0] + c[1] * radial[1] > 0.0);
        if occluded {
            continue;
        }
        counted.push(radial);
        if d == 0.0 {
            continue;
        }

        let speed = rankine_speed(core.strength, core_radius, d);
        let t = tangential(core, radial, d);
        v[0] += speed * t[0];
        v[1] += speed * t[1];
    }
    v
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(cores: Vec<Core>) -> HazardField {
        let mut field = HazardField::default();
        field.set_cores(cores);
        field
    }

    fn norm(v: [f64; 2]) -> f64 {
        (v[0] * v[0] + v[1] * v[1]).sqrt()
    }

    #[test]
    fn test_still_water_without_cores() {
        assert_eq!(velocity(&HazardField::default(), 0.5, 3.0, 4.0), [0.0, 0.0]);
    }

    #[test]
    fn test_rankine_profile() {
        let strength = PI * 10.0;
        assert_eq!(rankine_speed(strength, 0.5, 0.0), 0.0);
        // continuous at the core boundary
        let inside = rankine_speed(strength, 0.5, 0.5);
        let outside = rankine_speed(strength, 0.5, 0.5 + 1e-9);
        assert!((inside - outside).abs() < 1e-6);
        assert!((rankine_speed(strength, 0.5, 5.0) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_rotation_direction() {
        // core to the east of the query point
        let ccw = field(vec![Core::new(5.0, 0.0, false, PI * 10.0)]);
        let v = velocity(&ccw, 0.5, 0.0, 0.0);
        assert!(v[0].abs() < 1e-12);
        assert!((v[1] + 1.0).abs() < 1e-12);

        let cw = field(vec![Core::new(5.0, 0.0, true, PI * 10.0)]);
        let v = velocity(&cw, 0.5, 0.0, 0.0);
        assert!((v[1] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_core_behind_closer_core_is_occluded() {
        let near = Core::new(5.0, 0.0, false, PI * 10.0);
        let far = Core::new(10.0, 1.0, true, PI * 40.0);
        let v_near = velocity(&field(vec![near]), 0.5, 0.0, 0.0);
        let v_both = velocity(&field(vec![far, near]), 0.5, 0.0, 0.0);
        assert_eq!(v_near, v_both);

        // a core on the opposite side contributes
        let opposite = Core::new(-5.0, 0.0, false, PI * 10.0);
        let v = velocity(&field(vec![near, opposite]), 0.5, 0.0, 0.0);
        assert!(norm(v) < 1e-12);
    }
}
