//! The "PATH" Engine - Spherical Linear Interpolation
//!
//! Produces a smoothly varying unit direction between two keyframe
//! directions via great-circle interpolation with constant angular
//! velocity. The same function serves both the per-tick direction lookup
//! and the offline generation of dense static-path samples, which keeps
//! the animated dot and any precomputed path overlay visually consistent.

use crate::helio_timeline::Timeline;
use crate::vecmath::{self, Direction};

/// Angular separations below this take the linear small-angle path.
pub const SLERP_EPSILON: f64 = 1e-3;

/// Interpolates between two unit directions along the great circle.
///
/// `cosθ` is clamped before `acos` so floating-point overshoot of `±1`
/// never raises a domain error; the function is total over unit-vector
/// pairs. When `θ < SLERP_EPSILON` the result is the linear blend
/// `a + (b - a)·t` without renormalization — at such separations the
/// deviation from unit length is below `θ²/8`.
pub fn interpolate_direction(a: Direction, b: Direction, t: f64) -> Direction {
    let cos_theta = a.dot(&b).clamp(-1.0, 1.0);
    let theta = cos_theta.acos();

    if theta < SLERP_EPSILON {
        return a + (b - a) * t;
    }

    let sin_theta = theta.sin();
    let w1 = ((1.0 - t) * theta).sin() / sin_theta;
    let w2 = (t * theta).sin() / sin_theta;
    a * w1 + b * w2
}

/// Looks up the direction at cyclic time `t` on a timeline.
///
/// Brackets, interpolates, then normalizes — the one place interpolation
/// output re-enters the unit-direction invariant.
pub fn direction_at(timeline: &Timeline, t: f64) -> Direction {
    let bracket = timeline.bracket(t);
    vecmath::normalize(interpolate_direction(
        bracket.prev.direction,
        bracket.next.direction,
        bracket.local_t,
    ))
}

/// Samples a full cycle of a timeline at evenly spaced times.
///
/// Used for drawing a static path overlay alongside the animated dot.
pub fn sample_path(timeline: &Timeline, samples: usize) -> Vec<Direction> {
    let cycle = timeline.cycle_duration();
    (0..samples)
        .map(|i| direction_at(timeline, cycle * i as f64 / samples as f64))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::helio_timeline::HOURS_PER_CYCLE;
    use crate::vecmath::angles_to_direction;
    use approx::assert_relative_eq;

    #[test]
    fn test_interpolation_endpoints() {
        let a = angles_to_direction(-0.5, 1.9 - std::f64::consts::PI);
        let b = angles_to_direction(-0.3, -1.9);

        let start = interpolate_direction(a, b, 0.0);
        let end = interpolate_direction(a, b, 1.0);
        assert_relative_eq!((start - a).norm(), 0.0, epsilon = 1e-12);
        assert_relative_eq!((end - b).norm(), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_interpolation_identical_directions() {
        let a = angles_to_direction(-0.7, 0.4);
        for i in 0..=10 {
            let t = i as f64 / 10.0;
            let result = interpolate_direction(a, a, t);
            assert_relative_eq!((result - a).norm(), 0.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_interpolation_stays_unit_length() {
        let a = angles_to_direction(-0.2, -2.0);
        let b = angles_to_direction(-1.3, 0.6);
        for i in 0..=20 {
            let t = i as f64 / 20.0;
            assert_relative_eq!(
                interpolate_direction(a, b, t).norm(),
                1.0,
                epsilon = 1e-12
            );
        }
    }

    #[test]
    fn test_small_angle_fallback_norm_bound() {
        // Just under the epsilon gate: the linear blend may denormalize,
        // but only slightly.
        let a = angles_to_direction(-0.5, 0.0);
        let b = angles_to_direction(-0.5 + 0.9e-3, 0.0);
        for i in 0..=10 {
            let t = i as f64 / 10.0;
            let norm = interpolate_direction(a, b, t).norm();
            assert!((norm - 1.0).abs() < 0.01, "norm {norm} out of bound");
        }
    }

    #[test]
    fn test_constant_angular_velocity() {
        let a = angles_to_direction(0.0, 0.0);
        let b = angles_to_direction(-1.2, 0.0);
        let quarter = interpolate_direction(a, b, 0.25);
        let half = interpolate_direction(a, b, 0.5);

        let theta = a.dot(&b).clamp(-1.0, 1.0).acos();
        assert_relative_eq!(a.dot(&quarter).acos(), theta * 0.25, epsilon = 1e-9);
        assert_relative_eq!(a.dot(&half).acos(), theta * 0.5, epsilon = 1e-9);
    }

    #[test]
    fn test_sample_path_matches_direction_at() {
        let tl = Timeline::build(
            vec![(0.0, [-0.5, 1.9 - std::f64::consts::PI]), (12.0, [-0.3, -1.9])],
            HOURS_PER_CYCLE,
        )
        .unwrap();

        let path = sample_path(&tl, 48);
        assert_eq!(path.len(), 48);
        for (i, p) in path.iter().enumerate() {
            let t = HOURS_PER_CYCLE * i as f64 / 48.0;
            assert_relative_eq!((p - direction_at(&tl, t)).norm(), 0.0);
            assert_relative_eq!(p.norm(), 1.0, epsilon = 1e-12);
        }
    }
}
