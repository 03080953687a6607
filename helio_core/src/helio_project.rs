//! The "SHAPE" Engine - Projections onto Alternate Render Targets
//!
//! Stateless closed-form mappings from a unit direction (plus the cycle
//! time for the ring-shaped targets) to coordinates on the target
//! surface:
//! - **Plane**: stereographic projection from the "north pole", with an
//!   epsilon guard against the division blow-up at the opposite pole
//! - **Torus**: time walks the big circle, the stereographic offset
//!   places the point on the tube cross-section — "when" and "where" in
//!   one 3D point
//! - **Cylinder**: same major-angle convention around the shell; the
//!   offset supplies a tangential nudge and the vertical placement
//!
//! Pure functions, deterministic output for deterministic input.

use crate::vecmath::Direction;
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use std::f64::consts::{FRAC_PI_2, TAU};

/// Guard against the stereographic division blow-up at `y = -1`.
pub const PLANE_EPSILON: f64 = 0.01;

/// Fraction of the tube (minor) radius a full-strength offset reaches,
/// keeping the placed point off the tube wall.
pub const TUBE_FRACTION: f64 = 0.8;

/// Which surface receives the projected coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RenderTarget {
    /// Raw unit-sphere placement, no projection
    Sphere,
    /// Stereographic plane
    Plane,
    /// Time-indexed ring with cross-section placement
    Torus,
    /// Time-indexed shell with vertical placement
    Cylinder,
}

/// Torus ring dimensions.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TorusGeometry {
    pub major_radius: f64,
    pub minor_radius: f64,
}

impl Default for TorusGeometry {
    fn default() -> Self {
        Self {
            major_radius: 2.0,
            minor_radius: 0.75,
        }
    }
}

/// Cylinder shell dimensions.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CylinderGeometry {
    pub radius: f64,
    pub half_height: f64,
}

impl Default for CylinderGeometry {
    fn default() -> Self {
        Self {
            radius: 2.0,
            half_height: 1.0,
        }
    }
}

/// Static geometry for the ring-shaped targets.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ProjectionGeometry {
    pub torus: TorusGeometry,
    pub cylinder: CylinderGeometry,
}

/// Stereographic plane projection of a unit direction.
///
/// `scale = 1 / (1 + y + ε)`: directions near the pole (`y → 1`)
/// collapse toward the plane's center, directions near the opposite pole
/// spread outward, bounded by ε instead of diverging.
pub fn project_to_plane(direction: Direction) -> (f64, f64) {
    let scale = 1.0 / (1.0 + direction.y + PLANE_EPSILON);
    (direction.x * scale, direction.z * scale)
}

/// Angle around the big circle for cyclic time `t`.
///
/// Zero time sits at `-π/2` so the cycle starts at the ring's top.
pub fn major_angle(time: f64, cycle_duration: f64) -> f64 {
    (time / cycle_duration) * TAU - FRAC_PI_2
}

/// The direction's plane offset in polar form, distance clamped to 1.
fn clamped_offset(direction: Direction) -> (f64, f64) {
    let (px, pz) = project_to_plane(direction);
    let distance = px.hypot(pz).min(1.0);
    let angle = pz.atan2(px);
    (distance, angle)
}

/// Places a direction on a torus at the ring position for cyclic time
/// `t`.
///
/// The ring lies in the x-z plane with its normal on y; at `t = 0` the
/// ring center sits at `(major_radius, 0, 0)`. Tube-local x rides the
/// ring radius, tube-local y sits on the ring's normal axis.
pub fn project_to_torus(
    time: f64,
    cycle_duration: f64,
    direction: Direction,
    geometry: &TorusGeometry,
) -> Direction {
    let a = major_angle(time, cycle_duration);
    let (distance, angle) = clamped_offset(direction);
    let reach = distance * TUBE_FRACTION * geometry.minor_radius;
    let local_x = reach * angle.cos();
    let local_y = reach * angle.sin();

    Vector3::new(
        (geometry.major_radius + local_x) * -a.sin(),
        local_y,
        (geometry.major_radius + local_x) * -a.cos(),
    )
}

/// Places a direction on a cylinder shell at the angle for cyclic time
/// `t`.
///
/// Same major-angle convention as the torus. The tangential component of
/// the offset nudges the shell angle, the normal component sets the
/// height; the point always stays on the shell radius.
pub fn project_to_cylinder(
    time: f64,
    cycle_duration: f64,
    direction: Direction,
    geometry: &CylinderGeometry,
) -> Direction {
    let (distance, angle) = clamped_offset(direction);
    let tangent = distance * TUBE_FRACTION * angle.cos();
    let vertical = distance * TUBE_FRACTION * angle.sin();
    let a = major_angle(time, cycle_duration) + tangent / geometry.radius;

    Vector3::new(
        geometry.radius * -a.sin(),
        vertical * geometry.half_height,
        geometry.radius * -a.cos(),
    )
}

/// Applies the projection the active render target requires.
///
/// The sphere target passes the direction through untouched; the plane
/// embeds its 2D result at `y = 0`.
pub fn project(
    target: RenderTarget,
    time: f64,
    cycle_duration: f64,
    direction: Direction,
    geometry: &ProjectionGeometry,
) -> Direction {
    match target {
        RenderTarget::Sphere => direction,
        RenderTarget::Plane => {
            let (x, z) = project_to_plane(direction);
            Vector3::new(x, 0.0, z)
        }
        RenderTarget::Torus => project_to_torus(time, cycle_duration, direction, &geometry.torus),
        RenderTarget::Cylinder => {
            project_to_cylinder(time, cycle_duration, direction, &geometry.cylinder)
        }
    }
}
