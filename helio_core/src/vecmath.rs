//! Pure direction math shared by every engine in this crate.
//!
//! A direction is a unit `Vector3<f64>`. The free functions here pin down
//! the crate's conventions (y is "up", the horizontal angle swings from
//! behind-left to ahead-right) so the engines never disagree on them.

use nalgebra::Vector3;

/// A unit vector in 3D space. Normalized after every computation that
/// could denormalize it.
pub type Direction = Vector3<f64>;

/// Normalizes a vector, returning it unchanged when its norm is zero.
pub fn normalize(v: Direction) -> Direction {
    let n = v.norm();
    if n > 0.0 {
        v / n
    } else {
        v
    }
}

/// Dot product of two directions.
#[inline]
pub fn dot(a: Direction, b: Direction) -> f64 {
    a.dot(&b)
}

/// Cross product of two directions.
#[inline]
pub fn cross(a: Direction, b: Direction) -> Direction {
    a.cross(&b)
}

/// Component-wise difference `a - b`.
#[inline]
pub fn sub(a: Direction, b: Direction) -> Direction {
    a - b
}

/// Converts a (vertical, horizontal) angle pair in radians to a unit
/// direction.
///
/// Documented domains of the raw data: `vertical ∈ [-π/2, 0)` (negative
/// is above the horizon), `horizontal ∈ (-3π/4, π/4)`. The mapping is
///
/// ```text
/// x = cos(vertical) * -sin(horizontal)
/// z = cos(vertical) *  cos(horizontal)
/// y = -sin(vertical)
/// ```
///
/// followed by normalization.
pub fn angles_to_direction(vertical: f64, horizontal: f64) -> Direction {
    let x = vertical.cos() * -horizontal.sin();
    let z = vertical.cos() * horizontal.cos();
    let y = -vertical.sin();
    normalize(Vector3::new(x, y, z))
}
