use super::{Point2d, Vector2d};
use cgmath::prelude::*;

/// Computes the shortest distance between two phase offsets
/// measured around a cyclic timeline of length `cycle`.
///
/// The result is symmetric in `a` and `b` and never exceeds `cycle / 2`.
pub fn circular_diff(a: u32, b: u32, cycle: u32) -> u32 {
    if cycle == 0 {
        return 0;
    }
    let delta = (a % cycle).abs_diff(b % cycle);
    u32::min(delta, cycle - delta)
}

/// Gets the unit vector pointing from `from` towards `to`,
/// or the zero vector if the two points coincide.
pub fn direction_between(from: Point2d, to: Point2d) -> Vector2d {
    let delta = to - from;
    let mag = delta.magnitude();
    if mag > 0.0 {
        delta / mag
    } else {
        Vector2d::zero()
    }
}

/// Determines whether `point` lies strictly ahead of an observer
/// at `origin` heading along `dir`.
pub fn is_ahead(origin: Point2d, dir: Vector2d, point: Point2d) -> bool {
    (point - origin).dot(dir) > 0.0
}
