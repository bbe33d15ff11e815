use crate::light::Axis;
use crate::math::{direction_between, Point2d, Vector2d};
use cgmath::prelude::*;
use rand::Rng;

/// A straight lane of traffic crossing the whole grid.
///
/// Lanes are two-way for the purposes of spawning: a vehicle may enter
/// at either end and travels towards the opposite one.
#[derive(Clone, Debug, PartialEq)]
pub struct Lane {
    /// One end of the lane.
    start: Point2d,
    /// The other end of the lane.
    end: Point2d,
    /// The axis the lane runs along.
    axis: Axis,
}

/// Where a newly spawned vehicle starts and where it is headed.
#[derive(Clone, Copy, Debug)]
pub struct Route {
    pub origin: Point2d,
    pub target: Point2d,
}

impl Lane {
    /// Creates a new lane between two points.
    pub fn new(start: Point2d, end: Point2d) -> Self {
        Self {
            start,
            end,
            axis: Axis::of_direction(end - start),
        }
    }

    /// The start of the lane.
    pub fn start(&self) -> Point2d {
        self.start
    }

    /// The end of the lane.
    pub fn end(&self) -> Point2d {
        self.end
    }

    /// The axis the lane runs along.
    pub fn axis(&self) -> Axis {
        self.axis
    }

    /// Gets the length of the lane.
    pub fn length(&self) -> f64 {
        self.start.distance(self.end)
    }

    /// A unit vector pointing from the start of the lane to its end.
    pub fn direction(&self) -> Vector2d {
        direction_between(self.start, self.end)
    }

    /// Picks a random end of the lane to enter from.
    ///
    /// # Parameters
    /// * `margin` - How far before the chosen end the vehicle appears.
    /// * `overshoot` - How far past the opposite end the target lies.
    pub fn random_route(&self, rng: &mut impl Rng, margin: f64, overshoot: f64) -> Route {
        let dir = self.direction();
        if rng.gen_bool(0.5) {
            Route {
                origin: self.start - margin * dir,
                target: self.end + overshoot * dir,
            }
        } else {
            Route {
                origin: self.end + margin * dir,
                target: self.start - overshoot * dir,
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use assert_approx_eq::assert_approx_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn routes_cross_the_whole_lane() {
        let lane = Lane::new(Point2d::new(0.0, 188.0), Point2d::new(1100.0, 188.0));
        assert_eq!(lane.axis(), Axis::EastWest);
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..20 {
            let route = lane.random_route(&mut rng, 40.0, 100.0);
            assert_approx_eq!(route.origin.y, 188.0);
            assert_approx_eq!(route.target.y, 188.0);
            assert_approx_eq!((route.target.x - route.origin.x).abs(), 1240.0);
        }
    }
}
