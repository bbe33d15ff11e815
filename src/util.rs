//! Miscellaneous utility structs and functions.

use std::fmt::Debug;

use rand::distributions::uniform::SampleUniform;
use rand::Rng;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A closed interval on the real number line.
#[derive(Copy, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Interval<T> {
    pub min: T,
    pub max: T,
}

impl<T> Interval<T> {
    /// Creates a new interval.
    pub const fn new(min: T, max: T) -> Self {
        Self { min, max }
    }
}

impl<T: PartialOrd> Interval<T> {
    /// Returns true if this interval contains the value.
    pub fn contains(&self, value: T) -> bool {
        value >= self.min && value <= self.max
    }

    /// Returns true if `min` does not exceed `max`.
    pub fn is_ordered(&self) -> bool {
        self.min <= self.max
    }
}

impl<T: PartialOrd + Copy> Interval<T> {
    /// Restricts a value to lie within the interval.
    pub fn clamp(&self, value: T) -> T {
        if value < self.min {
            self.min
        } else if value > self.max {
            self.max
        } else {
            value
        }
    }
}

impl<T: std::ops::Sub<T, Output = T> + Copy> Interval<T> {
    /// Gets the magnitude of the interval.
    pub fn length(&self) -> T {
        self.max - self.min
    }
}

impl<T: SampleUniform + PartialOrd + Copy> Interval<T> {
    /// Draws a value uniformly from the interval, bounds included.
    pub fn sample(&self, rng: &mut impl Rng) -> T {
        rng.gen_range(self.min..=self.max)
    }
}

impl Interval<f64> {
    /// Creates an interval with the given centre and radius.
    pub fn disc(centre: f64, radius: f64) -> Self {
        Self {
            min: centre - radius,
            max: centre + radius,
        }
    }

    /// Returns the centre/mid-point of the interval.
    pub fn midpoint(&self) -> f64 {
        0.5 * (self.min + self.max)
    }

    /// Computes the distance between a point and the interval.
    /// Will be negative if the point is within the interval.
    pub fn distance(&self, value: f64) -> f64 {
        f64::max(value - self.max, self.min - value)
    }
}

impl<T: Debug> Debug for Interval<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Interval({:?}, {:?})", &self.min, &self.max)
    }
}

#[cfg(test)]
mod test {
    use super::Interval;
    use assert_approx_eq::assert_approx_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn clamp_and_contains() {
        let range = Interval::new(20, 55);
        assert_eq!(range.clamp(5), 20);
        assert_eq!(range.clamp(70), 55);
        assert_eq!(range.clamp(33), 33);
        assert!(range.contains(20));
        assert!(range.contains(55));
        assert!(!range.contains(56));
    }

    #[test]
    fn distance_is_signed() {
        let band = Interval::disc(10.0, 3.0);
        assert_approx_eq!(band.distance(10.0), -3.0);
        assert_approx_eq!(band.distance(15.0), 2.0);
        assert_approx_eq!(band.distance(4.0), 3.0);
        assert_approx_eq!(band.midpoint(), 10.0);
    }

    #[test]
    fn samples_stay_inside() {
        let mut rng = StdRng::seed_from_u64(7);
        let range = Interval::new(1.7, 2.9);
        for _ in 0..1000 {
            assert!(range.contains(range.sample(&mut rng)));
        }
    }
}
