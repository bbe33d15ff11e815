use crate::config::SignalConfig;
use crate::genome::Gene;
use crate::math::{Point2d, Vector2d};
use crate::Intersection;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A fixed-time traffic signal at a single intersection.
///
/// The signal controls one [Axis] directly; the other axis is always shown
/// the complementary state. The state is a pure function of the simulation
/// time, so the only stored state is a cached copy for renderers.
#[derive(Clone, Debug)]
pub struct SignalPhase {
    /// The ID of the intersection.
    intersection: usize,
    /// The position of the intersection.
    position: Point2d,
    /// The directly controlled axis.
    axis: Axis,
    /// The green duration of the controlled axis.
    green: u32,
    /// The yellow duration of the controlled axis.
    yellow: u32,
    /// The phase shift applied to the simulation time.
    offset: u32,
    /// The length of the full cycle.
    cycle: u32,
    /// The state of the controlled axis as of the last call to `step`.
    state: LightState,
}

/// The state of one axis of a signal.
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum LightState {
    Red,
    Yellow,
    Green,
}

/// A direction of travel through an intersection.
#[derive(PartialEq, Eq, Clone, Copy, Debug, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Axis {
    NorthSouth,
    EastWest,
}

/// The states shown to both axes of a signal.
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub struct SignalStates {
    pub north_south: LightState,
    pub east_west: LightState,
}

impl Axis {
    /// The orthogonal axis.
    pub fn other(self) -> Self {
        match self {
            Axis::NorthSouth => Axis::EastWest,
            Axis::EastWest => Axis::NorthSouth,
        }
    }

    /// The primary axis of travel for a heading.
    /// Diagonal headings count as east-west.
    pub fn of_direction(dir: Vector2d) -> Self {
        if dir.y.abs() > dir.x.abs() {
            Axis::NorthSouth
        } else {
            Axis::EastWest
        }
    }
}

impl LightState {
    /// The state shown to the axis orthogonal to one in this state.
    pub fn complement(self) -> Self {
        match self {
            LightState::Green | LightState::Yellow => LightState::Red,
            LightState::Red => LightState::Green,
        }
    }

    /// Whether a vehicle approaching a signal in this state must stop.
    pub fn must_stop(self) -> bool {
        self != LightState::Green
    }
}

impl SignalStates {
    /// Gets the state shown to the given axis.
    pub fn get(&self, axis: Axis) -> LightState {
        match axis {
            Axis::NorthSouth => self.north_south,
            Axis::EastWest => self.east_west,
        }
    }
}

impl SignalPhase {
    /// Creates a signal at the given intersection.
    /// The timing is clamped into the legal range of `config`.
    pub fn new(intersection: &Intersection, axis: Axis, config: &SignalConfig, gene: Gene) -> Self {
        let mut signal = Self {
            intersection: intersection.id(),
            position: intersection.position(),
            axis,
            green: 0,
            yellow: config.yellow_duration,
            offset: 0,
            cycle: config.cycle_length,
            state: LightState::Red,
        };
        signal.set_timing(gene, config);
        signal.step(0.0);
        signal
    }

    /// The ID of the intersection this signal controls.
    pub fn intersection(&self) -> usize {
        self.intersection
    }

    /// The world position of the signal.
    pub fn position(&self) -> Point2d {
        self.position
    }

    /// The directly controlled axis.
    pub fn axis(&self) -> Axis {
        self.axis
    }

    /// The green duration of the controlled axis.
    pub fn green_duration(&self) -> u32 {
        self.green
    }

    /// The yellow duration of the controlled axis.
    pub fn yellow_duration(&self) -> u32 {
        self.yellow
    }

    /// The phase offset.
    pub fn offset(&self) -> u32 {
        self.offset
    }

    /// The cycle length.
    pub fn cycle_length(&self) -> u32 {
        self.cycle
    }

    /// The current timing expressed as a gene.
    pub fn gene(&self) -> Gene {
        Gene::new(self.green, self.offset)
    }

    /// Computes the state of the controlled axis at the given time.
    pub fn state_at(&self, time: f64) -> LightState {
        let effective = (time + self.offset as f64).rem_euclid(self.cycle as f64);
        if effective < self.green as f64 {
            LightState::Green
        } else if effective < (self.green + self.yellow) as f64 {
            LightState::Yellow
        } else {
            LightState::Red
        }
    }

    /// Computes the states of both axes at the given time.
    pub fn states_at(&self, time: f64) -> SignalStates {
        self.states_for(self.state_at(time))
    }

    /// The state of the controlled axis as of the last simulation step.
    pub fn state(&self) -> LightState {
        self.state
    }

    /// The states of both axes as of the last simulation step.
    pub fn states(&self) -> SignalStates {
        self.states_for(self.state)
    }

    /// Refreshes the cached state for the given simulation time.
    pub(crate) fn step(&mut self, time: f64) {
        self.state = self.state_at(time);
    }

    /// Replaces the green duration and offset, clamping them into the legal range.
    /// Returns `true` iff the gene had to be altered.
    pub(crate) fn set_timing(&mut self, gene: Gene, config: &SignalConfig) -> bool {
        let legal = gene.clamped(config);
        self.green = legal.green;
        self.offset = legal.offset;
        legal != gene
    }

    fn states_for(&self, controlled: LightState) -> SignalStates {
        let other = controlled.complement();
        match self.axis {
            Axis::NorthSouth => SignalStates {
                north_south: controlled,
                east_west: other,
            },
            Axis::EastWest => SignalStates {
                north_south: other,
                east_west: controlled,
            },
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::config::SignalConfig;
    use crate::math::Point2d;

    fn signal(axis: Axis, green: u32, offset: u32) -> SignalPhase {
        let intersection = Intersection::new(0, Point2d::new(0.0, 0.0), 0, 0);
        SignalPhase::new(&intersection, axis, &SignalConfig::default(), Gene::new(green, offset))
    }

    #[test]
    fn offset_shifts_the_cycle() {
        let light = signal(Axis::NorthSouth, 30, 10);
        assert_eq!(light.state_at(19.0), LightState::Green);
        assert_eq!(light.state_at(20.0), LightState::Yellow);
        assert_eq!(light.state_at(23.0), LightState::Red);
        assert_eq!(light.state_at(50.0), LightState::Green);
    }

    #[test]
    fn east_west_controller_inverts_north_south() {
        let light = signal(Axis::EastWest, 30, 0);
        let states = light.states_at(5.0);
        assert_eq!(states.east_west, LightState::Green);
        assert_eq!(states.north_south, LightState::Red);
        let states = light.states_at(45.0);
        assert_eq!(states.east_west, LightState::Red);
        assert_eq!(states.north_south, LightState::Green);
    }

    #[test]
    fn timing_is_clamped() {
        let light = signal(Axis::NorthSouth, 90, 75);
        assert_eq!(light.green_duration(), 55);
        assert_eq!(light.offset(), 15);
    }

    #[test]
    fn primary_axis_of_heading() {
        assert_eq!(Axis::of_direction(Vector2d::new(0.2, -0.9)), Axis::NorthSouth);
        assert_eq!(Axis::of_direction(Vector2d::new(-1.0, 0.0)), Axis::EastWest);
    }
}
