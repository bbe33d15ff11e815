use crate::config::SensorConfig;
use crate::light::{Axis, SignalPhase};
use crate::math::{direction_between, is_ahead, Point2d, Vector2d};
use crate::VehicleId;
use cgmath::prelude::*;

/// A simulated vehicle.
///
/// Vehicles travel in a straight line towards their target and only
/// react to signals; they do not follow or avoid each other.
#[derive(Clone, Debug)]
pub struct Vehicle {
    /// The vehicle's ID.
    id: VehicleId,
    /// The world position.
    position: Point2d,
    /// The point the vehicle is driving towards.
    target: Point2d,
    /// A unit vector pointing towards the target.
    direction: Vector2d,
    /// The cruising speed.
    base_speed: f64,
    /// The current speed.
    vel: f64,
    /// Whether the vehicle is held at a signal.
    waiting: bool,
    /// The total time spent held at signals.
    wait_time: f64,
    /// The total time spent moving.
    travel_time: f64,
    /// Whether the vehicle has reached its target.
    done: bool,
}

/// The attributes of a simulated vehicle.
#[derive(Clone, Copy, Debug)]
pub struct VehicleAttributes {
    /// Where the vehicle appears.
    pub position: Point2d,
    /// Where the vehicle is headed.
    pub target: Point2d,
    /// The cruising speed.
    pub speed: f64,
}

impl Vehicle {
    /// Creates a new vehicle.
    pub(crate) fn new(id: VehicleId, attributes: &VehicleAttributes) -> Self {
        Self {
            id,
            position: attributes.position,
            target: attributes.target,
            direction: direction_between(attributes.position, attributes.target),
            base_speed: attributes.speed,
            vel: attributes.speed,
            waiting: false,
            wait_time: 0.0,
            travel_time: 0.0,
            done: false,
        }
    }

    /// Gets the vehicle's ID.
    pub fn id(&self) -> VehicleId {
        self.id
    }

    /// The world position.
    pub fn position(&self) -> Point2d {
        self.position
    }

    /// The point the vehicle is driving towards.
    pub fn target(&self) -> Point2d {
        self.target
    }

    /// A unit vector aligned with the vehicle's heading.
    pub fn direction(&self) -> Vector2d {
        self.direction
    }

    /// The primary axis of travel.
    pub fn axis(&self) -> Axis {
        Axis::of_direction(self.direction)
    }

    /// The cruising speed.
    pub fn base_speed(&self) -> f64 {
        self.base_speed
    }

    /// The current speed; zero while waiting.
    pub fn vel(&self) -> f64 {
        self.vel
    }

    /// Whether the vehicle is held at a signal.
    pub fn is_waiting(&self) -> bool {
        self.waiting
    }

    /// The accumulated time spent held at signals.
    pub fn wait_time(&self) -> f64 {
        self.wait_time
    }

    /// The accumulated time spent moving.
    pub fn travel_time(&self) -> f64 {
        self.travel_time
    }

    /// Whether the vehicle has reached its target.
    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Advances the vehicle by `dt`.
    ///
    /// # Parameters
    /// * `dt` - The time step
    /// * `time` - The simulation time at the end of the step
    /// * `signals` - Every signal in the network
    /// * `sensor` - The arrival, detection and stopping distances
    pub(crate) fn update(
        &mut self,
        dt: f64,
        time: f64,
        signals: &[SignalPhase],
        sensor: &SensorConfig,
    ) {
        if self.done {
            return;
        }
        if self.position.distance(self.target) < sensor.arrival_radius {
            self.done = true;
            self.waiting = false;
            self.vel = 0.0;
            return;
        }

        // Hold at the next signal if it shows our axis anything but green
        let must_stop = self
            .next_signal(signals, sensor.detection_radius)
            .filter(|signal| signal.states_at(time).get(self.axis()).must_stop())
            .map(|signal| self.position.distance(signal.position()) < sensor.stopping_distance)
            .unwrap_or(false);

        if must_stop {
            self.waiting = true;
            self.vel = 0.0;
            self.wait_time += dt;
        } else {
            self.waiting = false;
            self.vel = self.base_speed;
            self.position += self.direction * (self.vel * dt);
            self.travel_time += dt;
        }
    }

    /// Finds the nearest signal ahead of the vehicle within `radius`.
    fn next_signal<'a>(&self, signals: &'a [SignalPhase], radius: f64) -> Option<&'a SignalPhase> {
        signals
            .iter()
            .map(|signal| (signal, self.position.distance(signal.position())))
            .filter(|(signal, dist)| {
                *dist < radius && is_ahead(self.position, self.direction, signal.position())
            })
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(signal, _)| signal)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::config::SignalConfig;
    use crate::genome::Gene;
    use crate::Intersection;
    use assert_approx_eq::assert_approx_eq;

    /// A north-south signal at (100, 0) that is green for t in [0, 30).
    fn signal() -> SignalPhase {
        let intersection = Intersection::new(0, Point2d::new(100.0, 0.0), 0, 0);
        let config = SignalConfig::default();
        SignalPhase::new(&intersection, Axis::NorthSouth, &config, Gene::new(30, 0))
    }

    fn eastbound(x: f64) -> Vehicle {
        Vehicle::new(
            VehicleId::default(),
            &VehicleAttributes {
                position: Point2d::new(x, 0.0),
                target: Point2d::new(500.0, 0.0),
                speed: 10.0,
            },
        )
    }

    #[test]
    fn waits_at_red_signal() {
        // North-south green means east-west red
        let mut veh = eastbound(80.0);
        veh.update(0.5, 10.0, &[signal()], &SensorConfig::default());
        assert!(veh.is_waiting());
        assert_eq!(veh.vel(), 0.0);
        assert_approx_eq!(veh.wait_time(), 0.5);
        assert_approx_eq!(veh.position().x, 80.0);
    }

    #[test]
    fn proceeds_on_green() {
        let mut veh = eastbound(80.0);
        veh.update(0.5, 45.0, &[signal()], &SensorConfig::default());
        assert!(!veh.is_waiting());
        assert_approx_eq!(veh.position().x, 85.0);
        assert_approx_eq!(veh.travel_time(), 0.5);
    }

    #[test]
    fn ignores_signals_behind() {
        let mut veh = eastbound(110.0);
        veh.update(1.0, 10.0, &[signal()], &SensorConfig::default());
        assert!(!veh.is_waiting());
        assert_approx_eq!(veh.position().x, 120.0);
    }

    #[test]
    fn keeps_moving_until_within_stopping_distance() {
        let mut veh = eastbound(30.0);
        veh.update(1.0, 10.0, &[signal()], &SensorConfig::default());
        assert!(!veh.is_waiting());
        assert_approx_eq!(veh.position().x, 40.0);
    }
}
