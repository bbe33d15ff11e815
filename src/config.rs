//! Configuration of the simulation and the optimizer.
//!
//! Every value has a default, so collaborators typically start from
//! [Config::default] and override the handful of options exposed to users.

use crate::error::{Error, Result};
use crate::fitness::FitnessWeights;
use crate::math::{Point2d, Vector2d};
use crate::util::Interval;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The complete configuration passed to [Simulation](crate::Simulation)
/// and [Optimizer](crate::Optimizer).
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Config {
    /// The road grid.
    pub grid: GridConfig,
    /// Signal timing bounds.
    pub signal: SignalConfig,
    /// Vehicle spawning and kinematics.
    pub traffic: TrafficConfig,
    /// Distances used by vehicles and sensors.
    pub sensor: SensorConfig,
    /// The genetic search.
    pub optimizer: OptimizerConfig,
}

/// The layout of the road grid.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct GridConfig {
    /// The intersection positions; the index of each is its ID.
    pub intersections: Vec<Point2d>,
    /// The width and height of the simulated area.
    pub bounds: Vector2d,
    /// The lateral distance between a road's centre line and each of its two lanes.
    pub lane_offset: f64,
    /// How far outside the simulated area vehicles appear.
    pub spawn_margin: f64,
    /// How far beyond the far edge of the area a vehicle's target lies.
    pub target_overshoot: f64,
}

/// Timing parameters shared by every signal.
#[derive(Clone, Copy, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SignalConfig {
    /// The length of a full signal cycle.
    pub cycle_length: u32,
    /// The duration of the yellow phase.
    pub yellow_duration: u32,
    /// The legal range of green durations.
    pub green: Interval<u32>,
    /// The range green durations are drawn from when signals are reset.
    pub initial_green: Interval<u32>,
}

/// Vehicle spawning and kinematics.
#[derive(Clone, Copy, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TrafficConfig {
    /// The number of vehicles spawned in the initial burst.
    pub vehicle_count: usize,
    /// The time between spawns during the initial burst.
    pub spawn_interval: f64,
    /// The probability that a trickle spawn check produces a vehicle.
    pub trickle_probability: f64,
    /// The range of times between trickle spawn checks.
    pub trickle_interval: Interval<f64>,
    /// The time of the first spawn after the simulation starts.
    pub first_spawn: f64,
    /// The range of vehicle speeds, in units per time-unit.
    pub speed: Interval<f64>,
}

/// Distances used by vehicles and intersection sensors.
#[derive(Clone, Copy, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SensorConfig {
    /// A vehicle this close to its target has arrived.
    pub arrival_radius: f64,
    /// Signals and vehicles are only considered within this radius.
    pub detection_radius: f64,
    /// Moving vehicles within this radius count towards an intersection's flow.
    pub flow_radius: f64,
    /// A vehicle this close to a signal it may not pass stops.
    pub stopping_distance: f64,
}

/// Parameters of the genetic search.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct OptimizerConfig {
    /// The number of genomes in each generation.
    pub population_size: usize,
    /// The number of generations to run.
    pub generations: usize,
    /// The per-gene mutation probability.
    pub mutation_rate: f64,
    /// The probability that a pair of parents is crossed over.
    pub crossover_rate: f64,
    /// The number of contestants in each selection tournament.
    pub tournament_size: usize,
    /// The number of top genomes carried unchanged into the next generation.
    pub elite_count: usize,
    /// Seed for the random number generator; `None` seeds from entropy.
    pub seed: Option<u64>,
    /// Weights of the fitness terms.
    pub fitness: FitnessWeights,
}

impl Default for GridConfig {
    fn default() -> Self {
        let intersections = [200.0, 450.0]
            .iter()
            .flat_map(|&y| [250.0, 550.0, 850.0].map(|x| Point2d::new(x, y)))
            .collect();
        Self {
            intersections,
            bounds: Vector2d::new(1100.0, 650.0),
            lane_offset: 12.0,
            spawn_margin: 40.0,
            target_overshoot: 100.0,
        }
    }
}

impl Default for SignalConfig {
    fn default() -> Self {
        Self {
            cycle_length: 60,
            yellow_duration: 3,
            green: Interval::new(20, 55),
            initial_green: Interval::new(25, 45),
        }
    }
}

impl Default for TrafficConfig {
    fn default() -> Self {
        Self {
            vehicle_count: 20,
            spawn_interval: 0.6,
            trickle_probability: 0.5,
            trickle_interval: Interval::new(1.7, 2.9),
            first_spawn: 1.5,
            speed: Interval::new(120.0, 210.0),
        }
    }
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            arrival_radius: 15.0,
            detection_radius: 80.0,
            flow_radius: 40.0,
            stopping_distance: 35.0,
        }
    }
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            population_size: 40,
            generations: 100,
            mutation_rate: 0.15,
            crossover_rate: 0.8,
            tournament_size: 3,
            elite_count: 2,
            seed: None,
            fitness: FitnessWeights::default(),
        }
    }
}

impl Config {
    /// Checks that the configuration is internally consistent.
    pub fn validate(&self) -> Result<()> {
        self.grid.validate()?;
        self.signal.validate()?;
        self.traffic.validate()?;
        self.sensor.validate()?;
        self.optimizer.validate()
    }

    /// Parses and validates a configuration from JSON.
    /// Missing fields take their default values.
    #[cfg(feature = "serde")]
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Config =
            serde_json::from_str(json).map_err(|err| Error::InvalidConfig(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }
}

impl GridConfig {
    fn validate(&self) -> Result<()> {
        if self.intersections.is_empty() {
            return invalid("the grid must contain at least one intersection");
        }
        if self.bounds.x <= 0.0 || self.bounds.y <= 0.0 {
            return invalid("grid bounds must be positive");
        }
        Ok(())
    }
}

impl SignalConfig {
    fn validate(&self) -> Result<()> {
        if !self.green.is_ordered() || !self.initial_green.is_ordered() {
            return invalid("green duration ranges must have min <= max");
        }
        if self.green.min == 0 {
            return invalid("green duration must be positive");
        }
        let busy = self.green.max.checked_add(self.yellow_duration);
        if busy.map_or(true, |busy| busy >= self.cycle_length) {
            return invalid(format!(
                "green ({}) plus yellow ({}) must be shorter than the cycle ({})",
                self.green.max, self.yellow_duration, self.cycle_length
            ));
        }
        Ok(())
    }
}

impl TrafficConfig {
    fn validate(&self) -> Result<()> {
        if !self.speed.is_ordered() || self.speed.min <= 0.0 {
            return invalid("speed range must be positive with min <= max");
        }
        if !self.trickle_interval.is_ordered() || self.trickle_interval.min <= 0.0 {
            return invalid("trickle interval must be positive with min <= max");
        }
        if self.spawn_interval <= 0.0 {
            return invalid("spawn interval must be positive");
        }
        check_rate("trickle probability", self.trickle_probability)
    }
}

impl SensorConfig {
    fn validate(&self) -> Result<()> {
        if self.flow_radius > self.detection_radius {
            return invalid("flow radius must not exceed the detection radius");
        }
        Ok(())
    }
}

impl OptimizerConfig {
    fn validate(&self) -> Result<()> {
        if self.population_size < 2 {
            return invalid("population must contain at least two genomes");
        }
        if self.elite_count >= self.population_size {
            return invalid("elite count must be smaller than the population");
        }
        if self.tournament_size == 0 {
            return invalid("tournament size must be at least one");
        }
        if !self.fitness.jitter_std_dev.is_finite() || self.fitness.jitter_std_dev < 0.0 {
            return invalid("jitter standard deviation must be finite and non-negative");
        }
        if !self.fitness.jitter_bound.is_finite() || self.fitness.jitter_bound < 0.0 {
            return invalid("jitter bound must be finite and non-negative");
        }
        check_rate("mutation rate", self.mutation_rate)?;
        check_rate("crossover rate", self.crossover_rate)
    }
}

fn check_rate(name: &str, rate: f64) -> Result<()> {
    if (0.0..=1.0).contains(&rate) {
        Ok(())
    } else {
        invalid(format!("{name} must lie in [0, 1], got {rate}"))
    }
}

fn invalid(reason: impl Into<String>) -> Result<()> {
    Err(Error::InvalidConfig(reason.into()))
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.grid.intersections.len(), 6);
    }

    #[test]
    fn rejects_green_overrunning_cycle() {
        let mut config = Config::default();
        config.signal.green.max = 58;
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn rejects_overflowing_signal_timing() {
        let mut config = Config::default();
        config.signal.green.max = u32::MAX;
        config.signal.yellow_duration = 3;
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn rejects_bad_jitter_bound() {
        let mut config = Config::default();
        config.optimizer.fitness.jitter_bound = -0.01;
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));
        config.optimizer.fitness.jitter_bound = f64::NAN;
        assert!(config.validate().is_err());
        config.optimizer.fitness.jitter_bound = 0.0;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn rejects_elites_filling_population() {
        let mut config = Config::default();
        config.optimizer.population_size = 4;
        config.optimizer.elite_count = 4;
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_bad_rates() {
        let mut config = Config::default();
        config.optimizer.mutation_rate = 1.5;
        assert!(config.validate().is_err());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn loads_partial_json() {
        let config = Config::from_json(
            r#"{ "optimizer": { "population_size": 12, "generations": 5, "seed": 9 } }"#,
        )
        .unwrap();
        assert_eq!(config.optimizer.population_size, 12);
        assert_eq!(config.optimizer.seed, Some(9));
        assert_eq!(config.signal.cycle_length, 60);
    }
}
