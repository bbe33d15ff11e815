use crate::config::Config;
use crate::error::{Error, Result};
use crate::genome::{Gene, Genome};
use crate::grid::Grid;
use crate::lane::Lane;
use crate::light::SignalPhase;
use crate::snapshot::{IntersectionReading, TrafficSnapshot};
use crate::vehicle::{Vehicle, VehicleAttributes};
use crate::{VehicleId, VehicleSet};
use cgmath::prelude::*;
use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

/// A traffic simulation over a grid of signalised intersections.
pub struct Simulation {
    /// The configuration the simulation was built from.
    config: Config,
    /// The road grid.
    grid: Grid,
    /// One signal per intersection, indexed by intersection ID.
    signals: Vec<SignalPhase>,
    /// The vehicles being simulated.
    vehicles: VehicleSet,
    /// The source of randomness for spawning and signal resets.
    rng: StdRng,
    /// The simulated time.
    time: f64,
    /// The time at which the next spawn is due.
    next_spawn: f64,
    /// The number of vehicles spawned since the last reset.
    spawned: usize,
    /// The number of vehicles which reached their target since the last reset.
    completed: usize,
    /// Whether `update` advances the simulation.
    running: bool,
    /// Whether the simulation has been started since it was created or reset.
    started: bool,
    /// Whether an optimized timing plan is in effect.
    optimized: bool,
}

/// Aggregate statistics of a simulation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Statistics {
    /// The number of vehicles currently in the simulation.
    pub active: usize,
    /// The number of vehicles spawned since the last reset.
    pub spawned: usize,
    /// The number of vehicles which reached their target since the last reset.
    pub completed: usize,
    /// The number of vehicles currently held at a signal.
    pub waiting: usize,
    /// The mean accumulated wait of the active vehicles; zero if there are none.
    pub avg_wait_time: f64,
    /// The simulated time.
    pub time: f64,
    /// Whether the simulation is advancing.
    pub running: bool,
    /// Whether an optimized timing plan is in effect.
    pub optimized: bool,
}

impl Simulation {
    /// Creates a new simulation with randomly timed signals.
    pub fn new(config: Config) -> Result<Self> {
        Self::with_rng(config, StdRng::from_entropy())
    }

    /// Creates a new simulation whose randomness is derived from `seed`.
    pub fn with_seed(config: Config, seed: u64) -> Result<Self> {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(config: Config, rng: StdRng) -> Result<Self> {
        config.validate()?;
        let grid = Grid::new(&config.grid);
        let mut sim = Self {
            config,
            grid,
            signals: vec![],
            vehicles: VehicleSet::with_key(),
            rng,
            time: 0.0,
            next_spawn: 0.0,
            spawned: 0,
            completed: 0,
            running: false,
            started: false,
            optimized: false,
        };
        sim.randomise_signals();
        Ok(sim)
    }

    /// Starts or resumes the simulation, restarting the clock.
    pub fn start(&mut self) {
        self.running = true;
        self.started = true;
        self.time = 0.0;
        self.next_spawn = self.config.traffic.first_spawn;
        self.update_lights();
        info!("Simulation started with {} vehicles", self.vehicles.len());
    }

    /// Pauses the simulation. A running optimization is not affected.
    pub fn stop(&mut self) {
        self.running = false;
        info!("Simulation stopped at t={:.1}", self.time);
    }

    /// Stops the simulation, removes every vehicle, clears the counters
    /// and gives every signal a new random timing.
    pub fn reset(&mut self) {
        self.running = false;
        self.started = false;
        self.optimized = false;
        self.vehicles.clear();
        self.time = 0.0;
        self.next_spawn = 0.0;
        self.spawned = 0;
        self.completed = 0;
        self.randomise_signals();
        info!("Simulation reset");
    }

    /// Advances the simulation by `dt`. Does nothing unless the simulation is running.
    pub fn update(&mut self, dt: f64) {
        if !self.running {
            return;
        }
        self.time += dt;
        self.spawn_vehicles();
        self.update_lights();
        self.update_vehicles(dt);
        self.retire_vehicles();
    }

    /// Adds a vehicle to the simulation.
    pub fn add_vehicle(&mut self, attributes: &VehicleAttributes) -> VehicleId {
        self.spawned += 1;
        self.vehicles.insert_with_key(|id| Vehicle::new(id, attributes))
    }

    /// Measures the queue and flow around every intersection.
    ///
    /// Vehicles within the detection radius of an intersection count towards
    /// its queue if they are waiting, or its flow if they are moving within
    /// the flow radius.
    pub fn sample_traffic(&self) -> Result<TrafficSnapshot> {
        if !self.started {
            return Err(Error::NotRunning);
        }
        let sensor = &self.config.sensor;
        let readings = self.grid.intersections().iter().map(|intersection| {
            let (mut queue, mut flow) = (0, 0);
            for vehicle in self.vehicles.values() {
                let dist = vehicle.position().distance(intersection.position());
                if dist >= sensor.detection_radius {
                    continue;
                }
                if vehicle.is_waiting() {
                    queue += 1;
                } else if dist < sensor.flow_radius {
                    flow += 1;
                }
            }
            IntersectionReading::new(queue, flow)
        });
        Ok(TrafficSnapshot::new(readings))
    }

    /// Computes aggregate statistics.
    pub fn get_statistics(&self) -> Statistics {
        let active = self.vehicles.len();
        let total_wait: f64 = self.vehicles.values().map(|v| v.wait_time()).sum();
        Statistics {
            active,
            spawned: self.spawned,
            completed: self.completed,
            waiting: self.vehicles.values().filter(|v| v.is_waiting()).count(),
            avg_wait_time: if active > 0 {
                total_wait / active as f64
            } else {
                0.0
            },
            time: self.time,
            running: self.running,
            optimized: self.optimized,
        }
    }

    /// Replaces every signal's timing with the corresponding gene of `genome`.
    ///
    /// Genes are clamped into the legal range. All vehicles are removed and the
    /// clock and spawn counters restart, since the new timing invalidates the
    /// state of vehicles already in the network.
    pub fn apply_solution(&mut self, genome: &Genome) -> Result<()> {
        if !self.started {
            return Err(Error::NotRunning);
        }
        if genome.len() != self.signals.len() {
            return Err(Error::GenomeLength {
                expected: self.signals.len(),
                actual: genome.len(),
            });
        }

        for (signal, gene) in self.signals.iter_mut().zip(genome.genes()) {
            if signal.set_timing(*gene, &self.config.signal) {
                warn!(
                    "Clamped gene {:?} for intersection {} to {:?}",
                    gene,
                    signal.intersection(),
                    signal.gene()
                );
            }
        }

        self.vehicles.clear();
        self.time = 0.0;
        self.next_spawn = self.config.traffic.first_spawn;
        self.spawned = 0;
        self.completed = 0;
        self.optimized = true;
        self.update_lights();
        info!("Applied optimized timing plan to {} signals", self.signals.len());
        Ok(())
    }

    /// Gets the current simulation time.
    pub fn time(&self) -> f64 {
        self.time
    }

    /// Whether the simulation is advancing.
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Whether an optimized timing plan is in effect.
    pub fn is_optimized(&self) -> bool {
        self.optimized
    }

    /// The configuration the simulation was built from.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The road grid.
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// The signals, indexed by intersection ID.
    pub fn signals(&self) -> &[SignalPhase] {
        &self.signals
    }

    /// Returns an iterator over all the signals in the simulation.
    pub fn iter_signals(&self) -> impl Iterator<Item = &SignalPhase> {
        self.signals.iter()
    }

    /// Returns an iterator over the lanes vehicles travel along.
    pub fn iter_lanes(&self) -> impl Iterator<Item = &Lane> {
        self.grid.lanes().iter()
    }

    /// The current timing plan as a genome.
    pub fn current_plan(&self) -> Genome {
        Genome::new(self.signals.iter().map(|signal| signal.gene()))
    }

    /// Returns an iterator over all the vehicles in the simulation.
    pub fn iter_vehicles(&self) -> impl Iterator<Item = &Vehicle> {
        self.vehicles.values()
    }

    /// Gets a reference to the vehicle with the given ID, if it is still in the simulation.
    pub fn get_vehicle(&self, vehicle_id: VehicleId) -> Option<&Vehicle> {
        self.vehicles.get(vehicle_id)
    }

    /// Gives every signal a random timing drawn from the initial green range.
    fn randomise_signals(&mut self) {
        let signal = self.config.signal;
        let rng = &mut self.rng;
        self.signals = self
            .grid
            .intersections()
            .iter()
            .map(|intersection| {
                let gene = Gene::new(
                    signal.initial_green.sample(rng),
                    rng.gen_range(0..signal.cycle_length),
                );
                SignalPhase::new(intersection, intersection.signal_axis(), &signal, gene)
            })
            .collect();
    }

    /// Spawns a vehicle if one is due: one per interval until the burst is
    /// complete, then a probabilistic trickle.
    fn spawn_vehicles(&mut self) {
        if self.time < self.next_spawn {
            return;
        }
        let traffic = self.config.traffic;
        if self.spawned < traffic.vehicle_count {
            self.spawn_vehicle();
            self.next_spawn = self.time + traffic.spawn_interval;
        } else {
            if self.rng.gen_bool(traffic.trickle_probability) {
                self.spawn_vehicle();
            }
            self.next_spawn = self.time + traffic.trickle_interval.sample(&mut self.rng);
        }
    }

    /// Spawns a vehicle at either end of a random lane.
    fn spawn_vehicle(&mut self) {
        let grid = &self.config.grid;
        let Some(lane) = self.grid.lanes().choose(&mut self.rng) else {
            return;
        };
        let route = lane.random_route(&mut self.rng, grid.spawn_margin, grid.target_overshoot);
        let attributes = VehicleAttributes {
            position: route.origin,
            target: route.target,
            speed: self.config.traffic.speed.sample(&mut self.rng),
        };
        let id = self.add_vehicle(&attributes);
        debug!("Spawned vehicle {:?} at t={:.1}", id, self.time);
    }

    /// Refreshes the cached signal states.
    fn update_lights(&mut self) {
        for signal in &mut self.signals {
            signal.step(self.time);
        }
    }

    /// Moves every vehicle or holds it at its signal.
    fn update_vehicles(&mut self, dt: f64) {
        for vehicle in self.vehicles.values_mut() {
            vehicle.update(dt, self.time, &self.signals, &self.config.sensor);
        }
    }

    /// Removes vehicles which have reached their target.
    fn retire_vehicles(&mut self) {
        let before = self.vehicles.len();
        self.vehicles.retain(|_, vehicle| !vehicle.is_done());
        let retired = before - self.vehicles.len();
        if retired > 0 {
            self.completed += retired;
            debug!("{} vehicles completed their trip at t={:.1}", retired, self.time);
        }
    }
}
