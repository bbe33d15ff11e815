//! Genetic optimisation of fixed-time traffic signal plans.
//!
//! A [Simulation] moves vehicles along the lanes of a grid of signalised
//! intersections. A [TrafficSnapshot] sampled from it is scored by the
//! [Optimizer], whose best [Genome] is then applied back to the simulation.

pub use cgmath;
pub use config::{Config, GridConfig, OptimizerConfig, SensorConfig, SignalConfig, TrafficConfig};
pub use error::{Error, Result};
pub use fitness::{FitnessBreakdown, FitnessEvaluator, FitnessWeights};
pub use genome::{Gene, Genome};
pub use grid::{AdjacentPair, Grid, Intersection};
pub use lane::{Lane, Route};
pub use light::{Axis, LightState, SignalPhase, SignalStates};
pub use optimizer::{
    spawn_optimization, GenerationStats, OptimizationHandle, OptimizationResult, Optimizer,
    Progress,
};
pub use simulation::{Simulation, Statistics};
use slotmap::{new_key_type, SlotMap};
pub use slotmap::{Key, KeyData};
pub use snapshot::{IntersectionReading, TrafficSnapshot};
pub use util::Interval;
pub use vehicle::{Vehicle, VehicleAttributes};

mod config;
mod error;
mod fitness;
mod genome;
mod grid;
mod lane;
mod light;
pub mod math;
mod optimizer;
mod simulation;
mod snapshot;
mod util;
mod vehicle;

new_key_type! {
    /// Unique ID of a [Vehicle].
    pub struct VehicleId;
}

type VehicleSet = SlotMap<VehicleId, Vehicle>;
