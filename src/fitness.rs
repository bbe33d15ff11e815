//! Scoring of timing plans against a traffic snapshot.
//!
//! Scores follow the "lower is better" convention. Every term is additive,
//! rewards are negative contributions and penalties positive ones.

use crate::config::{Config, SignalConfig};
use crate::genome::Genome;
use crate::grid::{AdjacentPair, Grid};
use crate::math::circular_diff;
use crate::snapshot::TrafficSnapshot;
use crate::util::Interval;
use itertools::Itertools;
use rand::Rng;
use rand_distr::{Distribution, Normal};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Weights and thresholds of the fitness terms.
#[derive(Clone, Copy, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct FitnessWeights {
    /// The weight of the queue penalty.
    pub queue: f64,
    /// The exponent applied to queue lengths; greater than one so long queues dominate.
    pub queue_exponent: f64,
    /// The penalty per time-unit a green duration lies outside the legal range.
    pub out_of_range: f64,
    /// The range of green durations that earn a bonus.
    pub sweet_spot: Interval<u32>,
    /// The bonus for each green duration inside the sweet spot.
    pub sweet_spot_bonus: f64,
    /// The standard deviation of green durations below which plans are penalised.
    pub min_green_spread: f64,
    /// The weight of the green spread term.
    pub green_spread: f64,
    /// The weight of the distinct offsets term.
    pub distinct_offsets: f64,
    /// How far either side of the ideal travel time an offset difference is rewarded.
    pub sync_tolerance: f64,
    /// How far outside the rewarded band an offset difference starts to be penalised.
    pub sync_far: f64,
    /// The bonus for each synchronised pair of neighbours.
    pub sync_bonus: f64,
    /// The penalty per time-unit beyond `sync_far`.
    pub sync_penalty: f64,
    /// The standard deviation of the random jitter.
    pub jitter_std_dev: f64,
    /// The largest magnitude the jitter may take.
    pub jitter_bound: f64,
}

impl Default for FitnessWeights {
    fn default() -> Self {
        Self {
            queue: 1.0,
            queue_exponent: 1.6,
            out_of_range: 5.0,
            sweet_spot: Interval::new(25, 45),
            sweet_spot_bonus: 0.5,
            min_green_spread: 4.0,
            green_spread: 0.25,
            distinct_offsets: 1.0,
            sync_tolerance: 3.0,
            sync_far: 15.0,
            sync_bonus: 1.0,
            sync_penalty: 0.1,
            jitter_std_dev: 0.01,
            jitter_bound: 0.03,
        }
    }
}

/// The deterministic terms of a fitness score.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FitnessBreakdown {
    /// The penalty for queues left standing at red signals.
    pub queue: f64,
    /// The penalty or reward for the green durations themselves.
    pub green_range: f64,
    /// The penalty or reward for variety across the plan.
    pub diversity: f64,
    /// The penalty or reward for offset coordination between neighbours.
    pub sync: f64,
}

impl FitnessBreakdown {
    /// The sum of all terms.
    pub fn total(&self) -> f64 {
        self.queue + self.green_range + self.diversity + self.sync
    }
}

/// A pair of neighbouring intersections and the offset differences
/// which let a vehicle leaving one arrive at the next on green.
#[derive(Clone, Copy, Debug)]
struct SyncPair {
    a: usize,
    b: usize,
    band: Interval<f64>,
}

/// Scores genomes against a traffic snapshot.
#[derive(Clone, Debug)]
pub struct FitnessEvaluator {
    signal: SignalConfig,
    weights: FitnessWeights,
    pairs: Vec<SyncPair>,
    jitter: Normal<f64>,
}

impl FitnessEvaluator {
    /// Creates an evaluator for the grid described by `config`.
    pub fn new(config: &Config) -> Self {
        let grid = Grid::new(&config.grid);
        let mean_speed = config.traffic.speed.midpoint();
        let weights = config.optimizer.fitness;
        let pairs = grid
            .adjacent_pairs()
            .iter()
            .map(|pair| SyncPair::new(pair, mean_speed, weights.sync_tolerance))
            .collect();
        let jitter = Normal::new(0.0, weights.jitter_std_dev.abs())
            .expect("Standard deviation is finite and non-negative");
        Self {
            signal: config.signal,
            weights,
            pairs,
            jitter,
        }
    }

    /// The number of neighbouring pairs considered by the sync term.
    pub fn num_pairs(&self) -> usize {
        self.pairs.len()
    }

    /// Scores a genome, adding a small bounded random jitter.
    pub fn score(&self, genome: &Genome, snapshot: &TrafficSnapshot, rng: &mut impl Rng) -> f64 {
        let bound = self.weights.jitter_bound.abs();
        let jitter = self.jitter.sample(rng).clamp(-bound, bound);
        self.breakdown(genome, snapshot).total() + jitter
    }

    /// Computes the deterministic terms of a genome's score.
    pub fn breakdown(&self, genome: &Genome, snapshot: &TrafficSnapshot) -> FitnessBreakdown {
        FitnessBreakdown {
            queue: self.queue_term(genome, snapshot),
            green_range: self.green_range_term(genome),
            diversity: self.diversity_term(genome),
            sync: self.sync_term(genome),
        }
    }

    /// Queues weighted inversely by flow, scaled by the share of the cycle
    /// the controlled axis spends not green.
    fn queue_term(&self, genome: &Genome, snapshot: &TrafficSnapshot) -> f64 {
        let cycle = self.signal.cycle_length as f64;
        genome
            .genes()
            .iter()
            .zip(snapshot.readings())
            .map(|(gene, reading)| {
                let red_share = (cycle - gene.green as f64).max(0.0) / cycle;
                let queue = (reading.queue as f64).powf(self.weights.queue_exponent);
                self.weights.queue * queue / reading.flow as f64 * red_share
            })
            .sum()
    }

    fn green_range_term(&self, genome: &Genome) -> f64 {
        let w = &self.weights;
        let legal = Interval::new(self.signal.green.min as f64, self.signal.green.max as f64);
        genome
            .genes()
            .iter()
            .map(|gene| {
                let green = gene.green as f64;
                if !legal.contains(green) {
                    w.out_of_range * legal.distance(green)
                } else if w.sweet_spot.contains(gene.green) {
                    -w.sweet_spot_bonus
                } else {
                    0.0
                }
            })
            .sum()
    }

    fn diversity_term(&self, genome: &Genome) -> f64 {
        let w = &self.weights;
        let n = genome.len();
        if n == 0 {
            return 0.0;
        }

        // Green durations: penalise a narrow spread, reward a wide one up to a cap
        let mean = genome.genes().iter().map(|g| g.green as f64).sum::<f64>() / n as f64;
        let variance = genome
            .genes()
            .iter()
            .map(|g| (g.green as f64 - mean).powi(2))
            .sum::<f64>()
            / n as f64;
        let shortfall = f64::max(w.min_green_spread - variance.sqrt(), -w.min_green_spread);
        let spread = w.green_spread * shortfall;

        // Offsets: reward plans where most offsets differ
        let distinct = genome.genes().iter().map(|g| g.offset).unique().count();
        let offsets = w.distinct_offsets * (0.5 - distinct as f64 / n as f64);

        spread + offsets
    }

    fn sync_term(&self, genome: &Genome) -> f64 {
        let w = &self.weights;
        let cycle = self.signal.cycle_length;
        self.pairs
            .iter()
            .filter(|pair| pair.a < genome.len() && pair.b < genome.len())
            .map(|pair| {
                let diff = circular_diff(genome[pair.a].offset, genome[pair.b].offset, cycle);
                let outside = pair.band.distance(diff as f64);
                if outside <= 0.0 {
                    -w.sync_bonus
                } else if outside > w.sync_far {
                    w.sync_penalty * (outside - w.sync_far)
                } else {
                    0.0
                }
            })
            .sum()
    }
}

impl SyncPair {
    fn new(pair: &AdjacentPair, mean_speed: f64, tolerance: f64) -> Self {
        let travel_time = pair.distance / mean_speed;
        Self {
            a: pair.a,
            b: pair.b,
            band: Interval::disc(travel_time, tolerance),
        }
    }
}
