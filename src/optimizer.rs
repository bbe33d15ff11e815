use self::selection::{elites, tournament};
use crate::config::{Config, OptimizerConfig, SignalConfig};
use crate::error::{Error, Result};
use crate::fitness::FitnessEvaluator;
use crate::genome::Genome;
use crate::snapshot::TrafficSnapshot;
use itertools::{Itertools, MinMaxResult};
use log::{debug, info};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
pub use worker::{spawn_optimization, OptimizationHandle};

mod selection;
mod worker;

/// Searches for a good signal timing plan using a genetic algorithm.
#[derive(Clone, Debug)]
pub struct Optimizer {
    /// The search parameters.
    settings: OptimizerConfig,
    /// The gene legality bounds.
    signal: SignalConfig,
    /// The number of genes in each genome.
    num_genes: usize,
    /// Scores genomes against the snapshot.
    evaluator: FitnessEvaluator,
}

/// Reported once per generation while an optimization runs.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Progress {
    /// The zero-based index of the generation just scored.
    pub generation: usize,
    /// The total number of generations in the run.
    pub total: usize,
    /// The best score found so far.
    pub best_score: f64,
}

/// Summary statistics of one generation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GenerationStats {
    /// The best score found in this or any earlier generation.
    pub best_so_far: f64,
    /// The best score in this generation.
    pub best: f64,
    /// The mean score of this generation.
    pub average: f64,
    /// The worst score in this generation.
    pub worst: f64,
}

/// The outcome of an optimization run.
#[derive(Clone, Debug)]
pub struct OptimizationResult {
    /// The best genome found.
    pub best_genome: Genome,
    /// The score of the best genome.
    pub best_score: f64,
    /// Statistics for every generation, in order.
    pub history: Vec<GenerationStats>,
}

impl Optimizer {
    /// Creates an optimizer for the grid described by `config`.
    pub fn new(config: &Config) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            settings: config.optimizer.clone(),
            signal: config.signal,
            num_genes: config.grid.intersections.len(),
            evaluator: FitnessEvaluator::new(config),
        })
    }

    /// The search parameters.
    pub fn settings(&self) -> &OptimizerConfig {
        &self.settings
    }

    /// The evaluator used to score genomes.
    pub fn evaluator(&self) -> &FitnessEvaluator {
        &self.evaluator
    }

    /// Runs the configured number of generations against a frozen snapshot.
    ///
    /// `progress` is invoked after each generation has been scored.
    /// With a fixed seed, repeated runs on the same snapshot give identical results.
    pub fn optimize(
        &self,
        snapshot: &TrafficSnapshot,
        mut progress: impl FnMut(Progress),
    ) -> Result<OptimizationResult> {
        if snapshot.len() != self.num_genes {
            return Err(Error::SnapshotLength {
                expected: self.num_genes,
                actual: snapshot.len(),
            });
        }

        let settings = &self.settings;
        let total = settings.generations;
        let mut rng = match settings.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let mut population = (0..settings.population_size)
            .map(|_| Genome::random(self.num_genes, &self.signal, &mut rng))
            .collect::<Vec<_>>();
        let mut best: Option<(Genome, f64)> = None;
        let mut history = Vec::with_capacity(total);

        info!(
            "Optimizing {} signals: population {}, {} generations",
            self.num_genes, settings.population_size, total
        );

        for generation in 0..total {
            let scores = population
                .iter()
                .map(|genome| self.evaluator.score(genome, snapshot, &mut rng))
                .collect::<Vec<_>>();

            // Update the best-so-far with a copy of this generation's champion
            let (gen_best, gen_worst) = match scores.iter().copied().minmax_by(f64::total_cmp) {
                MinMaxResult::MinMax(lo, hi) => (lo, hi),
                MinMaxResult::OneElement(x) => (x, x),
                MinMaxResult::NoElements => unreachable!(),
            };
            if best.as_ref().map_or(true, |(_, score)| gen_best < *score) {
                let idx = elites(&scores, 1)[0];
                best = Some((population[idx].clone(), gen_best));
            }
            let best_so_far = best.as_ref().map(|(_, score)| *score).unwrap_or(gen_best);

            let stats = GenerationStats {
                best_so_far,
                best: gen_best,
                average: scores.iter().sum::<f64>() / scores.len() as f64,
                worst: gen_worst,
            };
            debug!(
                "Generation {}/{}: best {:.4}, avg {:.4}, worst {:.4}, best so far {:.4}",
                generation + 1,
                total,
                stats.best,
                stats.average,
                stats.worst,
                stats.best_so_far
            );
            history.push(stats);
            progress(Progress {
                generation,
                total,
                best_score: best_so_far,
            });

            if generation + 1 < total {
                population = self.next_generation(&population, &scores, &mut rng);
            }
        }

        let (best_genome, best_score) = match best {
            Some(best) => best,
            // No generations were run; fall back to scoring the initial population once
            None => {
                let scores = population
                    .iter()
                    .map(|genome| self.evaluator.score(genome, snapshot, &mut rng))
                    .collect::<Vec<_>>();
                let idx = elites(&scores, 1)[0];
                (population.swap_remove(idx), scores[idx])
            }
        };
        info!("Optimization finished with best score {:.4}", best_score);

        Ok(OptimizationResult {
            best_genome,
            best_score,
            history,
        })
    }

    /// Breeds the next population: elites first, then the children of tournament winners.
    fn next_generation(
        &self,
        population: &[Genome],
        scores: &[f64],
        rng: &mut StdRng,
    ) -> Vec<Genome> {
        let settings = &self.settings;
        let size = settings.population_size;

        let mut next = Vec::with_capacity(size);
        next.extend(
            elites(scores, settings.elite_count)
                .into_iter()
                .map(|idx| population[idx].clone()),
        );

        let parents = (0..size)
            .map(|_| tournament(scores, settings.tournament_size, rng))
            .collect::<Vec<_>>();

        for (&p1, &p2) in parents.iter().tuples() {
            if next.len() >= size {
                break;
            }
            let (mut c1, mut c2) = if rng.gen_bool(settings.crossover_rate) {
                Genome::crossover(&population[p1], &population[p2], rng)
            } else {
                (population[p1].clone(), population[p2].clone())
            };
            c1.mutate(settings.mutation_rate, &self.signal, rng);
            c2.mutate(settings.mutation_rate, &self.signal, rng);
            next.push(c1);
            if next.len() < size {
                next.push(c2);
            }
        }

        // An odd number of parents leaves one unpaired slot
        while next.len() < size {
            let idx = tournament(scores, settings.tournament_size, rng);
            let mut child = population[idx].clone();
            child.mutate(settings.mutation_rate, &self.signal, rng);
            next.push(child);
        }
        next
    }
}
