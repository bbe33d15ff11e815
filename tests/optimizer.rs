//! Tests of the genetic search for timing plans.

use signal_ga::{Config, Gene, Genome, Optimizer, TrafficSnapshot};

fn config(population: usize, generations: usize, seed: u64) -> Config {
    let mut config = Config::default();
    config.optimizer.population_size = population;
    config.optimizer.generations = generations;
    config.optimizer.seed = Some(seed);
    config
}

/// Test that every generation is recorded and the best score never regresses.
#[test]
fn history_is_monotone() {
    let optimizer = Optimizer::new(&config(20, 10, 1)).unwrap();
    let snapshot = TrafficSnapshot::uniform(6, 3, 1);
    let result = optimizer.optimize(&snapshot, |_| {}).unwrap();

    assert_eq!(result.history.len(), 10);
    for (prev, next) in result.history.iter().zip(result.history.iter().skip(1)) {
        assert!(next.best_so_far <= prev.best_so_far);
    }
    for stats in &result.history {
        assert!(stats.best <= stats.average && stats.average <= stats.worst);
        assert!(stats.best_so_far <= stats.best);
    }
    let last = result.history.last().unwrap();
    assert_eq!(result.best_score, last.best_so_far);
}

/// Test that progress is reported once per generation, in order.
#[test]
fn progress_is_reported_every_generation() {
    let optimizer = Optimizer::new(&config(20, 10, 2)).unwrap();
    let snapshot = TrafficSnapshot::uniform(6, 2, 1);
    let mut reports = vec![];
    let result = optimizer
        .optimize(&snapshot, |progress| reports.push(progress))
        .unwrap();

    assert_eq!(reports.len(), 10);
    for (i, progress) in reports.iter().enumerate() {
        assert_eq!(progress.generation, i);
        assert_eq!(progress.total, 10);
        assert_eq!(progress.best_score, result.history[i].best_so_far);
    }
}

/// Test that a fixed seed reproduces the same run.
#[test]
fn seeded_runs_are_deterministic() {
    let optimizer = Optimizer::new(&config(16, 8, 99)).unwrap();
    let snapshot = TrafficSnapshot::uniform(6, 4, 2);
    let a = optimizer.optimize(&snapshot, |_| {}).unwrap();
    let b = optimizer.optimize(&snapshot, |_| {}).unwrap();
    assert_eq!(a.best_genome, b.best_genome);
    assert_eq!(a.best_score, b.best_score);
    assert_eq!(a.history, b.history);
}

/// Test that the best genome is always within the legal ranges.
#[test]
fn best_genome_is_legal() {
    let config = config(30, 15, 5);
    let optimizer = Optimizer::new(&config).unwrap();
    let snapshot = TrafficSnapshot::uniform(6, 6, 1);
    let result = optimizer.optimize(&snapshot, |_| {}).unwrap();
    assert_eq!(result.best_genome.len(), 6);
    assert!(result.best_genome.is_legal(&config.signal));
}

/// Test that the search improves on a deliberately poor plan.
#[test]
fn search_beats_a_poor_plan() {
    let config = config(40, 30, 17);
    let optimizer = Optimizer::new(&config).unwrap();
    let snapshot = TrafficSnapshot::uniform(6, 5, 1);
    let poor = Genome::new((0..6).map(|_| Gene::new(20, 0)));
    let poor_score = optimizer.evaluator().breakdown(&poor, &snapshot).total();
    let result = optimizer.optimize(&snapshot, |_| {}).unwrap();
    assert!(result.best_score < poor_score);
}

/// Test that invalid settings are rejected up front.
#[test]
fn invalid_settings_are_rejected() {
    let mut bad = config(20, 10, 1);
    bad.optimizer.mutation_rate = 1.5;
    assert!(Optimizer::new(&bad).is_err());

    let mut bad = config(20, 10, 1);
    bad.optimizer.population_size = 0;
    assert!(Optimizer::new(&bad).is_err());

    let mut bad = config(20, 10, 1);
    bad.optimizer.fitness.jitter_bound = -0.01;
    assert!(Optimizer::new(&bad).is_err());
}
