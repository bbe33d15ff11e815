//! Tests of running an optimization on a background thread.

use signal_ga::{spawn_optimization, Config, Optimizer, Simulation};

/// Test that a background optimization reports progress and yields a plan
/// the simulation accepts.
#[test]
fn background_optimization_applies_to_simulation() {
    let mut config = Config::default();
    config.optimizer.population_size = 12;
    config.optimizer.generations = 6;
    config.optimizer.seed = Some(4);

    let mut sim = Simulation::with_seed(config.clone(), 4).unwrap();
    sim.start();
    for _ in 0..200 {
        sim.update(0.05);
    }
    let snapshot = sim.sample_traffic().unwrap();

    let optimizer = Optimizer::new(&config).unwrap();
    let handle = spawn_optimization(optimizer, snapshot).unwrap();
    // The simulation keeps running while the search is in progress
    for _ in 0..20 {
        sim.update(0.05);
    }
    let result = handle.join().unwrap();
    assert_eq!(result.history.len(), 6);

    sim.apply_solution(&result.best_genome).unwrap();
    assert!(sim.is_optimized());
    assert_eq!(sim.current_plan(), result.best_genome);
}

/// Test that every generation's progress is delivered over the channel.
#[test]
fn progress_arrives_over_channel() {
    let mut config = Config::default();
    config.optimizer.population_size = 10;
    config.optimizer.generations = 5;
    config.optimizer.seed = Some(8);

    let snapshot = signal_ga::TrafficSnapshot::uniform(6, 2, 1);
    let handle = spawn_optimization(Optimizer::new(&config).unwrap(), snapshot).unwrap();
    while !handle.is_finished() {
        std::thread::yield_now();
    }
    let reports = handle.progress().collect::<Vec<_>>();
    assert_eq!(reports.len(), 5);
    assert_eq!(reports.last().unwrap().generation, 4);
    assert!(handle.join().is_ok());
}
