use log::info;
use signal_ga::{spawn_optimization, Config, Optimizer, Simulation, Statistics};
use std::thread;
use std::time::Duration;

/// The simulation time step.
const DT: f64 = 1.0 / 60.0;

/// How long the simulation runs before and after optimising.
const WARM_UP_SEC: f64 = 60.0;

fn main() -> signal_ga::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut config = Config::default();
    config.optimizer.generations = 60;
    let mut sim = Simulation::new(config.clone())?;
    sim.start();
    run(&mut sim, WARM_UP_SEC);
    let before = sim.get_statistics();
    report("Before", &before);

    // Optimise in the background while the simulation keeps running
    let snapshot = sim.sample_traffic()?;
    let handle = spawn_optimization(Optimizer::new(&config)?, snapshot)?;
    let mut last_generation = None;
    while !handle.is_finished() {
        sim.update(DT);
        thread::sleep(Duration::from_secs_f64(DT));
        if let Some(progress) = handle.latest_progress() {
            if last_generation != Some(progress.generation) && progress.generation % 10 == 0 {
                info!(
                    "Generation {}/{}: best score {:.3}",
                    progress.generation + 1,
                    progress.total,
                    progress.best_score
                );
            }
            last_generation = Some(progress.generation);
        }
    }
    let result = handle.join()?;
    info!(
        "Best plan {:?} with score {:.3}",
        result.best_genome.genes(),
        result.best_score
    );

    sim.apply_solution(&result.best_genome)?;
    run(&mut sim, WARM_UP_SEC);
    report("After", &sim.get_statistics());
    Ok(())
}

fn run(sim: &mut Simulation, duration: f64) {
    let steps = (duration / DT).round() as usize;
    for _ in 0..steps {
        sim.update(DT);
    }
}

fn report(label: &str, stats: &Statistics) {
    println!(
        "{label}: t={:.1} active={} spawned={} completed={} waiting={} avg wait={:.2} optimized={}",
        stats.time,
        stats.active,
        stats.spawned,
        stats.completed,
        stats.waiting,
        stats.avg_wait_time,
        stats.optimized,
    );
}
