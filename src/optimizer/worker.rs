use super::{OptimizationResult, Optimizer, Progress};
use crate::error::{Error, Result};
use crate::snapshot::TrafficSnapshot;
use log::debug;
use std::sync::mpsc::{self, Receiver};
use std::thread::{self, JoinHandle};

/// A handle to an optimization running on a background thread.
///
/// Progress records arrive over a channel and can be drained from the
/// owning thread between simulation ticks. The run cannot be cancelled.
pub struct OptimizationHandle {
    /// Receives one record per generation.
    progress: Receiver<Progress>,
    /// The worker thread.
    thread: JoinHandle<Result<OptimizationResult>>,
}

/// Starts `optimizer` on a background thread against a frozen snapshot.
pub fn spawn_optimization(
    optimizer: Optimizer,
    snapshot: TrafficSnapshot,
) -> Result<OptimizationHandle> {
    let (sender, receiver) = mpsc::channel();
    let thread = thread::Builder::new()
        .name("signal-optimizer".into())
        .spawn(move || {
            optimizer.optimize(&snapshot, |progress| {
                // The owner may have dropped the handle; the run still completes
                if sender.send(progress).is_err() {
                    debug!("Progress receiver dropped at generation {}", progress.generation);
                }
            })
        })
        .map_err(|err| Error::WorkerSpawn(err.to_string()))?;
    Ok(OptimizationHandle {
        progress: receiver,
        thread,
    })
}

impl OptimizationHandle {
    /// Drains the progress records received so far without blocking.
    pub fn progress(&self) -> impl Iterator<Item = Progress> + '_ {
        self.progress.try_iter()
    }

    /// Gets the most recent progress record received so far, if any.
    pub fn latest_progress(&self) -> Option<Progress> {
        self.progress().last()
    }

    /// Whether the worker has finished, successfully or not.
    pub fn is_finished(&self) -> bool {
        self.thread.is_finished()
    }

    /// Blocks until the worker finishes and returns its result.
    pub fn join(self) -> Result<OptimizationResult> {
        self.thread.join().map_err(|_| Error::WorkerPanicked)?
    }
}
