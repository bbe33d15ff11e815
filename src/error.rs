use thiserror::Error;

/// Errors raised when a caller breaks the contract of the simulation or optimizer.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum Error {
    /// The simulation has not been started since it was created or last reset.
    #[error("simulation not running")]
    NotRunning,
    /// A genome does not have one gene per intersection.
    #[error("genome has {actual} genes but the grid has {expected} intersections")]
    GenomeLength { expected: usize, actual: usize },
    /// A traffic snapshot does not have one reading per intersection.
    #[error("snapshot has {actual} readings but the grid has {expected} intersections")]
    SnapshotLength { expected: usize, actual: usize },
    /// A configuration value violates one of its invariants.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    /// The optimizer worker thread could not be started.
    #[error("failed to spawn optimizer worker: {0}")]
    WorkerSpawn(String),
    /// The optimizer worker thread panicked before producing a result.
    #[error("optimizer worker panicked")]
    WorkerPanicked,
}

pub type Result<T> = std::result::Result<T, Error>;
