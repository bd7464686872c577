use thiserror::Error;

/// Every failure a measurement run can hit. None of these are recovered
/// locally: they abort the round, the sweep, and finally the process.
#[derive(Error, Debug)]
pub enum ChaseError {
    /// Region too small to hold a single slot.
    #[error("region of {size} bytes cannot hold one {slot}-byte slot")]
    InvalidSize { size: usize, slot: usize },

    /// Slot array or index buffer could not be allocated.
    #[error("failed to allocate {slots} slots for a {size}-byte region")]
    Allocation { size: usize, slots: usize },

    /// Worker could not be pinned to its core.
    #[error("cannot pin worker to CPU core {core}: {reason}")]
    AffinityBinding { core: usize, reason: String },

    /// Worker thread panicked before reporting a result.
    #[error("worker on CPU core {core} panicked")]
    WorkerPanicked { core: usize },

    /// Worker thread could not be spawned.
    #[error("failed to spawn worker for CPU core {core}: {source}")]
    Spawn {
        core: usize,
        #[source]
        source: std::io::Error,
    },

    /// A round was requested with zero workers.
    #[error("at least one worker is required")]
    NoWorkers,

    #[error("invalid sweep configuration: {0}")]
    InvalidConfig(String),

    /// Writing the report failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ChaseError>;
