use std::{io, path::PathBuf};

use thiserror::Error;

use crate::message::WorkerId;

/// Errors that prevent a comparison from being started.
#[derive(Debug, Error)]
pub enum CompareError {
    /// The supplied parameters were rejected.
    #[error(transparent)]
    Usage(#[from] UsageError),

    /// One of the inputs could not be opened.
    #[error(transparent)]
    Source(#[from] SourceError),
}

/// Invalid invocation parameters.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum UsageError {
    /// A comparison needs at least one worker.
    #[error("worker count must be at least 1")]
    NoWorkers,

    /// Blocks must be at least one byte long.
    #[error("block size must be at least 1 byte")]
    EmptyBlocks,

    /// The worker count from the environment could not be parsed.
    #[error(transparent)]
    Configuration(#[from] BadConfiguration),
}

/// An invalid worker count in the environment.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error(
    "invalid value in {}; must be a natural number",
    crate::config::PARCMP_WORKER_THREADS
)]
pub struct BadConfiguration;

/// Errors from opening or reading a [`BlockSource`](crate::BlockSource).
#[derive(Debug, Error)]
pub enum SourceError {
    /// The input does not exist.
    #[error("'{}' does not exist", .0.display())]
    NotFound(PathBuf),

    /// The input exists but may not be read.
    #[error("permission denied for '{}'", .0.display())]
    PermissionDenied(PathBuf),

    /// Any other failure to open or inspect the input.
    #[error("failed to open '{}': {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A positioned read failed.
    #[error("failed to read {len} bytes at offset {offset}: {source}")]
    Read {
        offset: u64,
        len: usize,
        #[source]
        source: io::Error,
    },
}

impl SourceError {
    pub(crate) fn from_open(path: PathBuf, source: io::Error) -> Self {
        match source.kind() {
            io::ErrorKind::NotFound => Self::NotFound(path),
            io::ErrorKind::PermissionDenied => Self::PermissionDenied(path),
            _ => Self::Open { path, source },
        }
    }
}

/// Violations of the message contract between workers and the
/// coordinator.
///
/// These never abort a comparison. The offending worker is treated
/// as terminated with no further blocks processed.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ProtocolError {
    #[error("message from unknown worker {0}")]
    UnknownWorker(WorkerId),

    #[error("worker {0} sent a message after its terminal outcome")]
    AfterTerminal(WorkerId),

    #[error("worker {0} sent a non-terminal outcome")]
    NonTerminal(WorkerId),

    #[error("worker {0} requested work with a job still pending")]
    SlotOccupied(WorkerId),

    #[error("worker {0} is no longer accepting jobs")]
    WorkerGone(WorkerId),

    #[error("worker {0} terminated without reporting an outcome")]
    Vanished(WorkerId),

    #[error("the coordinator is no longer accepting messages")]
    CoordinatorGone,
}
