use std::{
    env,
    num::{NonZeroU32, NonZeroUsize},
    thread,
};

use crate::{BadConfiguration, UsageError};

/// The environment variable to override the default worker count.
pub const PARCMP_WORKER_THREADS: &str = "PARCMP_WORKER_THREADS";

/// The block size used when none is specified.
pub const DEFAULT_BLOCK_SIZE: u32 = 4096;

const DEFAULT_BLOCK: NonZeroU32 = NonZeroU32::new(DEFAULT_BLOCK_SIZE).unwrap();

fn available_threads() -> Result<NonZeroUsize, BadConfiguration> {
    match env::var(PARCMP_WORKER_THREADS) {
        Ok(value) => value.trim().parse().map_err(|_| BadConfiguration),

        Err(_) => Ok(thread::available_parallelism().unwrap_or(NonZeroUsize::MIN)),
    }
}

/// Parameters of a comparison run.
///
/// Defaults to one worker per logical CPU, configurable with the
/// `PARCMP_WORKER_THREADS` environment variable, and blocks of
/// [`DEFAULT_BLOCK_SIZE`] bytes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
    worker_count: NonZeroUsize,
    block_size: NonZeroU32,
}

impl Config {
    /// Creates a configuration from explicit values.
    pub fn new(worker_count: usize, block_size: u32) -> Result<Self, UsageError> {
        Ok(Self {
            worker_count: NonZeroUsize::new(worker_count).ok_or(UsageError::NoWorkers)?,
            block_size: NonZeroU32::new(block_size).ok_or(UsageError::EmptyBlocks)?,
        })
    }

    /// Creates the default configuration for this system.
    pub fn from_env() -> Result<Self, BadConfiguration> {
        Ok(Self {
            worker_count: available_threads()?,
            block_size: DEFAULT_BLOCK,
        })
    }

    /// Replaces the worker count.
    pub fn with_worker_count(self, worker_count: usize) -> Result<Self, UsageError> {
        Self::new(worker_count, self.block_size.get())
    }

    /// Replaces the block size.
    pub fn with_block_size(self, block_size: u32) -> Result<Self, UsageError> {
        Self::new(self.worker_count.get(), block_size)
    }

    #[inline]
    pub fn worker_count(&self) -> usize {
        self.worker_count.get()
    }

    #[inline]
    pub fn block_size(&self) -> u32 {
        self.block_size.get()
    }
}
