//! Messages exchanged between the coordinator and its workers.

use crate::SourceError;

/// Identifies a worker within one comparison run.
///
/// Ids are dense and range from zero to the worker count.
pub type WorkerId = usize;

/// An assignment from the coordinator to a worker.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Job {
    /// The index of the block to compare, or `-1` to stop.
    pub block_index: i64,
    /// The length of the block in bytes; ignored for [`Job::STOP`].
    pub length: u32,
}

impl Job {
    /// Instructs a worker to send its terminal outcome and stop.
    pub const STOP: Self = Self {
        block_index: -1,
        length: 0,
    };

    #[inline]
    pub const fn new(block_index: i64, length: u32) -> Self {
        Self {
            block_index,
            length,
        }
    }

    #[inline]
    pub const fn is_stop(&self) -> bool {
        self.block_index < 0
    }
}

/// A worker's request for its next [`Job`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReadyRequest {
    pub worker_id: WorkerId,
}

/// Why a worker stopped.
#[derive(Debug)]
pub enum Termination {
    /// The coordinator told the worker to stop.
    Stopped,
    /// The assigned block differs between the inputs, starting at the
    /// given absolute byte offset.
    Mismatch { offset: u64 },
    /// Reading the assigned block failed.
    Failed(SourceError),
    /// The worker unwound before it could report.
    Aborted,
}

/// The result a worker reports to the coordinator.
///
/// Every worker sends exactly one outcome with `terminal` set, and
/// it is always the last message it sends.
#[derive(Debug)]
pub struct Outcome {
    pub worker_id: WorkerId,
    /// The block the outcome refers to, or `-1` if there is none.
    pub block_index: i64,
    pub mismatch: bool,
    /// The number of blocks this worker compared during the run.
    pub blocks_processed: u64,
    pub terminal: bool,
    pub termination: Termination,
}

impl Outcome {
    fn terminal(
        worker_id: WorkerId,
        block_index: i64,
        blocks_processed: u64,
        termination: Termination,
    ) -> Self {
        Self {
            worker_id,
            block_index,
            mismatch: matches!(termination, Termination::Mismatch { .. }),
            blocks_processed,
            terminal: true,
            termination,
        }
    }

    /// The worker was told to stop after `blocks_processed` blocks.
    pub fn stopped(worker_id: WorkerId, blocks_processed: u64) -> Self {
        Self::terminal(worker_id, -1, blocks_processed, Termination::Stopped)
    }

    /// The worker found a mismatch in `block_index`.
    pub fn mismatch(
        worker_id: WorkerId,
        block_index: i64,
        offset: u64,
        blocks_processed: u64,
    ) -> Self {
        Self::terminal(
            worker_id,
            block_index,
            blocks_processed,
            Termination::Mismatch { offset },
        )
    }

    /// The worker failed to read `block_index`.
    pub fn failed(
        worker_id: WorkerId,
        block_index: i64,
        error: SourceError,
        blocks_processed: u64,
    ) -> Self {
        Self::terminal(
            worker_id,
            block_index,
            blocks_processed,
            Termination::Failed(error),
        )
    }

    /// The worker unwound before it could send a regular outcome.
    pub fn aborted(worker_id: WorkerId, blocks_processed: u64) -> Self {
        Self::terminal(worker_id, -1, blocks_processed, Termination::Aborted)
    }
}

/// Everything a worker sends to the coordinator.
#[derive(Debug)]
pub enum Message {
    Ready(ReadyRequest),
    Outcome(Outcome),
}
