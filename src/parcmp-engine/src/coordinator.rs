use std::{collections::BTreeMap, sync::Arc};

use threadpool::{Builder, ThreadPool};

use crate::{
    channel::{self, JobSender},
    memory::Pool,
    message::{Job, Message, Outcome, Termination, WorkerId},
    worker::{Inputs, Worker},
    BlockSource, Config, ProtocolError, Report, Verdict,
};

const WORKER_NAME: &str = "parcmp-worker";
const WORKER_STACK: usize = 1_048_576;

/// The capacity of one block buffer; no read is ever longer than
/// the input itself.
fn buffer_capacity(block_size: u32, file_size: u64) -> usize {
    u64::from(block_size).min(file_size) as usize
}

fn make_worker_pool(nthreads: usize) -> ThreadPool {
    Builder::new()
        .num_threads(nthreads)
        .thread_name(WORKER_NAME.into())
        .thread_stack_size(WORKER_STACK)
        .build()
}

/// The bookkeeping of one comparison run.
///
/// Only the coordinator ever reads or mutates this state. Workers
/// learn about it exclusively through the jobs they are handed.
#[derive(Debug)]
pub struct ComparisonState {
    next_block: i64,
    total_blocks: i64,
    file_size: u64,
    block_size: u32,
    mismatch_found: bool,
    mismatch_block: i64,
    mismatch_offset: u64,
    per_worker_blocks_processed: Vec<Option<u64>>,
    workers_done: usize,
    incomplete: bool,
    io_error: Option<String>,
}

impl ComparisonState {
    /// Creates the state for comparing two inputs of `file_size`
    /// bytes each with `worker_count` workers.
    pub fn new(file_size: u64, block_size: u32, worker_count: usize) -> Self {
        let total_blocks = file_size.div_ceil(u64::from(block_size));

        Self {
            next_block: 0,
            total_blocks: total_blocks as i64,
            file_size,
            block_size,
            mismatch_found: false,
            mismatch_block: -1,
            mismatch_offset: 0,
            per_worker_blocks_processed: vec![None; worker_count],
            workers_done: 0,
            incomplete: false,
            io_error: None,
        }
    }

    #[inline]
    pub fn total_blocks(&self) -> i64 {
        self.total_blocks
    }

    /// Whether every worker has sent its terminal outcome.
    #[inline]
    pub fn is_finished(&self) -> bool {
        self.workers_done == self.per_worker_blocks_processed.len()
    }

    /// The length in bytes of `block`; only the last block may be
    /// shorter than the block size.
    pub fn block_length(&self, block: i64) -> u32 {
        let start = block as u64 * u64::from(self.block_size);
        let remaining = self.file_size.saturating_sub(start);

        remaining.min(u64::from(self.block_size)) as u32
    }

    fn check_active(&self, worker_id: WorkerId) -> Result<(), ProtocolError> {
        match self.per_worker_blocks_processed.get(worker_id) {
            None => Err(ProtocolError::UnknownWorker(worker_id)),
            Some(Some(_)) => Err(ProtocolError::AfterTerminal(worker_id)),
            Some(None) => Ok(()),
        }
    }

    /// Answers a worker's request for its next job.
    pub fn on_ready(&mut self, worker_id: WorkerId) -> Result<Job, ProtocolError> {
        self.check_active(worker_id)?;

        if self.mismatch_found || self.next_block >= self.total_blocks {
            return Ok(Job::STOP);
        }

        let block = self.next_block;
        self.next_block += 1;

        Ok(Job::new(block, self.block_length(block)))
    }

    fn finish_worker(&mut self, worker_id: WorkerId, blocks_processed: u64) {
        self.per_worker_blocks_processed[worker_id] = Some(blocks_processed);
        self.workers_done += 1;
    }

    /// Records a worker's outcome.
    ///
    /// The state is updated even when a protocol violation is
    /// returned; a non-terminal outcome ends the worker regardless.
    pub fn on_outcome(&mut self, outcome: Outcome) -> Result<(), ProtocolError> {
        let worker_id = outcome.worker_id;
        self.check_active(worker_id)?;

        if !outcome.terminal {
            self.incomplete = true;
            self.finish_worker(worker_id, 0);
            return Err(ProtocolError::NonTerminal(worker_id));
        }

        match outcome.termination {
            Termination::Stopped => {}

            Termination::Mismatch { offset } => {
                if !self.mismatch_found {
                    log::debug!(
                        "Worker {worker_id} found first mismatch in block {}",
                        outcome.block_index
                    );

                    self.mismatch_found = true;
                    self.mismatch_block = outcome.block_index;
                    self.mismatch_offset = offset;
                }
            }

            Termination::Failed(e) => {
                self.incomplete = true;
                self.io_error.get_or_insert_with(|| e.to_string());
            }

            Termination::Aborted => {
                self.incomplete = true;
                self.io_error
                    .get_or_insert_with(|| format!("worker {worker_id} terminated abnormally"));
            }
        }

        self.finish_worker(worker_id, outcome.blocks_processed);
        Ok(())
    }

    /// Marks every worker that has not reported yet as terminated
    /// without any processed blocks.
    pub fn abandon_remaining(&mut self) {
        for worker_id in 0..self.per_worker_blocks_processed.len() {
            if self.per_worker_blocks_processed[worker_id].is_none() {
                log::warn!("{}", ProtocolError::Vanished(worker_id));

                self.incomplete = true;
                self.io_error
                    .get_or_insert_with(|| ProtocolError::Vanished(worker_id).to_string());
                self.finish_worker(worker_id, 0);
            }
        }
    }

    /// Produces the final report once all workers are done.
    pub fn into_report(self) -> Report {
        let outcome = if self.mismatch_found {
            Verdict::Mismatch
        } else if self.incomplete {
            Verdict::IoError
        } else {
            debug_assert_eq!(self.next_block, self.total_blocks);
            Verdict::Success
        };

        let per_worker_blocks_processed: BTreeMap<_, _> = self
            .per_worker_blocks_processed
            .into_iter()
            .enumerate()
            .filter_map(|(id, blocks)| blocks.map(|b| (id, b)))
            .collect();

        Report {
            outcome,
            mismatch_block: self.mismatch_found.then_some(self.mismatch_block),
            mismatch_offset: self.mismatch_found.then_some(self.mismatch_offset),
            total_blocks: self.total_blocks,
            block_size: self.block_size,
            left_len: self.file_size,
            right_len: self.file_size,
            per_worker_blocks_processed,
            io_error: if self.mismatch_found {
                None
            } else {
                self.io_error
            },
        }
    }
}

/// Drives a comparison of two inputs across a pool of workers.
///
/// The coordinator is the single owner of all comparison state. It
/// serves worker messages in arrival order on the calling thread
/// until every worker has sent its terminal outcome, and joins all
/// worker threads before returning the report.
#[derive(Debug)]
pub struct Coordinator {
    left: BlockSource,
    right: BlockSource,
    config: Config,
}

impl Coordinator {
    pub fn new(left: BlockSource, right: BlockSource, config: Config) -> Self {
        Self {
            left,
            right,
            config,
        }
    }

    /// Runs the comparison to completion.
    pub fn run(self) -> Report {
        let block_size = self.config.block_size();
        let (left_len, right_len) = (self.left.len(), self.right.len());

        if left_len != right_len {
            log::info!("Input sizes differ ({left_len} vs {right_len} bytes)");
            return Report::size_mismatch(left_len, right_len, block_size);
        }

        let nworkers = self.config.worker_count();
        let mut state = ComparisonState::new(left_len, block_size, nworkers);
        log::debug!(
            "Comparing '{}' and '{}': {} blocks of {block_size} bytes with {nworkers} workers",
            self.left.path().display(),
            self.right.path().display(),
            state.total_blocks()
        );

        let inputs = Arc::new(Inputs {
            left: self.left,
            right: self.right,
            block_size,
            pool: Pool::new(2 * nworkers, buffer_capacity(block_size, left_len)),
        });

        let pool = make_worker_pool(nworkers);
        let (results_tx, results) = channel::result_channel();

        let queues: Vec<JobSender> = (0..nworkers)
            .map(|id| {
                let (job_tx, job_rx) = channel::job_queue(id);
                let worker = Worker::new(id, inputs.clone(), job_rx, results_tx.clone());
                pool.execute(move || worker.run());

                job_tx
            })
            .collect();

        // Workers now hold the only senders, so the channel closes
        // should all of them vanish without reporting.
        drop(results_tx);

        while !state.is_finished() {
            let Some(message) = results.recv() else {
                state.abandon_remaining();
                break;
            };

            match message {
                Message::Ready(req) => match state.on_ready(req.worker_id) {
                    Ok(job) => {
                        if let Err(e) = queues[req.worker_id].send(job) {
                            log::warn!("{e}");
                        }
                    }

                    Err(e) => log::warn!("{e}"),
                },

                Message::Outcome(outcome) => {
                    if let Err(e) = state.on_outcome(outcome) {
                        log::warn!("{e}");
                    }
                }
            }
        }

        drop(queues);
        pool.join();
        if pool.panic_count() > 0 {
            log::warn!("{} workers panicked", pool.panic_count());
        }

        let report = state.into_report();
        log::info!(
            "Compared {} of {} blocks: {:?}",
            report.blocks_processed(),
            report.total_blocks,
            report.outcome
        );

        report
    }
}
