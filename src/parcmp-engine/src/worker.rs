use std::sync::Arc;

use crate::{
    channel::{JobReceiver, ResultSender},
    memory::{Pool, PoolRef},
    message::{Job, Outcome, WorkerId},
    BlockSource, SourceError,
};

/// Read-only state shared by all workers of a run.
#[derive(Debug)]
pub(crate) struct Inputs {
    pub left: BlockSource,
    pub right: BlockSource,
    pub block_size: u32,
    pub pool: Arc<Pool>,
}

/// Finds the first position at which `a` and `b` differ.
///
/// When one slice is a prefix of the other, the length of the
/// shorter one is the first difference.
pub(crate) fn first_difference(a: &[u8], b: &[u8]) -> Option<usize> {
    if a == b {
        return None;
    }

    let common = a.iter().zip(b).position(|(x, y)| x != y);
    Some(common.unwrap_or_else(|| a.len().min(b.len())))
}

/// A worker's connection to the coordinator, tracking its progress.
///
/// If a worker drops this without having sent its terminal outcome,
/// e.g. while unwinding from a panic, an aborted outcome is sent in
/// its place so the coordinator never waits for it forever.
#[derive(Debug)]
pub(crate) struct Reporter {
    worker_id: WorkerId,
    results: ResultSender,
    blocks_processed: u64,
    finished: bool,
}

impl Reporter {
    pub fn new(worker_id: WorkerId, results: ResultSender) -> Self {
        Self {
            worker_id,
            results,
            blocks_processed: 0,
            finished: false,
        }
    }

    fn ready(&mut self) -> bool {
        match self.results.ready(self.worker_id) {
            Ok(()) => true,
            Err(e) => {
                // Nobody is left to hear about it.
                log::warn!("Worker {}: {e}", self.worker_id);
                self.finished = true;
                false
            }
        }
    }

    fn finish(&mut self, outcome: Outcome) {
        debug_assert!(outcome.terminal);

        self.finished = true;
        if let Err(e) = self.results.outcome(outcome) {
            log::warn!("Worker {}: {e}", self.worker_id);
        }
    }
}

impl Drop for Reporter {
    fn drop(&mut self) {
        if !self.finished {
            log::warn!(
                "Worker {} terminated abnormally after {} blocks",
                self.worker_id,
                self.blocks_processed
            );

            let outcome = Outcome::aborted(self.worker_id, self.blocks_processed);
            let _ = self.results.outcome(outcome);
        }
    }
}

enum State {
    RequestingJob,
    AwaitingJob,
    Comparing(Job),
    Reporting(Outcome),
    Stopped,
}

/// Compares one block at a time as assigned by the coordinator.
pub(crate) struct Worker {
    id: WorkerId,
    inputs: Arc<Inputs>,
    jobs: JobReceiver,
    reporter: Reporter,
    left_buf: PoolRef,
    right_buf: PoolRef,
}

impl Worker {
    pub fn new(
        id: WorkerId,
        inputs: Arc<Inputs>,
        jobs: JobReceiver,
        results: ResultSender,
    ) -> Self {
        let left_buf = inputs.pool.clone().get();
        let right_buf = inputs.pool.clone().get();

        Self {
            id,
            inputs,
            jobs,
            reporter: Reporter::new(id, results),
            left_buf,
            right_buf,
        }
    }

    /// Runs the worker until it is told to stop or has to stop.
    pub fn run(mut self) {
        log::debug!("Worker {} started", self.id);

        let mut state = State::RequestingJob;
        loop {
            state = match state {
                State::RequestingJob => {
                    if self.reporter.ready() {
                        State::AwaitingJob
                    } else {
                        State::Stopped
                    }
                }

                State::AwaitingJob => match self.jobs.recv() {
                    Some(job) if job.is_stop() => State::Reporting(Outcome::stopped(
                        self.id,
                        self.reporter.blocks_processed,
                    )),
                    Some(job) => State::Comparing(job),
                    None => State::Reporting(Outcome::aborted(
                        self.id,
                        self.reporter.blocks_processed,
                    )),
                },

                State::Comparing(job) => self.compare(job),

                State::Reporting(outcome) => {
                    self.reporter.finish(outcome);
                    State::Stopped
                }

                State::Stopped => break,
            };
        }

        log::debug!(
            "Worker {} stopped after {} blocks",
            self.id,
            self.reporter.blocks_processed
        );
    }

    fn compare(&mut self, job: Job) -> State {
        let offset = job.block_index as u64 * u64::from(self.inputs.block_size);
        let len = job.length as usize;
        log::trace!(
            "Worker {} comparing block {} ({len} bytes at {offset})",
            self.id,
            job.block_index
        );

        let left = match self.inputs.left.read_block(offset, len, &mut self.left_buf) {
            Ok(block) => block,
            Err(e) => return self.failed(job, e),
        };
        let right = match self.inputs.right.read_block(offset, len, &mut self.right_buf) {
            Ok(block) => block,
            Err(e) => return self.failed(job, e),
        };

        self.reporter.blocks_processed += 1;

        match first_difference(left, right) {
            None => State::RequestingJob,
            Some(pos) => State::Reporting(Outcome::mismatch(
                self.id,
                job.block_index,
                offset + pos as u64,
                self.reporter.blocks_processed,
            )),
        }
    }

    fn failed(&self, job: Job, error: SourceError) -> State {
        log::warn!("Worker {}: {error}", self.id);
        State::Reporting(Outcome::failed(
            self.id,
            job.block_index,
            error,
            self.reporter.blocks_processed,
        ))
    }
}
