//! Channels connecting the coordinator with its workers.
//!
//! Every worker owns a single-slot [`job_queue`] the coordinator
//! delivers jobs on, and all workers share one many-to-one
//! [`result_channel`] back to the coordinator.

use std::sync::mpsc;

use crate::{
    message::{Job, Message, Outcome, ReadyRequest, WorkerId},
    ProtocolError,
};

/// Creates the job queue for the worker identified by `worker_id`.
pub fn job_queue(worker_id: WorkerId) -> (JobSender, JobReceiver) {
    let (tx, rx) = mpsc::sync_channel(1);
    (JobSender { worker_id, tx }, JobReceiver { rx })
}

/// The coordinator's end of a worker's job queue.
#[derive(Debug)]
pub struct JobSender {
    worker_id: WorkerId,
    tx: mpsc::SyncSender<Job>,
}

impl JobSender {
    /// Hands `job` to the worker without blocking.
    ///
    /// A worker only ever waits for one job at a time, so finding
    /// the slot occupied means the worker broke the protocol.
    pub fn send(&self, job: Job) -> Result<(), ProtocolError> {
        self.tx.try_send(job).map_err(|e| match e {
            mpsc::TrySendError::Full(_) => ProtocolError::SlotOccupied(self.worker_id),
            mpsc::TrySendError::Disconnected(_) => ProtocolError::WorkerGone(self.worker_id),
        })
    }
}

/// A worker's end of its job queue.
#[derive(Debug)]
pub struct JobReceiver {
    rx: mpsc::Receiver<Job>,
}

impl JobReceiver {
    /// Blocks until the next job arrives.
    ///
    /// Returns [`None`] when the coordinator dropped the queue.
    pub fn recv(&self) -> Option<Job> {
        self.rx.recv().ok()
    }
}

/// Creates the channel all workers report to.
pub fn result_channel() -> (ResultSender, ResultReceiver) {
    let (tx, rx) = mpsc::channel();
    (ResultSender { tx }, ResultReceiver { rx })
}

/// A worker's handle to the result channel.
#[derive(Clone, Debug)]
pub struct ResultSender {
    tx: mpsc::Sender<Message>,
}

impl ResultSender {
    /// Announces that `worker_id` is ready for its next job.
    pub fn ready(&self, worker_id: WorkerId) -> Result<(), ProtocolError> {
        self.send(Message::Ready(ReadyRequest { worker_id }))
    }

    /// Reports an outcome to the coordinator.
    pub fn outcome(&self, outcome: Outcome) -> Result<(), ProtocolError> {
        self.send(Message::Outcome(outcome))
    }

    fn send(&self, message: Message) -> Result<(), ProtocolError> {
        self.tx
            .send(message)
            .map_err(|_| ProtocolError::CoordinatorGone)
    }
}

/// The coordinator's end of the result channel.
#[derive(Debug)]
pub struct ResultReceiver {
    rx: mpsc::Receiver<Message>,
}

impl ResultReceiver {
    /// Blocks until the next message arrives.
    ///
    /// Returns [`None`] once every [`ResultSender`] was dropped.
    pub fn recv(&self) -> Option<Message> {
        self.rx.recv().ok()
    }
}
