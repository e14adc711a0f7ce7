use std::{
    mem,
    ops::{Deref, DerefMut},
    sync::Arc,
};

use crossbeam_queue::ArrayQueue;

/// A bounded pool of block buffers shared by the workers of a run.
///
/// Buffers are preallocated for the block size so that comparing a
/// block never allocates on the worker threads.
#[derive(Debug)]
pub struct Pool {
    queue: ArrayQueue<Vec<u8>>,
    block_size: usize,
}

impl Pool {
    /// Creates a pool holding `capacity` buffers of `block_size` bytes.
    pub fn new(capacity: usize, block_size: usize) -> Arc<Self> {
        let queue = ArrayQueue::new(capacity.max(1));
        for _ in 0..queue.capacity() {
            let _ = queue.push(Vec::with_capacity(block_size));
        }

        Arc::new(Self { queue, block_size })
    }

    /// Takes a buffer from the pool.
    ///
    /// When the pool is drained, a fresh buffer is allocated instead;
    /// it joins the pool on drop if there is room for it.
    pub fn get(self: Arc<Self>) -> PoolRef {
        let inner = self
            .queue
            .pop()
            .unwrap_or_else(|| Vec::with_capacity(self.block_size));

        PoolRef { pool: self, inner }
    }

    /// The number of buffers currently idle in the pool.
    #[cfg(test)]
    pub fn idle(&self) -> usize {
        self.queue.len()
    }
}

/// A buffer borrowed from a [`Pool`].
///
/// The buffer is cleared and handed back to the pool on drop.
#[derive(Debug)]
pub struct PoolRef {
    pool: Arc<Pool>,
    inner: Vec<u8>,
}

impl Deref for PoolRef {
    type Target = Vec<u8>;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl DerefMut for PoolRef {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.inner
    }
}

impl Drop for PoolRef {
    fn drop(&mut self) {
        let mut value = mem::take(&mut self.inner);
        value.clear();

        let _ = self.pool.queue.push(value);
    }
}
