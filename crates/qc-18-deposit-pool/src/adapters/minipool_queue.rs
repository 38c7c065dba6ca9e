//! # Minipool Queue Adapter
//!
//! In-memory FIFO queue of minipools awaiting capital.

use crate::domain::{Address, CollaboratorError, U256};
use crate::ports::outbound::MinipoolQueue;
use parking_lot::RwLock;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

/// A minipool waiting for `capacity` wei.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct QueuedMinipool {
    /// Minipool address.
    pub minipool: Address,
    /// Wei it needs.
    pub capacity: U256,
}

/// In-memory FIFO minipool queue.
#[derive(Debug, Default)]
pub struct InMemoryMinipoolQueue {
    entries: RwLock<VecDeque<QueuedMinipool>>,
    /// Total dequeues performed, including ones later undone.
    dequeues: AtomicU64,
}

impl InMemoryMinipoolQueue {
    /// Create an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a minipool to the tail.
    pub fn enqueue(&self, minipool: Address, capacity: U256) {
        self.entries
            .write()
            .push_back(QueuedMinipool { minipool, capacity });
    }

    /// Snapshot of the queue, head first.
    #[must_use]
    pub fn entries(&self) -> Vec<QueuedMinipool> {
        self.entries.read().iter().copied().collect()
    }

    /// Number of queued minipools.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Returns true if nothing is queued.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Total dequeues performed since creation.
    #[must_use]
    pub fn dequeue_count(&self) -> u64 {
        self.dequeues.load(Ordering::SeqCst)
    }
}

impl MinipoolQueue for InMemoryMinipoolQueue {
    fn effective_capacity(&self) -> Result<U256, CollaboratorError> {
        Ok(self
            .entries
            .read()
            .iter()
            .fold(U256::zero(), |total, e| total.saturating_add(e.capacity)))
    }

    fn next_capacity(&self) -> Result<U256, CollaboratorError> {
        Ok(self
            .entries
            .read()
            .front()
            .map_or_else(U256::zero, |e| e.capacity))
    }

    fn dequeue_minipool(&self) -> Result<Address, CollaboratorError> {
        let entry = self
            .entries
            .write()
            .pop_front()
            .ok_or(CollaboratorError::QueueEmpty)?;
        self.dequeues.fetch_add(1, Ordering::SeqCst);
        debug!(minipool = %entry.minipool, capacity = %entry.capacity, "minipool dequeued");
        Ok(entry.minipool)
    }

    fn requeue_front(&self, minipool: Address, capacity: U256) -> Result<(), CollaboratorError> {
        self.entries
            .write()
            .push_front(QueuedMinipool { minipool, capacity });
        debug!(%minipool, %capacity, "minipool requeued");
        Ok(())
    }
}
