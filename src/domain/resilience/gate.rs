//! Process-local bounded admission for downstream calls

use std::sync::Arc;
use std::time::Instant;

use tokio::sync::{OwnedSemaphorePermit, Semaphore};

use crate::domain::DomainError;

/// Default number of simultaneous downstream calls per process
pub const DEFAULT_GATE_CAPACITY: usize = 2;

/// Counting semaphore with a FIFO wait queue.
///
/// Waiters are served in the order they called [`ConcurrencyGate::acquire`].
/// The bound holds for one process only; replicas each get their own gate.
#[derive(Debug)]
pub struct ConcurrencyGate {
    semaphore: Arc<Semaphore>,
    capacity: usize,
}

/// A granted slot. Dropping it releases the slot to the oldest waiter.
#[derive(Debug)]
pub struct GatePermit {
    _permit: OwnedSemaphorePermit,
    acquired_at: Instant,
}

impl GatePermit {
    pub fn held_for(&self) -> std::time::Duration {
        self.acquired_at.elapsed()
    }
}

impl Default for ConcurrencyGate {
    fn default() -> Self {
        Self {
            semaphore: Arc::new(Semaphore::new(DEFAULT_GATE_CAPACITY)),
            capacity: DEFAULT_GATE_CAPACITY,
        }
    }
}

impl ConcurrencyGate {
    pub fn new(capacity: usize) -> Result<Self, DomainError> {
        if capacity == 0 {
            return Err(DomainError::configuration(
                "Concurrency gate capacity must be at least 1",
            ));
        }

        if capacity > Semaphore::MAX_PERMITS {
            return Err(DomainError::configuration(format!(
                "Concurrency gate capacity must not exceed {}",
                Semaphore::MAX_PERMITS
            )));
        }

        Ok(Self {
            semaphore: Arc::new(Semaphore::new(capacity)),
            capacity,
        })
    }

    /// Wait for a free slot
    pub async fn acquire(&self) -> Result<GatePermit, DomainError> {
        let permit = self
            .semaphore
            .clone()
            .acquire_owned()
            .await
            .map_err(|e| DomainError::internal(format!("Concurrency gate closed: {}", e)))?;

        Ok(GatePermit {
            _permit: permit,
            acquired_at: Instant::now(),
        })
    }

    /// Give a slot back explicitly; equivalent to dropping the permit
    pub fn release(&self, permit: GatePermit) {
        drop(permit);
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn available(&self) -> usize {
        self.semaphore.available_permits()
    }

    pub fn in_use(&self) -> usize {
        self.capacity - self.available()
    }
}
