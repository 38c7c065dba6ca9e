//! # Unit of Work
//!
//! Journal that makes a multi-step operation all-or-nothing.
//!
//! Each external effect is recorded together with the action that undoes it.
//! Notifications are held back until commit. On failure the service replays
//! the compensations newest-first, which restores queue order and custody
//! exactly as they were before the call.
//!
//! ```text
//! [OPEN] ──record/emit──→ [OPEN] ──commit──→ events published
//!                            │
//!                            └── failure ──→ compensations (reverse) ──→ nothing published
//! ```

use super::entities::{DepositPoolEvent, EventRecord};
use super::value_objects::{Address, U256};
use uuid::Uuid;

/// Inverse of one external effect.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Compensation {
    /// Undo a claim-token mint.
    BurnClaim { holder: Address, units: U256 },
    /// Undo a custody deposit.
    WithdrawFromVault { amount: U256 },
    /// Undo a custody withdrawal.
    ReturnToVault { amount: U256 },
    /// Undo a dequeue by putting the minipool back at the head.
    RequeueMinipool { minipool: Address, capacity: U256 },
    /// Undo a capital transfer into a minipool.
    RevertMinipoolDeposit { minipool: Address, amount: U256 },
}

/// Journal for one public operation.
#[derive(Debug)]
pub struct UnitOfWork {
    correlation_id: Uuid,
    compensations: Vec<Compensation>,
    events: Vec<DepositPoolEvent>,
}

impl UnitOfWork {
    /// Opens a journal with a fresh correlation ID.
    #[must_use]
    pub fn begin() -> Self {
        Self::with_correlation_id(Uuid::new_v4())
    }

    /// Opens a journal under an existing correlation ID.
    #[must_use]
    pub fn with_correlation_id(correlation_id: Uuid) -> Self {
        Self {
            correlation_id,
            compensations: Vec::new(),
            events: Vec::new(),
        }
    }

    /// Correlation ID shared by every notification of this operation.
    #[must_use]
    pub fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    /// Records how to undo an effect that has just been applied.
    pub fn record(&mut self, compensation: Compensation) {
        self.compensations.push(compensation);
    }

    /// Buffers a notification until commit.
    pub fn emit(&mut self, event: DepositPoolEvent) {
        self.events.push(event);
    }

    /// Number of effects applied so far.
    #[must_use]
    pub fn effect_count(&self) -> usize {
        self.compensations.len()
    }

    /// Closes the journal successfully, releasing the buffered notifications.
    #[must_use]
    pub fn commit(self) -> Vec<EventRecord> {
        let correlation_id = self.correlation_id;
        self.events
            .into_iter()
            .map(|event| EventRecord {
                correlation_id,
                event,
            })
            .collect()
    }

    /// Closes the journal as failed.
    ///
    /// Returns the compensations newest-first; buffered notifications are dropped.
    #[must_use]
    pub fn abort(self) -> Vec<Compensation> {
        let mut compensations = self.compensations;
        compensations.reverse();
        compensations
    }
}
