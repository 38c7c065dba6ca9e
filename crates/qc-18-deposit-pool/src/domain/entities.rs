//! # Domain Entities
//!
//! Policy snapshots, notifications, and operation receipts.
//!
//! The pool keeps no durable records of its own. Everything here is either a
//! per-call snapshot of external state or a description of what a call did.

use super::value_objects::{units, Address, Timestamp, U256};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// =============================================================================
// DEPOSIT POLICY
// =============================================================================

/// Deposit policy values, read once at the start of each call.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepositSettings {
    /// Whether new contributions are accepted.
    pub deposit_enabled: bool,
    /// Smallest accepted contribution in wei.
    pub minimum_deposit: U256,
    /// Largest pool balance a contribution may produce, in wei.
    pub maximum_deposit_pool_size: U256,
    /// Whether capital is assigned to queued minipools.
    pub assign_deposits_enabled: bool,
    /// Upper bound on assignments performed by one call.
    pub maximum_deposit_assignments: u64,
}

impl Default for DepositSettings {
    fn default() -> Self {
        Self {
            deposit_enabled: true,
            minimum_deposit: units::milliether(10),
            maximum_deposit_pool_size: units::ether(160),
            assign_deposits_enabled: true,
            maximum_deposit_assignments: 2,
        }
    }
}

// =============================================================================
// NOTIFICATIONS
// =============================================================================

/// Where recycled capital came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecycleKind {
    /// Returned by a minipool that dissolved before staking.
    Dissolved,
    /// Returned by the withdrawal collaborator after a minipool exited.
    Withdrawn,
}

/// Notifications emitted by committed operations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DepositPoolEvent {
    /// A contribution was accepted and claim units minted.
    DepositReceived {
        contributor: Address,
        amount: U256,
        time: Timestamp,
    },
    /// Returned capital was re-admitted.
    DepositRecycled {
        source: Address,
        kind: RecycleKind,
        amount: U256,
        time: Timestamp,
    },
    /// Queued minipool received its capacity.
    DepositAssigned {
        minipool: Address,
        amount: U256,
        time: Timestamp,
    },
    /// Surplus balance was released to the claim token.
    ExcessWithdrawn {
        recipient: Address,
        amount: U256,
        time: Timestamp,
    },
}

impl DepositPoolEvent {
    /// Topic string for routing on the event bus.
    #[must_use]
    pub fn topic(&self) -> &'static str {
        match self {
            Self::DepositReceived { .. } => topics::DEPOSIT_RECEIVED,
            Self::DepositRecycled { .. } => topics::DEPOSIT_RECYCLED,
            Self::DepositAssigned { .. } => topics::DEPOSIT_ASSIGNED,
            Self::ExcessWithdrawn { .. } => topics::EXCESS_WITHDRAWN,
        }
    }

    /// Amount of wei the notification reports.
    #[must_use]
    pub fn amount(&self) -> U256 {
        match self {
            Self::DepositReceived { amount, .. }
            | Self::DepositRecycled { amount, .. }
            | Self::DepositAssigned { amount, .. }
            | Self::ExcessWithdrawn { amount, .. } => *amount,
        }
    }
}

/// A notification tagged with the operation that produced it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    /// Correlation ID of the committed operation.
    pub correlation_id: Uuid,
    /// The notification itself.
    pub event: DepositPoolEvent,
}

/// Event bus topics.
pub mod topics {
    /// Contribution accepted.
    pub const DEPOSIT_RECEIVED: &str = "deposit_pool.deposit_received";
    /// Capital recycled.
    pub const DEPOSIT_RECYCLED: &str = "deposit_pool.deposit_recycled";
    /// Capital assigned to a minipool.
    pub const DEPOSIT_ASSIGNED: &str = "deposit_pool.deposit_assigned";
    /// Excess released to the claim token.
    pub const EXCESS_WITHDRAWN: &str = "deposit_pool.excess_withdrawn";
}

// =============================================================================
// RECEIPTS
// =============================================================================

/// One capital assignment.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Assignment {
    /// Minipool that received the capital.
    pub minipool: Address,
    /// Wei transferred (the minipool's queued capacity).
    pub amount: U256,
}

/// Why an assignment run stopped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AssignmentStop {
    /// Queue reported zero next capacity.
    QueueEmpty,
    /// Pool balance could not cover the next capacity.
    InsufficientBalance { balance: U256, capacity: U256 },
    /// The per-call assignment limit was reached.
    IterationLimit,
}

/// Outcome of one assignment run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AssignmentReport {
    /// Assignments in the order they were made.
    pub assignments: Vec<Assignment>,
    /// Terminal condition of the loop.
    pub stop: AssignmentStop,
}

impl AssignmentReport {
    /// Number of minipools dequeued.
    #[must_use]
    pub fn count(&self) -> usize {
        self.assignments.len()
    }

    /// Total wei moved out of custody.
    #[must_use]
    pub fn total_assigned(&self) -> U256 {
        self.assignments
            .iter()
            .fold(U256::zero(), |total, a| total.saturating_add(a.amount))
    }
}

/// Result of a committed deposit or recycle.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DepositReceipt {
    /// Correlation ID shared with the emitted notifications.
    pub correlation_id: Uuid,
    /// Wei received.
    pub amount: U256,
    /// Claim units minted (zero for recycled capital).
    pub minted: U256,
    /// Assignment run triggered by the deposit, if policy allowed one.
    pub assignment: Option<AssignmentReport>,
}

/// Result of a committed excess withdrawal.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExcessWithdrawalReceipt {
    /// Correlation ID shared with the emitted notification.
    pub correlation_id: Uuid,
    /// Wei released to the claim token.
    pub amount: U256,
    /// Excess remaining after the withdrawal.
    pub remaining_excess: U256,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::units::ether;

    #[test]
    fn test_default_settings() {
        let settings = DepositSettings::default();
        assert!(settings.deposit_enabled);
        assert!(settings.assign_deposits_enabled);
        assert_eq!(settings.maximum_deposit_pool_size, ether(160));
        assert_eq!(settings.maximum_deposit_assignments, 2);
    }

    #[test]
    fn test_settings_json_roundtrip() {
        let settings = DepositSettings {
            maximum_deposit_assignments: 5,
            ..DepositSettings::default()
        };
        let json = serde_json::to_string(&settings).unwrap();
        let back: DepositSettings = serde_json::from_str(&json).unwrap();
        assert_eq!(back, settings);
    }

    #[test]
    fn test_event_topics() {
        let event = DepositPoolEvent::DepositAssigned {
            minipool: Address::repeat(9),
            amount: ether(16),
            time: 1,
        };
        assert_eq!(event.topic(), topics::DEPOSIT_ASSIGNED);
        assert_eq!(event.amount(), ether(16));
    }

    #[test]
    fn test_report_totals() {
        let report = AssignmentReport {
            assignments: vec![
                Assignment {
                    minipool: Address::repeat(1),
                    amount: ether(16),
                },
                Assignment {
                    minipool: Address::repeat(2),
                    amount: ether(32),
                },
            ],
            stop: AssignmentStop::IterationLimit,
        };
        assert_eq!(report.count(), 2);
        assert_eq!(report.total_assigned(), ether(48));
    }
}
