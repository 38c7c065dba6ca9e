//! # Driven Ports (SPI - Outbound)
//!
//! Interfaces the Deposit Pool depends on. Every call is synchronous and
//! blocks the operation until it returns or fails.
//!
//! | Port | Collaborator |
//! |------|--------------|
//! | `ContractRegistry` | Address resolution and minipool registration |
//! | `Vault` | Custodial ledger holding all pooled ETH |
//! | `ClaimToken` | Claim token mint / burn / excess absorption |
//! | `MinipoolQueue` | Capacity-ordered demand queue |
//! | `MinipoolGateway` | Minipool capital-acceptance entry point |
//! | `DepositSettingsProvider` | Deposit policy |
//! | `NotificationSink` | Event bus for committed notifications |
//! | `TimeSource` | Timestamps for notifications |
//!
//! Ports that take part in a unit of work also expose the inverse of each
//! effect (`burn`, `requeue_front`, `revert_user_deposit`) so an aborted
//! operation can be unwound.

use crate::domain::{
    Address, CollaboratorError, ContractName, DepositSettings, EventRecord, Timestamp, U256,
};

// =============================================================================
// REGISTRY
// =============================================================================

/// Authoritative address book and access gate.
pub trait ContractRegistry: Send + Sync {
    /// Current address registered under `name`.
    ///
    /// # Errors
    /// `NotRegistered` if nothing is registered under the name.
    fn resolve(&self, name: ContractName) -> Result<Address, CollaboratorError>;

    /// Whether `address` is a minipool known to the network.
    fn is_registered_minipool(&self, address: &Address) -> Result<bool, CollaboratorError>;
}

// =============================================================================
// VAULT
// =============================================================================

/// Custodial ledger. Deposits and withdrawals are exact-amount.
pub trait Vault: Send + Sync {
    /// Wei held for `owner`.
    fn balance_of(&self, owner: &Address) -> Result<U256, CollaboratorError>;

    /// Credits `amount` attached by `depositor` to the depositor's balance.
    fn deposit_ether(&self, depositor: Address, amount: U256) -> Result<(), CollaboratorError>;

    /// Debits `amount` from `owner` and hands it back to the owner.
    ///
    /// # Errors
    /// `InsufficientFunds` if the owner holds less than `amount`.
    fn withdraw_ether(&self, owner: Address, amount: U256) -> Result<(), CollaboratorError>;
}

// =============================================================================
// CLAIM TOKEN
// =============================================================================

/// Claim token contract. Exchange-rate math lives behind this port.
pub trait ClaimToken: Send + Sync {
    /// Mints claim units for a contribution of `eth_amount` wei.
    ///
    /// Returns the number of units minted to `recipient`.
    fn mint(&self, eth_amount: U256, recipient: Address) -> Result<U256, CollaboratorError>;

    /// Burns `units` previously minted to `holder`.
    fn burn(&self, units: U256, holder: Address) -> Result<(), CollaboratorError>;

    /// Absorbs `amount` wei of surplus as collateral.
    fn deposit_excess(&self, amount: U256) -> Result<(), CollaboratorError>;
}

// =============================================================================
// MINIPOOL QUEUE
// =============================================================================

/// Capacity-ordered queue of minipools awaiting capital.
///
/// Ordering and tie-breaks belong to the queue.
pub trait MinipoolQueue: Send + Sync {
    /// Total capital needed to service every queued minipool.
    fn effective_capacity(&self) -> Result<U256, CollaboratorError>;

    /// Capacity of the next minipool, or zero when the queue is empty.
    fn next_capacity(&self) -> Result<U256, CollaboratorError>;

    /// Removes and returns the next minipool.
    ///
    /// # Errors
    /// `QueueEmpty` when nothing is queued.
    fn dequeue_minipool(&self) -> Result<Address, CollaboratorError>;

    /// Puts a dequeued minipool back at the head of the queue.
    fn requeue_front(&self, minipool: Address, capacity: U256) -> Result<(), CollaboratorError>;
}

// =============================================================================
// MINIPOOLS
// =============================================================================

/// Capital-acceptance entry point of minipools.
pub trait MinipoolGateway: Send + Sync {
    /// Transfers `amount` wei into `minipool`.
    ///
    /// # Errors
    /// `MinipoolRejected` if the minipool does not accept exactly this amount.
    fn user_deposit(&self, minipool: Address, amount: U256) -> Result<(), CollaboratorError>;

    /// Takes back a transfer made by `user_deposit` in the same operation.
    fn revert_user_deposit(&self, minipool: Address, amount: U256)
        -> Result<(), CollaboratorError>;
}

// =============================================================================
// DEPOSIT POLICY
// =============================================================================

/// Deposit policy reads. Pure configuration, no side effects.
pub trait DepositSettingsProvider: Send + Sync {
    /// Whether deposits are accepted.
    fn deposit_enabled(&self) -> Result<bool, CollaboratorError>;

    /// Smallest accepted contribution.
    fn minimum_deposit(&self) -> Result<U256, CollaboratorError>;

    /// Largest balance a contribution may produce.
    fn maximum_deposit_pool_size(&self) -> Result<U256, CollaboratorError>;

    /// Whether capital is assigned to queued minipools.
    fn assign_deposits_enabled(&self) -> Result<bool, CollaboratorError>;

    /// Per-call assignment limit.
    fn maximum_deposit_assignments(&self) -> Result<u64, CollaboratorError>;

    /// All policy values in one read.
    fn snapshot(&self) -> Result<DepositSettings, CollaboratorError> {
        Ok(DepositSettings {
            deposit_enabled: self.deposit_enabled()?,
            minimum_deposit: self.minimum_deposit()?,
            maximum_deposit_pool_size: self.maximum_deposit_pool_size()?,
            assign_deposits_enabled: self.assign_deposits_enabled()?,
            maximum_deposit_assignments: self.maximum_deposit_assignments()?,
        })
    }
}

// =============================================================================
// NOTIFICATIONS
// =============================================================================

/// Destination for notifications of committed operations.
pub trait NotificationSink: Send + Sync {
    /// Publishes one record.
    ///
    /// Returns the number of subscribers that received it.
    fn publish(&self, record: &EventRecord) -> usize;
}

// =============================================================================
// TIME
// =============================================================================

/// Time source for notification timestamps.
///
/// Abstracted to allow testing with deterministic time.
pub trait TimeSource: Send + Sync {
    /// Current time in seconds since the Unix epoch.
    fn now(&self) -> Timestamp;
}

/// Default system time source.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemTimeSource;

impl TimeSource for SystemTimeSource {
    fn now(&self) -> Timestamp {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs()
    }
}
