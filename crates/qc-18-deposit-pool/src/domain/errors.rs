//! # Error Types
//!
//! Error conditions for the Deposit Pool subsystem.
//!
//! Every error aborts the whole operation. Nothing here is retried; callers
//! re-invoke if they want another attempt.

use super::value_objects::{Address, ContractName, U256};
use std::fmt;
use thiserror::Error;

// =============================================================================
// DEPOSIT POOL ERRORS
// =============================================================================

/// Errors surfaced by deposit pool operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DepositPoolError {
    /// Deposits are switched off by policy.
    #[error("deposits into the pool are currently disabled")]
    DepositsDisabled,

    /// Contribution is smaller than the policy minimum.
    #[error("deposit of {amount} wei is less than the minimum deposit of {minimum} wei")]
    BelowMinimumDeposit { amount: U256, minimum: U256 },

    /// Contribution would push the pool over its maximum size.
    #[error("pool size after depositing {amount} wei onto {balance} wei exceeds the maximum of {maximum} wei")]
    PoolSizeExceeded {
        balance: U256,
        amount: U256,
        maximum: U256,
    },

    /// Capital assignment is switched off by policy.
    #[error("deposit assignments are currently disabled")]
    AssignmentsDisabled,

    /// This pool is no longer the registry's authoritative deposit pool.
    #[error("deposit pool {pool} is not the latest registered deposit pool ({latest})")]
    NotLatestContract { pool: Address, latest: Address },

    /// Caller identity does not match the role the entry point requires.
    #[error("caller {caller} is not authorized: requires {required}")]
    UnauthorizedCaller {
        caller: Address,
        required: AccessRole,
    },

    /// Requested excess withdrawal is larger than the computed excess.
    #[error("insufficient excess balance for withdrawal: requested {requested} wei, available {available} wei")]
    InsufficientExcessBalance { requested: U256, available: U256 },

    /// A mutating call arrived while another one was still in progress.
    #[error("reentrant call into the deposit pool rejected")]
    Reentrancy,

    /// A downstream collaborator failed.
    #[error("collaborator failure: {0}")]
    Collaborator(#[from] CollaboratorError),

    /// The operation failed and undoing its earlier effects failed too.
    #[error("rollback failed after `{cause}`: {rollback}")]
    RollbackFailed {
        cause: Box<DepositPoolError>,
        rollback: CollaboratorError,
    },
}

impl DepositPoolError {
    /// Returns true for rejections driven by deposit policy.
    #[must_use]
    pub fn is_policy_rejection(&self) -> bool {
        matches!(
            self,
            Self::DepositsDisabled
                | Self::BelowMinimumDeposit { .. }
                | Self::PoolSizeExceeded { .. }
                | Self::AssignmentsDisabled
        )
    }

    /// Returns true for caller or callee identity failures.
    #[must_use]
    pub fn is_authorization_failure(&self) -> bool {
        matches!(
            self,
            Self::NotLatestContract { .. } | Self::UnauthorizedCaller { .. }
        )
    }
}

/// Identity an entry point demands of its caller.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AccessRole {
    /// Any minipool known to the registry.
    RegisteredMinipool,
    /// The current address registered under the given name.
    LatestContract(ContractName),
}

impl fmt::Display for AccessRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RegisteredMinipool => write!(f, "registered minipool"),
            Self::LatestContract(name) => write!(f, "latest {name} contract"),
        }
    }
}

// =============================================================================
// COLLABORATOR ERRORS
// =============================================================================

/// Failures reported by outbound ports.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CollaboratorError {
    /// Collaborator could not be reached.
    #[error("{contract} unavailable: {reason}")]
    Unavailable {
        contract: ContractName,
        reason: String,
    },

    /// No address is registered under the name.
    #[error("no contract registered as {0}")]
    NotRegistered(ContractName),

    /// The vault does not hold enough for the owner.
    #[error("insufficient vault balance for {owner}: requested {requested} wei, available {available} wei")]
    InsufficientFunds {
        owner: Address,
        requested: U256,
        available: U256,
    },

    /// Dequeue attempted on an empty queue.
    #[error("minipool queue is empty")]
    QueueEmpty,

    /// Minipool refused the capital.
    #[error("minipool {minipool} rejected deposit: {reason}")]
    MinipoolRejected { minipool: Address, reason: String },

    /// Collaborator rejected the call.
    #[error("{contract} rejected call: {reason}")]
    Rejected {
        contract: ContractName,
        reason: String,
    },
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::units::{ether, milliether};

    #[test]
    fn test_below_minimum_display() {
        let err = DepositPoolError::BelowMinimumDeposit {
            amount: milliether(5),
            minimum: milliether(10),
        };
        let msg = err.to_string();
        assert!(msg.contains("less than the minimum"));
        assert!(msg.contains("5000000000000000"));
    }

    #[test]
    fn test_classification() {
        assert!(DepositPoolError::DepositsDisabled.is_policy_rejection());
        assert!(DepositPoolError::AssignmentsDisabled.is_policy_rejection());
        assert!(!DepositPoolError::Reentrancy.is_policy_rejection());

        let unauthorized = DepositPoolError::UnauthorizedCaller {
            caller: Address::repeat(1),
            required: AccessRole::RegisteredMinipool,
        };
        assert!(unauthorized.is_authorization_failure());
        assert!(!unauthorized.is_policy_rejection());
    }

    #[test]
    fn test_collaborator_error_converts() {
        let err: DepositPoolError = CollaboratorError::QueueEmpty.into();
        assert_eq!(
            err,
            DepositPoolError::Collaborator(CollaboratorError::QueueEmpty)
        );
    }

    #[test]
    fn test_access_role_display() {
        let role = AccessRole::LatestContract(ContractName::ClaimToken);
        assert_eq!(role.to_string(), "latest rocketTokenRETH contract");
    }

    #[test]
    fn test_rollback_failed_mentions_both_errors() {
        let err = DepositPoolError::RollbackFailed {
            cause: Box::new(DepositPoolError::Collaborator(
                CollaboratorError::MinipoolRejected {
                    minipool: Address::repeat(2),
                    reason: "closed".into(),
                },
            )),
            rollback: CollaboratorError::InsufficientFunds {
                owner: Address::repeat(3),
                requested: ether(16),
                available: ether(1),
            },
        };
        let msg = err.to_string();
        assert!(msg.contains("closed"));
        assert!(msg.contains("insufficient vault balance"));
    }
}
