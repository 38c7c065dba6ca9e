//! # Domain Invariants
//!
//! Policy checks and balance arithmetic for the deposit pool.
//!
//! | Rule | Check |
//! |------|-------|
//! | Deposits enabled | `check_deposit_enabled()` |
//! | Minimum contribution | `check_minimum_deposit()` |
//! | Maximum pool size | `check_pool_size()` |
//! | Assignments enabled | `check_assignments_enabled()` |
//! | Excess never negative | `excess_balance()` |
//! | Withdrawal within excess | `check_excess_withdrawal()` |

use super::entities::DepositSettings;
use super::errors::DepositPoolError;
use super::value_objects::U256;

/// Balance not needed by queued demand, clamped at zero.
#[must_use]
pub fn excess_balance(balance: U256, queue_capacity: U256) -> U256 {
    balance.saturating_sub(queue_capacity)
}

/// Deposits must be enabled.
pub fn check_deposit_enabled(settings: &DepositSettings) -> Result<(), DepositPoolError> {
    if !settings.deposit_enabled {
        return Err(DepositPoolError::DepositsDisabled);
    }
    Ok(())
}

/// Contribution must reach the policy minimum.
pub fn check_minimum_deposit(
    settings: &DepositSettings,
    amount: U256,
) -> Result<(), DepositPoolError> {
    if amount < settings.minimum_deposit {
        return Err(DepositPoolError::BelowMinimumDeposit {
            amount,
            minimum: settings.minimum_deposit,
        });
    }
    Ok(())
}

/// `balance + amount` must not exceed the maximum pool size.
///
/// A sum that overflows 256 bits is over any maximum.
pub fn check_pool_size(
    settings: &DepositSettings,
    balance: U256,
    amount: U256,
) -> Result<(), DepositPoolError> {
    let exceeded = match balance.checked_add(amount) {
        Some(resulting) => resulting > settings.maximum_deposit_pool_size,
        None => true,
    };
    if exceeded {
        return Err(DepositPoolError::PoolSizeExceeded {
            balance,
            amount,
            maximum: settings.maximum_deposit_pool_size,
        });
    }
    Ok(())
}

/// Runs the three deposit checks in their fixed order.
pub fn check_deposit(
    settings: &DepositSettings,
    balance: U256,
    amount: U256,
) -> Result<(), DepositPoolError> {
    check_deposit_enabled(settings)?;
    check_minimum_deposit(settings, amount)?;
    check_pool_size(settings, balance, amount)
}

/// Assignments must be enabled for the public entry point.
pub fn check_assignments_enabled(settings: &DepositSettings) -> Result<(), DepositPoolError> {
    if !settings.assign_deposits_enabled {
        return Err(DepositPoolError::AssignmentsDisabled);
    }
    Ok(())
}

/// A withdrawal may take at most the current excess.
pub fn check_excess_withdrawal(requested: U256, available: U256) -> Result<(), DepositPoolError> {
    if requested > available {
        return Err(DepositPoolError::InsufficientExcessBalance {
            requested,
            available,
        });
    }
    Ok(())
}
