//! # Inbound Port - DepositPoolApi
//!
//! Primary driving port exposing the deposit pool.
//!
//! ## Authorization
//!
//! Every mutating entry point first requires this pool to be the registry's
//! latest `rocketDepositPool`. Reads are open to anyone.
//!
//! | Method | Authorized Caller |
//! |--------|-------------------|
//! | `get_balance` / `get_excess_balance` | Anyone (read) |
//! | `deposit` | Anyone |
//! | `recycle_dissolved_deposit` | Registered minipools |
//! | `recycle_withdrawn_deposit` | Latest `rocketNetworkWithdrawal` |
//! | `assign_deposits` | Anyone |
//! | `withdraw_excess_balance` | Latest `rocketTokenRETH` |
//! | `receive_vault_withdrawal` | Latest `rocketVault` |

use crate::domain::{
    Address, AssignmentReport, DepositPoolError, DepositReceipt, ExcessWithdrawalReceipt, U256,
};

/// Primary API for the Deposit Pool subsystem.
///
/// Mutating methods are all-or-nothing: on `Err` no mint, custody movement,
/// queue change or minipool transfer from the call remains, and no
/// notification is published.
///
/// # Example
///
/// ```rust,ignore
/// use qc_18_deposit_pool::prelude::*;
///
/// fn example(pool: &impl DepositPoolApi, contributor: Address) {
///     let receipt = pool.deposit(contributor, units::ether(1))?;
///     println!("minted {} units", receipt.minted);
///
///     // Anyone may push idle capital into queued minipools.
///     let report = pool.assign_deposits()?;
///     println!("assigned {} minipools", report.count());
/// }
/// ```
pub trait DepositPoolApi: Send + Sync {
    /// Wei currently held in custody for this pool.
    fn get_balance(&self) -> Result<U256, DepositPoolError>;

    /// Balance beyond what the queue needs, clamped at zero.
    fn get_excess_balance(&self) -> Result<U256, DepositPoolError>;

    /// Accepts a contribution of `amount` wei from `contributor`.
    ///
    /// # Errors
    /// - `DepositsDisabled`: policy has deposits switched off
    /// - `BelowMinimumDeposit`: `amount` under the policy minimum
    /// - `PoolSizeExceeded`: balance plus `amount` over the policy maximum
    /// - `Collaborator`: mint, custody or assignment failure (fully reverted)
    fn deposit(&self, contributor: Address, amount: U256)
        -> Result<DepositReceipt, DepositPoolError>;

    /// Re-admits capital returned by a dissolved minipool.
    ///
    /// # Security
    /// `caller` must be a registered minipool.
    fn recycle_dissolved_deposit(
        &self,
        caller: Address,
        amount: U256,
    ) -> Result<DepositReceipt, DepositPoolError>;

    /// Re-admits capital returned by the withdrawal collaborator.
    ///
    /// # Security
    /// `caller` must be the latest `rocketNetworkWithdrawal`.
    fn recycle_withdrawn_deposit(
        &self,
        caller: Address,
        amount: U256,
    ) -> Result<DepositReceipt, DepositPoolError>;

    /// Assigns idle capital to queued minipools, up to the per-call limit.
    ///
    /// An empty queue or insufficient balance ends the run without error.
    ///
    /// # Errors
    /// - `AssignmentsDisabled`: policy has assignments switched off
    fn assign_deposits(&self) -> Result<AssignmentReport, DepositPoolError>;

    /// Releases `amount` wei of excess balance to the claim token.
    ///
    /// # Security
    /// `caller` must be the latest `rocketTokenRETH`.
    ///
    /// # Errors
    /// - `InsufficientExcessBalance`: `amount` over the current excess
    fn withdraw_excess_balance(
        &self,
        caller: Address,
        amount: U256,
    ) -> Result<ExcessWithdrawalReceipt, DepositPoolError>;

    /// Accepts funds pushed back by the vault. Changes nothing.
    ///
    /// # Security
    /// `caller` must be the latest `rocketVault`.
    fn receive_vault_withdrawal(&self, caller: Address, amount: U256)
        -> Result<(), DepositPoolError>;
}
