//! # Vault Adapter
//!
//! In-memory custodial ledger.
//! Production deployments would talk to the vault contract instead.

use crate::domain::{Address, CollaboratorError, ContractName, U256};
use crate::ports::outbound::Vault;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::debug;

/// In-memory vault tracking wei per owner.
#[derive(Debug, Default)]
pub struct InMemoryVault {
    balances: RwLock<HashMap<Address, U256>>,
    /// Reject every withdrawal (failure injection).
    fail_withdrawals: AtomicBool,
    /// Reject every deposit (failure injection).
    fail_deposits: AtomicBool,
}

impl InMemoryVault {
    /// Create an empty vault.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrite the balance held for `owner`.
    pub fn set_balance(&self, owner: Address, balance: U256) {
        self.balances.write().insert(owner, balance);
    }

    /// Sum of every owner's balance.
    #[must_use]
    pub fn total_held(&self) -> U256 {
        self.balances
            .read()
            .values()
            .fold(U256::zero(), |total, b| total.saturating_add(*b))
    }

    /// Make subsequent withdrawals fail.
    pub fn set_fail_withdrawals(&self, fail: bool) {
        self.fail_withdrawals.store(fail, Ordering::SeqCst);
    }

    /// Make subsequent deposits fail.
    pub fn set_fail_deposits(&self, fail: bool) {
        self.fail_deposits.store(fail, Ordering::SeqCst);
    }
}

impl Vault for InMemoryVault {
    fn balance_of(&self, owner: &Address) -> Result<U256, CollaboratorError> {
        Ok(self
            .balances
            .read()
            .get(owner)
            .copied()
            .unwrap_or_default())
    }

    fn deposit_ether(&self, depositor: Address, amount: U256) -> Result<(), CollaboratorError> {
        if self.fail_deposits.load(Ordering::SeqCst) {
            return Err(CollaboratorError::Rejected {
                contract: ContractName::Vault,
                reason: "deposits halted".into(),
            });
        }
        let mut balances = self.balances.write();
        let balance = balances.entry(depositor).or_default();
        *balance = balance
            .checked_add(amount)
            .ok_or_else(|| CollaboratorError::Rejected {
                contract: ContractName::Vault,
                reason: "balance overflow".into(),
            })?;
        debug!(%depositor, %amount, balance = %balance, "vault deposit");
        Ok(())
    }

    fn withdraw_ether(&self, owner: Address, amount: U256) -> Result<(), CollaboratorError> {
        if self.fail_withdrawals.load(Ordering::SeqCst) {
            return Err(CollaboratorError::Rejected {
                contract: ContractName::Vault,
                reason: "withdrawals halted".into(),
            });
        }
        let mut balances = self.balances.write();
        let available = balances.get(&owner).copied().unwrap_or_default();
        if available < amount {
            return Err(CollaboratorError::InsufficientFunds {
                owner,
                requested: amount,
                available,
            });
        }
        let remaining = available - amount;
        balances.insert(owner, remaining);
        debug!(%owner, %amount, balance = %remaining, "vault withdrawal");
        Ok(())
    }
}
