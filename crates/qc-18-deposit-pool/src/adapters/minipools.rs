//! # Minipool Gateway Adapter
//!
//! In-memory set of minipools that accept exactly their prelaunch capacity.

use crate::domain::{Address, CollaboratorError, U256};
use crate::ports::outbound::MinipoolGateway;
use parking_lot::RwLock;
use std::collections::{HashMap, HashSet};
use tracing::debug;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct MinipoolAccount {
    expected: U256,
    received: U256,
}

/// In-memory minipools keyed by address.
#[derive(Debug, Default)]
pub struct InMemoryMinipools {
    accounts: RwLock<HashMap<Address, MinipoolAccount>>,
    /// Minipools that refuse capital (failure injection).
    refusing: RwLock<HashSet<Address>>,
}

impl InMemoryMinipools {
    /// Create an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a minipool that will accept exactly `capacity` wei.
    pub fn add(&self, minipool: Address, capacity: U256) {
        self.accounts.write().insert(
            minipool,
            MinipoolAccount {
                expected: capacity,
                received: U256::zero(),
            },
        );
    }

    /// Make `minipool` refuse (or accept again) incoming capital.
    pub fn set_refusing(&self, minipool: Address, refusing: bool) {
        let mut set = self.refusing.write();
        if refusing {
            set.insert(minipool);
        } else {
            set.remove(&minipool);
        }
    }

    /// Wei `minipool` has received from the pool.
    #[must_use]
    pub fn received(&self, minipool: &Address) -> U256 {
        self.accounts
            .read()
            .get(minipool)
            .map_or_else(U256::zero, |a| a.received)
    }

    /// Wei received across all minipools.
    #[must_use]
    pub fn total_received(&self) -> U256 {
        self.accounts
            .read()
            .values()
            .fold(U256::zero(), |total, a| total.saturating_add(a.received))
    }
}

fn rejected(minipool: Address, reason: &str) -> CollaboratorError {
    CollaboratorError::MinipoolRejected {
        minipool,
        reason: reason.to_string(),
    }
}

impl MinipoolGateway for InMemoryMinipools {
    fn user_deposit(&self, minipool: Address, amount: U256) -> Result<(), CollaboratorError> {
        if self.refusing.read().contains(&minipool) {
            return Err(rejected(minipool, "not accepting user deposits"));
        }
        let mut accounts = self.accounts.write();
        let account = accounts
            .get_mut(&minipool)
            .ok_or_else(|| rejected(minipool, "unknown minipool"))?;
        if !account.received.is_zero() {
            return Err(rejected(minipool, "user deposit already assigned"));
        }
        if amount != account.expected {
            return Err(rejected(minipool, "invalid user deposit amount"));
        }
        account.received = amount;
        debug!(%minipool, %amount, "minipool accepted user deposit");
        Ok(())
    }

    fn revert_user_deposit(
        &self,
        minipool: Address,
        amount: U256,
    ) -> Result<(), CollaboratorError> {
        let mut accounts = self.accounts.write();
        let account = accounts
            .get_mut(&minipool)
            .ok_or_else(|| rejected(minipool, "unknown minipool"))?;
        if account.received != amount {
            return Err(rejected(minipool, "no matching user deposit to revert"));
        }
        account.received = U256::zero();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::units::ether;

    #[test]
    fn test_accepts_exact_capacity_once() {
        let minipools = InMemoryMinipools::new();
        let mp = Address::repeat(0x11);
        minipools.add(mp, ether(16));

        assert!(minipools.user_deposit(mp, ether(15)).is_err());
        minipools.user_deposit(mp, ether(16)).unwrap();
        assert_eq!(minipools.received(&mp), ether(16));
        assert!(minipools.user_deposit(mp, ether(16)).is_err());
    }

    #[test]
    fn test_unknown_and_refusing_minipools() {
        let minipools = InMemoryMinipools::new();
        let mp = Address::repeat(0x11);
        assert!(minipools.user_deposit(mp, ether(16)).is_err());

        minipools.add(mp, ether(16));
        minipools.set_refusing(mp, true);
        assert!(matches!(
            minipools.user_deposit(mp, ether(16)),
            Err(CollaboratorError::MinipoolRejected { .. })
        ));
        minipools.set_refusing(mp, false);
        minipools.user_deposit(mp, ether(16)).unwrap();
    }

    #[test]
    fn test_revert_user_deposit() {
        let minipools = InMemoryMinipools::new();
        let mp = Address::repeat(0x11);
        minipools.add(mp, ether(16));
        minipools.user_deposit(mp, ether(16)).unwrap();

        minipools.revert_user_deposit(mp, ether(16)).unwrap();
        assert_eq!(minipools.received(&mp), U256::zero());
        assert!(minipools.revert_user_deposit(mp, ether(16)).is_err());
    }
}
