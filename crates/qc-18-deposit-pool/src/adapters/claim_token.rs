//! # Claim Token Adapter
//!
//! In-memory claim token. Mints one unit per wei contributed; the real
//! exchange rate is the token contract's business, not the pool's.

use crate::domain::{Address, CollaboratorError, ContractName, U256};
use crate::ports::outbound::ClaimToken;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::debug;

#[derive(Debug, Default)]
struct TokenLedger {
    holdings: HashMap<Address, U256>,
    total_supply: U256,
    collateral: U256,
}

/// In-memory claim token.
#[derive(Debug, Default)]
pub struct InMemoryClaimToken {
    ledger: RwLock<TokenLedger>,
    /// Reject every mint (failure injection).
    fail_mints: AtomicBool,
    /// Reject every excess deposit (failure injection).
    fail_excess: AtomicBool,
}

impl InMemoryClaimToken {
    /// Create a token with zero supply.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Units held by `holder`.
    #[must_use]
    pub fn balance_of(&self, holder: &Address) -> U256 {
        self.ledger
            .read()
            .holdings
            .get(holder)
            .copied()
            .unwrap_or_default()
    }

    /// Total units in circulation.
    #[must_use]
    pub fn total_supply(&self) -> U256 {
        self.ledger.read().total_supply
    }

    /// Wei absorbed through `deposit_excess`.
    #[must_use]
    pub fn collateral(&self) -> U256 {
        self.ledger.read().collateral
    }

    /// Make subsequent mints fail.
    pub fn set_fail_mints(&self, fail: bool) {
        self.fail_mints.store(fail, Ordering::SeqCst);
    }

    /// Make subsequent excess deposits fail.
    pub fn set_fail_excess(&self, fail: bool) {
        self.fail_excess.store(fail, Ordering::SeqCst);
    }
}

fn rejected(reason: &str) -> CollaboratorError {
    CollaboratorError::Rejected {
        contract: ContractName::ClaimToken,
        reason: reason.to_string(),
    }
}

impl ClaimToken for InMemoryClaimToken {
    fn mint(&self, eth_amount: U256, recipient: Address) -> Result<U256, CollaboratorError> {
        if self.fail_mints.load(Ordering::SeqCst) {
            return Err(rejected("minting paused"));
        }
        if eth_amount.is_zero() {
            return Err(rejected("invalid token mint amount"));
        }
        let mut ledger = self.ledger.write();
        let supply = ledger
            .total_supply
            .checked_add(eth_amount)
            .ok_or_else(|| rejected("supply overflow"))?;
        ledger.total_supply = supply;
        let holding = ledger.holdings.entry(recipient).or_default();
        *holding = holding.saturating_add(eth_amount);
        debug!(%recipient, units = %eth_amount, "claim units minted");
        Ok(eth_amount)
    }

    fn burn(&self, units: U256, holder: Address) -> Result<(), CollaboratorError> {
        let mut ledger = self.ledger.write();
        let held = ledger.holdings.get(&holder).copied().unwrap_or_default();
        if held < units {
            return Err(rejected("insufficient token balance"));
        }
        ledger.holdings.insert(holder, held - units);
        ledger.total_supply = ledger.total_supply.saturating_sub(units);
        debug!(%holder, %units, "claim units burned");
        Ok(())
    }

    fn deposit_excess(&self, amount: U256) -> Result<(), CollaboratorError> {
        if self.fail_excess.load(Ordering::SeqCst) {
            return Err(rejected("excess deposits paused"));
        }
        let mut ledger = self.ledger.write();
        ledger.collateral = ledger.collateral.saturating_add(amount);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::units::{ether, milliether};

    #[test]
    fn test_mint_and_burn() {
        let token = InMemoryClaimToken::new();
        let alice = Address::repeat(0xA1);

        let minted = token.mint(milliether(20), alice).unwrap();
        assert_eq!(minted, milliether(20));
        assert_eq!(token.balance_of(&alice), milliether(20));
        assert_eq!(token.total_supply(), milliether(20));

        token.burn(minted, alice).unwrap();
        assert_eq!(token.balance_of(&alice), U256::zero());
        assert_eq!(token.total_supply(), U256::zero());
    }

    #[test]
    fn test_burn_more_than_held() {
        let token = InMemoryClaimToken::new();
        assert!(token.burn(ether(1), Address::repeat(1)).is_err());
    }

    #[test]
    fn test_zero_mint_rejected() {
        let token = InMemoryClaimToken::new();
        assert!(token.mint(U256::zero(), Address::repeat(1)).is_err());
    }

    #[test]
    fn test_excess_collateral() {
        let token = InMemoryClaimToken::new();
        token.deposit_excess(ether(3)).unwrap();
        assert_eq!(token.collateral(), ether(3));

        token.set_fail_excess(true);
        assert!(token.deposit_excess(ether(1)).is_err());
        assert_eq!(token.collateral(), ether(3));
    }
}
