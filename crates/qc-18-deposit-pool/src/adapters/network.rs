//! # In-Memory Network
//!
//! Every in-memory collaborator wired to a registry, so a deposit pool can be
//! exercised end to end without external services.

use super::{
    FixedTimeSource, InMemoryClaimToken, InMemoryMinipoolQueue, InMemoryMinipools,
    InMemoryRegistry, InMemoryVault, RecordingNotifier, StaticDepositSettings,
};
use crate::domain::{Address, ContractName, DepositSettings, Timestamp, U256};
use crate::service::Collaborators;
use std::sync::Arc;

/// Fixed addresses used by `InMemoryNetwork`.
pub mod addresses {
    use crate::domain::Address;

    /// The deposit pool.
    pub const DEPOSIT_POOL: Address = Address::repeat(0xDD);
    /// The custodial vault.
    pub const VAULT: Address = Address::repeat(0xA1);
    /// The claim token.
    pub const CLAIM_TOKEN: Address = Address::repeat(0xA2);
    /// The minipool queue.
    pub const MINIPOOL_QUEUE: Address = Address::repeat(0xA3);
    /// The deposit settings contract.
    pub const DEPOSIT_SETTINGS: Address = Address::repeat(0xA4);
    /// The network withdrawal contract.
    pub const NETWORK_WITHDRAWAL: Address = Address::repeat(0xA5);
}

/// Clock start for fresh networks.
pub const GENESIS_TIME: Timestamp = 1_700_000_000;

/// A complete set of in-memory collaborators.
#[derive(Debug, Clone)]
pub struct InMemoryNetwork {
    /// Address the registry lists as the latest deposit pool.
    pub pool_address: Address,
    /// Registry with every collaborator registered.
    pub registry: Arc<InMemoryRegistry>,
    /// Custodial ledger.
    pub vault: Arc<InMemoryVault>,
    /// Claim token.
    pub token: Arc<InMemoryClaimToken>,
    /// Minipool demand queue.
    pub queue: Arc<InMemoryMinipoolQueue>,
    /// Minipools that can receive capital.
    pub minipools: Arc<InMemoryMinipools>,
    /// Deposit policy.
    pub settings: Arc<StaticDepositSettings>,
    /// Every notification the pool published.
    pub notifier: Arc<RecordingNotifier>,
    /// Notification clock.
    pub clock: Arc<FixedTimeSource>,
}

impl InMemoryNetwork {
    /// Network with default deposit policy.
    #[must_use]
    pub fn new() -> Self {
        Self::with_settings(DepositSettings::default())
    }

    /// Network with the given deposit policy.
    #[must_use]
    pub fn with_settings(settings: DepositSettings) -> Self {
        let registry = Arc::new(InMemoryRegistry::new());
        for (name, address) in [
            (ContractName::DepositPool, addresses::DEPOSIT_POOL),
            (ContractName::Vault, addresses::VAULT),
            (ContractName::ClaimToken, addresses::CLAIM_TOKEN),
            (ContractName::MinipoolQueue, addresses::MINIPOOL_QUEUE),
            (ContractName::DepositSettings, addresses::DEPOSIT_SETTINGS),
            (ContractName::NetworkWithdrawal, addresses::NETWORK_WITHDRAWAL),
        ] {
            registry.set_contract(name, address);
        }

        Self {
            pool_address: addresses::DEPOSIT_POOL,
            registry,
            vault: Arc::new(InMemoryVault::new()),
            token: Arc::new(InMemoryClaimToken::new()),
            queue: Arc::new(InMemoryMinipoolQueue::new()),
            minipools: Arc::new(InMemoryMinipools::new()),
            settings: Arc::new(StaticDepositSettings::new(settings)),
            notifier: Arc::new(RecordingNotifier::new()),
            clock: Arc::new(FixedTimeSource::new(GENESIS_TIME)),
        }
    }

    /// Register a minipool and queue it for `capacity` wei.
    pub fn queue_minipool(&self, minipool: Address, capacity: U256) {
        self.registry.register_minipool(minipool);
        self.minipools.add(minipool, capacity);
        self.queue.enqueue(minipool, capacity);
    }

    /// Set the wei the vault holds for the pool.
    pub fn fund_pool(&self, amount: U256) {
        self.vault.set_balance(self.pool_address, amount);
    }

    /// Ports view of this network for `DepositPoolService`.
    #[must_use]
    pub fn collaborators(&self) -> Collaborators {
        Collaborators {
            registry: self.registry.clone(),
            vault: self.vault.clone(),
            token: self.token.clone(),
            queue: self.queue.clone(),
            minipools: self.minipools.clone(),
            settings: self.settings.clone(),
            notifier: self.notifier.clone(),
            clock: self.clock.clone(),
        }
    }
}

impl Default for InMemoryNetwork {
    fn default() -> Self {
        Self::new()
    }
}
