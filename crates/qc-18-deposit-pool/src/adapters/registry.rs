//! # Registry Adapter
//!
//! In-memory contract registry: name → latest address, plus the set of
//! minipools the network knows about.

use crate::domain::{Address, CollaboratorError, ContractName};
use crate::ports::outbound::ContractRegistry;
use parking_lot::RwLock;
use std::collections::{HashMap, HashSet};
use tracing::info;

/// In-memory contract registry.
#[derive(Debug, Default)]
pub struct InMemoryRegistry {
    contracts: RwLock<HashMap<ContractName, Address>>,
    minipools: RwLock<HashSet<Address>>,
}

impl InMemoryRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Point `name` at `address`, replacing any earlier registration.
    pub fn set_contract(&self, name: ContractName, address: Address) {
        let previous = self.contracts.write().insert(name, address);
        if let Some(previous) = previous.filter(|p| *p != address) {
            info!(%name, from = %previous, to = %address, "contract upgraded");
        }
    }

    /// Remove the registration for `name`.
    pub fn remove_contract(&self, name: ContractName) {
        self.contracts.write().remove(&name);
    }

    /// Mark `minipool` as registered.
    pub fn register_minipool(&self, minipool: Address) {
        self.minipools.write().insert(minipool);
    }

    /// Forget `minipool`.
    pub fn deregister_minipool(&self, minipool: &Address) {
        self.minipools.write().remove(minipool);
    }
}

impl ContractRegistry for InMemoryRegistry {
    fn resolve(&self, name: ContractName) -> Result<Address, CollaboratorError> {
        self.contracts
            .read()
            .get(&name)
            .copied()
            .ok_or(CollaboratorError::NotRegistered(name))
    }

    fn is_registered_minipool(&self, address: &Address) -> Result<bool, CollaboratorError> {
        Ok(self.minipools.read().contains(address))
    }
}
