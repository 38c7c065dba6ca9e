//! # Brutal Security Tests for the Deposit Pool (qc-18)
//!
//! These tests attempt to break the caller gating, reentrancy and rollback
//! guarantees of the deposit pool.
//!
//! ## Test Categories
//!
//! 1. **Caller Spoofing** - wrong identities on restricted entry points
//! 2. **Superseded Pool** - calls into a pool the registry no longer lists
//! 3. **Reentrancy** - collaborators calling back mid-operation
//! 4. **Rollback Failure** - compensations that cannot be applied

use std::sync::{Arc, OnceLock, Weak};

use parking_lot::Mutex;
use qc_18_deposit_pool::adapters::{addresses, InMemoryVault};
use qc_18_deposit_pool::prelude::*;

// =============================================================================
// TEST HELPERS
// =============================================================================

const ATTACKER: Address = Address::repeat(0x66);

/// Vault that calls back into the pool after every withdrawal, like a vault
/// pushing ETH back to its owner.
#[derive(Default)]
struct CallbackVault {
    inner: InMemoryVault,
    pool: OnceLock<Weak<DepositPoolService>>,
    callback_results: Mutex<Vec<Result<(), DepositPoolError>>>,
    reentry_results: Mutex<Vec<DepositPoolError>>,
}

impl Vault for CallbackVault {
    fn balance_of(&self, owner: &Address) -> Result<U256, CollaboratorError> {
        self.inner.balance_of(owner)
    }

    fn deposit_ether(&self, depositor: Address, amount: U256) -> Result<(), CollaboratorError> {
        self.inner.deposit_ether(depositor, amount)
    }

    fn withdraw_ether(&self, owner: Address, amount: U256) -> Result<(), CollaboratorError> {
        self.inner.withdraw_ether(owner, amount)?;
        if let Some(pool) = self.pool.get().and_then(Weak::upgrade) {
            self.callback_results
                .lock()
                .push(pool.receive_vault_withdrawal(addresses::VAULT, amount));
            if let Err(e) = pool.deposit(ATTACKER, units::ether(1)) {
                self.reentry_results.lock().push(e);
            }
            if let Err(e) = pool.assign_deposits() {
                self.reentry_results.lock().push(e);
            }
        }
        Ok(())
    }
}

fn callback_pool() -> (Arc<DepositPoolService>, Arc<CallbackVault>, InMemoryNetwork) {
    let network = InMemoryNetwork::new();
    let vault = Arc::new(CallbackVault::default());

    let mut ports = network.collaborators();
    ports.vault = Arc::clone(&vault) as Arc<dyn Vault>;
    let pool = Arc::new(
        DepositPoolService::new(DepositPoolConfig::for_pool(network.pool_address), ports)
            .unwrap(),
    );
    vault.pool.set(Arc::downgrade(&pool)).unwrap();
    (pool, vault, network)
}

// =============================================================================
// CALLER SPOOFING
// =============================================================================

#[test]
fn test_recycle_dissolved_requires_registered_minipool() {
    let (pool, network) = create_test_service();

    assert_eq!(
        pool.recycle_dissolved_deposit(ATTACKER, units::ether(16)),
        Err(DepositPoolError::UnauthorizedCaller {
            caller: ATTACKER,
            required: AccessRole::RegisteredMinipool,
        })
    );

    // Deregistered minipools lose access too.
    let minipool = Address::repeat(0x21);
    network.registry.register_minipool(minipool);
    network.registry.deregister_minipool(&minipool);
    assert!(pool
        .recycle_dissolved_deposit(minipool, units::ether(16))
        .unwrap_err()
        .is_authorization_failure());

    assert_eq!(pool.get_balance().unwrap(), U256::zero());
    assert!(network.notifier.is_empty());
}

#[test]
fn test_recycle_withdrawn_requires_network_withdrawal() {
    let (pool, _network) = create_test_service();

    for caller in [ATTACKER, addresses::VAULT, addresses::CLAIM_TOKEN] {
        assert_eq!(
            pool.recycle_withdrawn_deposit(caller, units::ether(1)),
            Err(DepositPoolError::UnauthorizedCaller {
                caller,
                required: AccessRole::LatestContract(ContractName::NetworkWithdrawal),
            })
        );
    }
}

#[test]
fn test_withdraw_excess_requires_claim_token() {
    let (pool, network) = create_test_service();
    network.fund_pool(units::ether(10));

    assert!(matches!(
        pool.withdraw_excess_balance(ATTACKER, units::ether(1)),
        Err(DepositPoolError::UnauthorizedCaller { .. })
    ));
    assert_eq!(pool.get_balance().unwrap(), units::ether(10));
}

#[test]
fn test_upgraded_collaborator_loses_access() {
    let (pool, network) = create_test_service();
    network.fund_pool(units::ether(10));
    let new_token = Address::repeat(0xB2);
    network
        .registry
        .set_contract(ContractName::ClaimToken, new_token);

    assert!(pool
        .withdraw_excess_balance(addresses::CLAIM_TOKEN, units::ether(1))
        .is_err());
    pool.withdraw_excess_balance(new_token, units::ether(1))
        .unwrap();
}

#[test]
fn test_receive_vault_withdrawal_requires_vault() {
    let (pool, _network) = create_test_service();

    assert!(pool
        .receive_vault_withdrawal(addresses::VAULT, units::ether(1))
        .is_ok());
    assert_eq!(
        pool.receive_vault_withdrawal(ATTACKER, units::ether(1)),
        Err(DepositPoolError::UnauthorizedCaller {
            caller: ATTACKER,
            required: AccessRole::LatestContract(ContractName::Vault),
        })
    );
}

#[test]
fn test_receive_vault_withdrawal_changes_nothing() {
    let (pool, network) = create_test_service();
    network.fund_pool(units::ether(3));

    pool.receive_vault_withdrawal(addresses::VAULT, units::ether(100))
        .unwrap();

    assert_eq!(pool.get_balance().unwrap(), units::ether(3));
    assert!(network.notifier.is_empty());
    assert_eq!(pool.stats(), ServiceStats::default());
}

// =============================================================================
// SUPERSEDED POOL
// =============================================================================

#[test]
fn test_superseded_pool_rejects_every_mutation() {
    let (pool, network) = create_test_service();
    let minipool = Address::repeat(0x21);
    network.queue_minipool(minipool, units::ether(1));
    network.fund_pool(units::ether(5));
    network
        .registry
        .set_contract(ContractName::DepositPool, Address::repeat(0xEE));

    let results = [
        pool.deposit(ATTACKER, units::ether(1)).map(|_| ()),
        pool.recycle_dissolved_deposit(minipool, units::ether(1))
            .map(|_| ()),
        pool.recycle_withdrawn_deposit(addresses::NETWORK_WITHDRAWAL, units::ether(1))
            .map(|_| ()),
        pool.assign_deposits().map(|_| ()),
        pool.withdraw_excess_balance(addresses::CLAIM_TOKEN, units::ether(1))
            .map(|_| ()),
        pool.receive_vault_withdrawal(addresses::VAULT, units::ether(1)),
    ];
    for result in results {
        assert!(matches!(
            result,
            Err(DepositPoolError::NotLatestContract { .. })
        ));
    }

    assert_eq!(pool.get_balance().unwrap(), units::ether(5));
    assert_eq!(network.queue.len(), 1);
}

#[test]
fn test_unregistered_pool_fails_closed() {
    let (pool, network) = create_test_service();
    network.registry.remove_contract(ContractName::DepositPool);

    assert_eq!(
        pool.deposit(ATTACKER, units::ether(1)),
        Err(DepositPoolError::Collaborator(
            CollaboratorError::NotRegistered(ContractName::DepositPool)
        ))
    );
}

// =============================================================================
// REENTRANCY
// =============================================================================

#[test]
fn test_reentrant_calls_from_vault_are_rejected() {
    let (pool, vault, network) = callback_pool();
    network.queue_minipool(Address::repeat(0x21), units::ether(16));
    vault.inner.set_balance(network.pool_address, units::ether(20));

    let report = pool.assign_deposits().unwrap();
    assert_eq!(report.count(), 1);

    // The vault's no-op notification is exempt from the guard.
    assert_eq!(*vault.callback_results.lock(), vec![Ok(())]);
    // Nested mutations are not.
    assert_eq!(
        *vault.reentry_results.lock(),
        vec![DepositPoolError::Reentrancy, DepositPoolError::Reentrancy]
    );

    // Nothing from the rejected nested deposit landed.
    assert_eq!(network.token.balance_of(&ATTACKER), U256::zero());
    assert_eq!(pool.get_balance().unwrap(), units::ether(4));
}

#[test]
fn test_guard_released_after_reentrancy() {
    let (pool, vault, network) = callback_pool();
    vault.inner.set_balance(network.pool_address, units::ether(5));

    pool.withdraw_excess_balance(addresses::CLAIM_TOKEN, units::ether(2))
        .unwrap();
    assert_eq!(vault.reentry_results.lock().len(), 2);

    // Top-level calls work again once the operation has finished.
    pool.deposit(ATTACKER, units::ether(1)).unwrap();
    assert_eq!(network.token.balance_of(&ATTACKER), units::ether(1));
}

// =============================================================================
// ROLLBACK FAILURE
// =============================================================================

#[test]
fn test_failed_compensation_is_reported() {
    let (pool, network) = create_test_service();
    let minipool = Address::repeat(0x21);
    network.queue_minipool(minipool, units::ether(16));
    network.fund_pool(units::ether(16));
    // The assignment fails at the minipool, and custody refuses the
    // returned funds.
    network.minipools.set_refusing(minipool, true);
    network.vault.set_fail_deposits(true);

    let err = pool.assign_deposits().unwrap_err();

    match err {
        DepositPoolError::RollbackFailed { cause, rollback } => {
            assert!(matches!(
                *cause,
                DepositPoolError::Collaborator(CollaboratorError::MinipoolRejected { .. })
            ));
            assert!(matches!(
                rollback,
                CollaboratorError::Rejected {
                    contract: ContractName::Vault,
                    ..
                }
            ));
        }
        other => panic!("expected RollbackFailed, got {other:?}"),
    }

    // The remaining compensations still ran.
    assert_eq!(network.queue.len(), 1);
    assert!(network.notifier.is_empty());
    assert_eq!(pool.stats().rollbacks, 1);
}

#[test]
fn test_failed_mint_is_not_a_rollback() {
    let (pool, network) = create_test_service();
    network.token.set_fail_mints(true);

    let err = pool.deposit(ATTACKER, units::ether(1)).unwrap_err();
    assert!(!err.is_policy_rejection());
    assert!(!err.is_authorization_failure());
    assert_eq!(pool.stats().rollbacks, 0);
    assert_eq!(pool.stats().deposits_accepted, 0);
}
