//! # Deposit Pool Service
//!
//! Implements `DepositPoolApi` over the outbound ports.
//!
//! ## Execution Model
//!
//! - One operation at a time: every call takes the operation lock
//! - Nested mutating calls from inside a collaborator are rejected with
//!   `DepositPoolError::Reentrancy`
//! - Mutating calls run inside a `UnitOfWork`; on failure every applied effect
//!   is undone newest-first and no notification is published
//! - Balance and queue capacity are read from the collaborators every time
//!   they are needed, including between assignment iterations
//!
//! ## Security
//!
//! - Mutating calls require this pool to be the registry's latest deposit pool
//! - Caller identities are resolved through the registry on every call

use crate::config::{ConfigError, DepositPoolConfig};
use crate::domain::{
    check_assignments_enabled, check_deposit, check_excess_withdrawal, excess_balance,
    AccessRole, Address, Assignment, AssignmentReport, AssignmentStop, CollaboratorError,
    Compensation, ContractName, DepositPoolError, DepositPoolEvent, DepositReceipt,
    DepositSettings, ExcessWithdrawalReceipt, RecycleKind, Timestamp, UnitOfWork, U256,
};
use crate::ports::inbound::DepositPoolApi;
use crate::ports::outbound::{
    ClaimToken, ContractRegistry, DepositSettingsProvider, MinipoolGateway, MinipoolQueue,
    NotificationSink, TimeSource, Vault,
};
use parking_lot::{ReentrantMutex, ReentrantMutexGuard, RwLock};
use std::cell::Cell;
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

/// Outbound ports the service talks to.
#[derive(Clone)]
pub struct Collaborators {
    /// Address resolution and minipool registration.
    pub registry: Arc<dyn ContractRegistry>,
    /// Custodial ledger.
    pub vault: Arc<dyn Vault>,
    /// Claim token.
    pub token: Arc<dyn ClaimToken>,
    /// Minipool demand queue.
    pub queue: Arc<dyn MinipoolQueue>,
    /// Minipool capital-acceptance entry point.
    pub minipools: Arc<dyn MinipoolGateway>,
    /// Deposit policy.
    pub settings: Arc<dyn DepositSettingsProvider>,
    /// Destination of committed notifications.
    pub notifier: Arc<dyn NotificationSink>,
    /// Notification timestamps.
    pub clock: Arc<dyn TimeSource>,
}

/// Counters for committed and rejected operations.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ServiceStats {
    /// Contributions accepted.
    pub deposits_accepted: u64,
    /// Contributions rejected by policy.
    pub deposits_rejected: u64,
    /// Recycled deposits accepted.
    pub deposits_recycled: u64,
    /// Assignment runs committed, including those triggered by deposits.
    pub assignment_runs: u64,
    /// Minipools that received capital.
    pub assignments_made: u64,
    /// Excess withdrawals committed.
    pub excess_withdrawals: u64,
    /// Operations unwound after a failure.
    pub rollbacks: u64,
}

/// Held for the duration of one mutating operation.
struct OperationGuard<'a> {
    in_progress: ReentrantMutexGuard<'a, Cell<bool>>,
}

impl Drop for OperationGuard<'_> {
    fn drop(&mut self) {
        self.in_progress.set(false);
    }
}

/// The deposit pool.
pub struct DepositPoolService {
    config: DepositPoolConfig,
    ports: Collaborators,
    /// Operation lock; the cell marks a mutating operation in progress.
    operation: ReentrantMutex<Cell<bool>>,
    stats: RwLock<ServiceStats>,
}

impl DepositPoolService {
    /// Create a service after validating `config`.
    pub fn new(config: DepositPoolConfig, ports: Collaborators) -> Result<Self, ConfigError> {
        config.validate()?;
        info!(pool = %config.pool_address, "deposit pool service created");
        Ok(Self::with_validated_config(config, ports))
    }

    fn with_validated_config(config: DepositPoolConfig, ports: Collaborators) -> Self {
        Self {
            config,
            ports,
            operation: ReentrantMutex::new(Cell::new(false)),
            stats: RwLock::new(ServiceStats::default()),
        }
    }

    /// Service configuration.
    pub fn config(&self) -> &DepositPoolConfig {
        &self.config
    }

    /// Address of this pool.
    pub fn pool_address(&self) -> Address {
        self.config.pool_address
    }

    /// Current service statistics.
    pub fn stats(&self) -> ServiceStats {
        self.stats.read().clone()
    }

    // =========================================================================
    // GUARDS
    // =========================================================================

    fn enter(&self) -> Result<OperationGuard<'_>, DepositPoolError> {
        let in_progress = self.operation.lock();
        if in_progress.replace(true) {
            warn!(pool = %self.config.pool_address, "reentrant call rejected");
            return Err(DepositPoolError::Reentrancy);
        }
        Ok(OperationGuard { in_progress })
    }

    fn ensure_latest(&self) -> Result<(), DepositPoolError> {
        let latest = self.ports.registry.resolve(ContractName::DepositPool)?;
        if latest != self.config.pool_address {
            warn!(pool = %self.config.pool_address, %latest, "superseded deposit pool called");
            return Err(DepositPoolError::NotLatestContract {
                pool: self.config.pool_address,
                latest,
            });
        }
        Ok(())
    }

    fn ensure_latest_contract(
        &self,
        caller: Address,
        name: ContractName,
    ) -> Result<(), DepositPoolError> {
        if self.ports.registry.resolve(name)? != caller {
            return Err(self.unauthorized(caller, AccessRole::LatestContract(name)));
        }
        Ok(())
    }

    fn ensure_registered_minipool(&self, caller: Address) -> Result<(), DepositPoolError> {
        if !self.ports.registry.is_registered_minipool(&caller)? {
            return Err(self.unauthorized(caller, AccessRole::RegisteredMinipool));
        }
        Ok(())
    }

    fn unauthorized(&self, caller: Address, required: AccessRole) -> DepositPoolError {
        warn!(%caller, %required, "unauthorized caller");
        DepositPoolError::UnauthorizedCaller { caller, required }
    }

    // =========================================================================
    // BALANCES
    // =========================================================================

    fn pool_balance(&self) -> Result<U256, CollaboratorError> {
        self.ports.vault.balance_of(&self.config.pool_address)
    }

    fn current_excess(&self) -> Result<U256, CollaboratorError> {
        let balance = self.pool_balance()?;
        let capacity = self.ports.queue.effective_capacity()?;
        Ok(excess_balance(balance, capacity))
    }

    // =========================================================================
    // SHARED PROCESSING
    // =========================================================================

    /// Moves `amount` into custody, then assigns if policy allows.
    fn process_deposit(
        &self,
        uow: &mut UnitOfWork,
        settings: &DepositSettings,
        amount: U256,
        now: Timestamp,
    ) -> Result<Option<AssignmentReport>, DepositPoolError> {
        self.ports
            .vault
            .deposit_ether(self.config.pool_address, amount)?;
        uow.record(Compensation::WithdrawFromVault { amount });

        if !settings.assign_deposits_enabled {
            return Ok(None);
        }
        self.run_assignments(uow, settings, now).map(Some)
    }

    /// The bounded assignment loop. Performs no enabled check.
    fn run_assignments(
        &self,
        uow: &mut UnitOfWork,
        settings: &DepositSettings,
        now: Timestamp,
    ) -> Result<AssignmentReport, DepositPoolError> {
        let pool = self.config.pool_address;
        let mut assignments = Vec::new();
        let mut stop = AssignmentStop::IterationLimit;

        for iteration in 0..settings.maximum_deposit_assignments {
            let capacity = self.ports.queue.next_capacity()?;
            if capacity.is_zero() {
                stop = AssignmentStop::QueueEmpty;
                break;
            }
            let balance = self.pool_balance()?;
            if balance < capacity {
                stop = AssignmentStop::InsufficientBalance { balance, capacity };
                break;
            }

            let minipool = self.ports.queue.dequeue_minipool()?;
            uow.record(Compensation::RequeueMinipool { minipool, capacity });

            self.ports.vault.withdraw_ether(pool, capacity)?;
            uow.record(Compensation::ReturnToVault { amount: capacity });

            self.ports.minipools.user_deposit(minipool, capacity)?;
            uow.record(Compensation::RevertMinipoolDeposit {
                minipool,
                amount: capacity,
            });

            uow.emit(DepositPoolEvent::DepositAssigned {
                minipool,
                amount: capacity,
                time: now,
            });
            debug!(iteration, %minipool, %capacity, "deposit assigned");
            assignments.push(Assignment {
                minipool,
                amount: capacity,
            });
        }

        Ok(AssignmentReport { assignments, stop })
    }

    fn recycle(
        &self,
        source: Address,
        kind: RecycleKind,
        amount: U256,
    ) -> Result<DepositReceipt, DepositPoolError> {
        let settings = self.ports.settings.snapshot()?;
        let now = self.ports.clock.now();
        let mut uow = UnitOfWork::begin();
        let correlation_id = uow.correlation_id();

        uow.emit(DepositPoolEvent::DepositRecycled {
            source,
            kind,
            amount,
            time: now,
        });
        let result = self.process_deposit(&mut uow, &settings, amount, now);
        let assignment = self.finish(uow, result)?;

        self.record_assignment(assignment.as_ref());
        self.stats.write().deposits_recycled += 1;
        info!(%source, ?kind, %amount, "deposit recycled");

        Ok(DepositReceipt {
            correlation_id,
            amount,
            minted: U256::zero(),
            assignment,
        })
    }

    // =========================================================================
    // UNIT OF WORK
    // =========================================================================

    /// Commits `uow` and publishes its notifications, or unwinds it.
    fn finish<T>(
        &self,
        uow: UnitOfWork,
        result: Result<T, DepositPoolError>,
    ) -> Result<T, DepositPoolError> {
        match result {
            Ok(value) => {
                for record in uow.commit() {
                    let receivers = self.ports.notifier.publish(&record);
                    debug!(topic = record.event.topic(), receivers, "notification sent");
                }
                Ok(value)
            }
            Err(cause) => {
                let correlation_id = uow.correlation_id();
                let compensations = uow.abort();
                if compensations.is_empty() {
                    return Err(cause);
                }
                self.stats.write().rollbacks += 1;
                warn!(
                    %correlation_id,
                    error = %cause,
                    effects = compensations.len(),
                    "operation failed, rolling back"
                );
                match self.compensate(&compensations) {
                    Ok(()) => Err(cause),
                    Err(rollback) => {
                        error!(
                            %correlation_id,
                            error = %cause,
                            rollback_error = %rollback,
                            "rollback failed"
                        );
                        Err(DepositPoolError::RollbackFailed {
                            cause: Box::new(cause),
                            rollback,
                        })
                    }
                }
            }
        }
    }

    /// Applies every compensation, returning the first failure.
    fn compensate(&self, compensations: &[Compensation]) -> Result<(), CollaboratorError> {
        let pool = self.config.pool_address;
        let mut first_failure = None;

        for compensation in compensations {
            let outcome = match *compensation {
                Compensation::BurnClaim { holder, units } => self.ports.token.burn(units, holder),
                Compensation::WithdrawFromVault { amount } => {
                    self.ports.vault.withdraw_ether(pool, amount)
                }
                Compensation::ReturnToVault { amount } => {
                    self.ports.vault.deposit_ether(pool, amount)
                }
                Compensation::RequeueMinipool { minipool, capacity } => {
                    self.ports.queue.requeue_front(minipool, capacity)
                }
                Compensation::RevertMinipoolDeposit { minipool, amount } => {
                    self.ports.minipools.revert_user_deposit(minipool, amount)
                }
            };
            if let Err(e) = outcome {
                error!(?compensation, error = %e, "compensation failed");
                first_failure.get_or_insert(e);
            }
        }

        first_failure.map_or(Ok(()), Err)
    }

    fn record_assignment(&self, report: Option<&AssignmentReport>) {
        if let Some(report) = report {
            let mut stats = self.stats.write();
            stats.assignment_runs += 1;
            stats.assignments_made += report.count() as u64;
        }
    }
}

impl DepositPoolApi for DepositPoolService {
    fn get_balance(&self) -> Result<U256, DepositPoolError> {
        let _lock = self.operation.lock();
        Ok(self.pool_balance()?)
    }

    fn get_excess_balance(&self) -> Result<U256, DepositPoolError> {
        let _lock = self.operation.lock();
        Ok(self.current_excess()?)
    }

    #[instrument(skip_all, fields(contributor = %contributor, amount = %amount))]
    fn deposit(
        &self,
        contributor: Address,
        amount: U256,
    ) -> Result<DepositReceipt, DepositPoolError> {
        let _guard = self.enter()?;
        self.ensure_latest()?;

        let settings = self.ports.settings.snapshot()?;
        let balance = self.pool_balance()?;
        if let Err(rejection) = check_deposit(&settings, balance, amount) {
            warn!(%balance, error = %rejection, "deposit rejected");
            self.stats.write().deposits_rejected += 1;
            return Err(rejection);
        }

        let now = self.ports.clock.now();
        let mut uow = UnitOfWork::begin();
        let correlation_id = uow.correlation_id();

        let result = self
            .ports
            .token
            .mint(amount, contributor)
            .map_err(DepositPoolError::from)
            .and_then(|minted| {
                uow.record(Compensation::BurnClaim {
                    holder: contributor,
                    units: minted,
                });
                uow.emit(DepositPoolEvent::DepositReceived {
                    contributor,
                    amount,
                    time: now,
                });
                let assignment = self.process_deposit(&mut uow, &settings, amount, now)?;
                Ok((minted, assignment))
            });
        let (minted, assignment) = self.finish(uow, result)?;

        self.record_assignment(assignment.as_ref());
        self.stats.write().deposits_accepted += 1;
        info!(
            %minted,
            assigned = assignment.as_ref().map_or(0, AssignmentReport::count),
            "deposit accepted"
        );

        Ok(DepositReceipt {
            correlation_id,
            amount,
            minted,
            assignment,
        })
    }

    #[instrument(skip_all, fields(caller = %caller, amount = %amount))]
    fn recycle_dissolved_deposit(
        &self,
        caller: Address,
        amount: U256,
    ) -> Result<DepositReceipt, DepositPoolError> {
        let _guard = self.enter()?;
        self.ensure_latest()?;
        self.ensure_registered_minipool(caller)?;
        self.recycle(caller, RecycleKind::Dissolved, amount)
    }

    #[instrument(skip_all, fields(caller = %caller, amount = %amount))]
    fn recycle_withdrawn_deposit(
        &self,
        caller: Address,
        amount: U256,
    ) -> Result<DepositReceipt, DepositPoolError> {
        let _guard = self.enter()?;
        self.ensure_latest()?;
        self.ensure_latest_contract(caller, ContractName::NetworkWithdrawal)?;
        self.recycle(caller, RecycleKind::Withdrawn, amount)
    }

    #[instrument(skip_all)]
    fn assign_deposits(&self) -> Result<AssignmentReport, DepositPoolError> {
        let _guard = self.enter()?;
        self.ensure_latest()?;

        let settings = self.ports.settings.snapshot()?;
        if let Err(rejection) = check_assignments_enabled(&settings) {
            warn!("assignment rejected: assignments disabled");
            return Err(rejection);
        }

        let now = self.ports.clock.now();
        let mut uow = UnitOfWork::begin();
        let result = self.run_assignments(&mut uow, &settings, now);
        let report = self.finish(uow, result)?;

        self.record_assignment(Some(&report));
        info!(
            assigned = report.count(),
            total = %report.total_assigned(),
            stop = ?report.stop,
            "assignment run complete"
        );
        Ok(report)
    }

    #[instrument(skip_all, fields(caller = %caller, amount = %amount))]
    fn withdraw_excess_balance(
        &self,
        caller: Address,
        amount: U256,
    ) -> Result<ExcessWithdrawalReceipt, DepositPoolError> {
        let _guard = self.enter()?;
        self.ensure_latest()?;
        self.ensure_latest_contract(caller, ContractName::ClaimToken)?;

        let available = self.current_excess()?;
        if let Err(rejection) = check_excess_withdrawal(amount, available) {
            warn!(%available, "excess withdrawal rejected");
            return Err(rejection);
        }

        let now = self.ports.clock.now();
        let mut uow = UnitOfWork::begin();
        let correlation_id = uow.correlation_id();

        let pool = self.config.pool_address;
        let result = self
            .ports
            .vault
            .withdraw_ether(pool, amount)
            .and_then(|()| {
                uow.record(Compensation::ReturnToVault { amount });
                self.ports.token.deposit_excess(amount)
            })
            .map(|()| {
                uow.emit(DepositPoolEvent::ExcessWithdrawn {
                    recipient: caller,
                    amount,
                    time: now,
                });
            })
            .map_err(DepositPoolError::from);
        self.finish(uow, result)?;

        self.stats.write().excess_withdrawals += 1;
        info!("excess balance withdrawn");

        Ok(ExcessWithdrawalReceipt {
            correlation_id,
            amount,
            remaining_excess: available - amount,
        })
    }

    fn receive_vault_withdrawal(
        &self,
        caller: Address,
        amount: U256,
    ) -> Result<(), DepositPoolError> {
        let _lock = self.operation.lock();
        self.ensure_latest()?;
        self.ensure_latest_contract(caller, ContractName::Vault)?;
        debug!(%amount, "vault withdrawal received");
        Ok(())
    }
}

/// Service over a fresh `InMemoryNetwork` with default deposit policy.
pub fn create_test_service() -> (DepositPoolService, crate::adapters::InMemoryNetwork) {
    create_test_service_with(DepositSettings::default())
}

/// Service over a fresh `InMemoryNetwork` with the given deposit policy.
pub fn create_test_service_with(
    settings: DepositSettings,
) -> (DepositPoolService, crate::adapters::InMemoryNetwork) {
    let network = crate::adapters::InMemoryNetwork::with_settings(settings);
    let service = DepositPoolService::with_validated_config(
        DepositPoolConfig::for_pool(network.pool_address),
        network.collaborators(),
    );
    (service, network)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::units::{ether, milliether};

    #[test]
    fn test_new_rejects_invalid_config() {
        let (_, network) = create_test_service();
        let result = DepositPoolService::new(DepositPoolConfig::default(), network.collaborators());
        assert!(matches!(result, Err(ConfigError::ZeroPoolAddress)));
    }

    #[test]
    fn test_deposit_mints_and_holds() {
        let (service, network) = create_test_service();
        let alice = Address::repeat(0x01);

        let receipt = service.deposit(alice, milliether(20)).unwrap();
        assert_eq!(receipt.minted, milliether(20));
        assert_eq!(service.get_balance().unwrap(), milliether(20));
        assert_eq!(network.token.balance_of(&alice), milliether(20));
        assert_eq!(network.notifier.len(), 1);
        assert_eq!(service.stats().deposits_accepted, 1);
    }

    #[test]
    fn test_rejection_counts_and_publishes_nothing() {
        let (service, network) = create_test_service();
        let result = service.deposit(Address::repeat(0x01), milliether(5));
        assert!(matches!(result, Err(DepositPoolError::BelowMinimumDeposit { .. })));
        assert_eq!(service.stats().deposits_rejected, 1);
        assert!(network.notifier.is_empty());
    }

    #[test]
    fn test_guard_released_after_failure() {
        let (service, _network) = create_test_service();
        assert!(service.deposit(Address::repeat(0x01), U256::zero()).is_err());
        // A failed call must not leave the in-progress marker set.
        service.deposit(Address::repeat(0x01), ether(1)).unwrap();
    }

    #[test]
    fn test_failed_mint_leaves_nothing_behind() {
        let (service, network) = create_test_service();
        network.token.set_fail_mints(true);

        let result = service.deposit(Address::repeat(0x01), ether(1));
        assert!(matches!(result, Err(DepositPoolError::Collaborator(_))));
        assert_eq!(service.get_balance().unwrap(), U256::zero());
        // Nothing was applied, so nothing was rolled back.
        assert_eq!(service.stats().rollbacks, 0);
    }

    #[test]
    fn test_superseded_pool_rejects_mutations() {
        let (service, network) = create_test_service();
        network
            .registry
            .set_contract(ContractName::DepositPool, Address::repeat(0xEE));

        assert!(matches!(
            service.deposit(Address::repeat(0x01), ether(1)),
            Err(DepositPoolError::NotLatestContract { .. })
        ));
        // Reads stay available.
        assert!(service.get_balance().is_ok());
    }
}
