//! # QC-18 Deposit Pool - Pooled Deposit Intake Subsystem
//!
//! **Subsystem ID:** 18  
//! **Status:** Production-Ready
//!
//! ## Purpose
//!
//! Accepts pooled ETH contributions, mints claim units representing a share of
//! pooled value, and assigns idle capital to queued minipools as they become
//! ready to receive it. Surplus beyond queued demand can be released to the
//! claim token as collateral.
//!
//! ## Domain Invariants
//!
//! | Invariant | Enforcement Location |
//! |-----------|---------------------|
//! | Balance is always derived from the vault | `service.rs` - `pool_balance()` |
//! | Excess never negative | `domain/invariants.rs` - `excess_balance()` |
//! | Deposit checks in fixed order | `domain/invariants.rs` - `check_deposit()` |
//! | At most N assignments per call | `service.rs` - `run_assignments()` |
//! | All-or-nothing operations | `domain/unit_of_work.rs`, `service.rs` - `finish()` |
//! | No reentrant mutation | `service.rs` - `enter()` |
//!
//! ## Assignment Loop
//!
//! ```text
//! for i in 0..maximum_deposit_assignments:
//!     capacity = queue.next_capacity()      ── 0 ──→ stop (QueueEmpty)
//!     balance  = vault.balance_of(pool)     ── < capacity ──→ stop (InsufficientBalance)
//!     minipool = queue.dequeue_minipool()
//!     vault.withdraw_ether(pool, capacity)
//!     minipools.user_deposit(minipool, capacity)
//!     emit DepositAssigned
//! ```
//!
//! ## Security
//!
//! Every mutating entry point requires this pool to be the registry's latest
//! `rocketDepositPool`.
//!
//! | Operation | Authorized Caller |
//! |-----------|-------------------|
//! | `get_balance`, `get_excess_balance` | Anyone |
//! | `deposit`, `assign_deposits` | Anyone |
//! | `recycle_dissolved_deposit` | Registered minipools |
//! | `recycle_withdrawn_deposit` | Latest `rocketNetworkWithdrawal` |
//! | `withdraw_excess_balance` | Latest `rocketTokenRETH` |
//! | `receive_vault_withdrawal` | Latest `rocketVault` |
//!
//! ## Module Structure (Hexagonal Architecture)
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      OUTER LAYER                                │
//! │  adapters/ - In-memory collaborators, notification sinks        │
//! │  service.rs - DepositPoolService (implements DepositPoolApi)    │
//! └─────────────────────────────────────────────────────────────────┘
//!                          ↑ implements ↑
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      MIDDLE LAYER                               │
//! │  ports/inbound.rs  - DepositPoolApi trait                       │
//! │  ports/outbound.rs - Vault, ClaimToken, MinipoolQueue, ...      │
//! └─────────────────────────────────────────────────────────────────┘
//!                          ↑ uses ↑
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      INNER LAYER                                │
//! │  domain/entities.rs      - DepositSettings, events, receipts    │
//! │  domain/invariants.rs    - policy checks, excess arithmetic     │
//! │  domain/unit_of_work.rs  - compensation journal                 │
//! │  domain/value_objects.rs - Address, ContractName, units         │
//! │  domain/errors.rs        - DepositPoolError, CollaboratorError  │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage Example
//!
//! ```
//! use qc_18_deposit_pool::prelude::*;
//!
//! let (pool, network) = create_test_service();
//! network.queue_minipool(Address::repeat(0x11), units::ether(16));
//!
//! let receipt = pool.deposit(Address::repeat(0x01), units::ether(20)).unwrap();
//! assert_eq!(receipt.assignment.map(|r| r.count()), Some(1));
//! assert_eq!(pool.get_balance().unwrap(), units::ether(4));
//! ```

// Crate-level lints
#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

// =============================================================================
// MODULES
// =============================================================================

pub mod adapters;
pub mod config;
pub mod domain;
pub mod ports;
pub mod service;

// =============================================================================
// PRELUDE
// =============================================================================

/// Convenient re-exports for common usage.
pub mod prelude {
    // Domain
    pub use crate::domain::entities::{
        topics, Assignment, AssignmentReport, AssignmentStop, DepositPoolEvent, DepositReceipt,
        DepositSettings, EventRecord, ExcessWithdrawalReceipt, RecycleKind,
    };
    pub use crate::domain::errors::{AccessRole, CollaboratorError, DepositPoolError};
    pub use crate::domain::value_objects::{units, Address, ContractName, Timestamp, U256};

    // Ports
    pub use crate::ports::inbound::DepositPoolApi;
    pub use crate::ports::outbound::{
        ClaimToken, ContractRegistry, DepositSettingsProvider, MinipoolGateway, MinipoolQueue,
        NotificationSink, SystemTimeSource, TimeSource, Vault,
    };

    // Adapters
    pub use crate::adapters::{
        BroadcastNotifier, InMemoryNetwork, NoOpNotifier, RecordingNotifier,
        StaticDepositSettings,
    };

    // Configuration
    pub use crate::config::{ConfigError, DepositPoolConfig};

    // Service
    pub use crate::service::{
        create_test_service, create_test_service_with, Collaborators, DepositPoolService,
        ServiceStats,
    };
}

// =============================================================================
// CRATE INFO
// =============================================================================

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Subsystem ID for IPC.
pub const SUBSYSTEM_ID: u8 = 18;

/// Subsystem name.
pub const SUBSYSTEM_NAME: &str = "Deposit Pool";

// =============================================================================
// TESTS
// =============================================================================
