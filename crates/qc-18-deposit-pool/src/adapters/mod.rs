//! # Adapters Layer
//!
//! In-memory implementations of the outbound ports, plus notification sinks.
//!
//! | Adapter | Port |
//! |---------|------|
//! | `InMemoryRegistry` | `ContractRegistry` |
//! | `InMemoryVault` | `Vault` |
//! | `InMemoryClaimToken` | `ClaimToken` |
//! | `InMemoryMinipoolQueue` | `MinipoolQueue` |
//! | `InMemoryMinipools` | `MinipoolGateway` |
//! | `StaticDepositSettings` | `DepositSettingsProvider` |
//! | `BroadcastNotifier` / `RecordingNotifier` / `NoOpNotifier` | `NotificationSink` |
//! | `FixedTimeSource` | `TimeSource` |
//!
//! `InMemoryNetwork` wires them all together.

pub mod claim_token;
pub mod clock;
pub mod minipool_queue;
pub mod minipools;
pub mod network;
pub mod notifier;
pub mod registry;
pub mod settings;
pub mod vault;

pub use claim_token::InMemoryClaimToken;
pub use clock::FixedTimeSource;
pub use minipool_queue::{InMemoryMinipoolQueue, QueuedMinipool};
pub use minipools::InMemoryMinipools;
pub use network::{addresses, InMemoryNetwork, GENESIS_TIME};
pub use notifier::{BroadcastNotifier, NoOpNotifier, RecordingNotifier};
pub use registry::InMemoryRegistry;
pub use settings::StaticDepositSettings;
pub use vault::InMemoryVault;
