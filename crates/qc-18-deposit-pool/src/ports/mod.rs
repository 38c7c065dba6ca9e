//! Ports layer for the Deposit Pool subsystem.
//!
//! Defines the hexagonal architecture port traits:
//! - Inbound (Driving) ports: API exposed to contributors and collaborators
//! - Outbound (Driven) ports: the vault, token, queue, minipools, policy and registry

pub mod inbound;
pub mod outbound;

pub use inbound::*;
pub use outbound::*;
