//! # Value Objects
//!
//! Immutable domain primitives for the deposit pool.
//! These types represent concepts that are defined by their value, not identity.

use serde::{Deserialize, Serialize};
use std::fmt;

// Re-export U256 from primitive-types for 256-bit wei amounts
pub use primitive_types::U256;

/// Seconds since the Unix epoch.
pub type Timestamp = u64;

// =============================================================================
// ADDRESS (20 bytes)
// =============================================================================

/// A 20-byte account or contract address.
///
/// Every identity the pool deals with (contributors, minipools, collaborator
/// contracts, the pool itself) is an `Address`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct Address(pub [u8; 20]);

impl Address {
    /// The zero address (0x0000...0000).
    pub const ZERO: Self = Self([0u8; 20]);

    /// Creates an address from a 20-byte array.
    #[must_use]
    pub const fn new(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    /// Creates an address whose bytes are all `byte`.
    ///
    /// Handy for fixtures: `Address::repeat(0xAA)`.
    #[must_use]
    pub const fn repeat(byte: u8) -> Self {
        Self([byte; 20])
    }

    /// Creates an address from a slice. Returns None if wrong length.
    #[must_use]
    pub fn from_slice(slice: &[u8]) -> Option<Self> {
        if slice.len() == 20 {
            let mut bytes = [0u8; 20];
            bytes.copy_from_slice(slice);
            Some(Self(bytes))
        } else {
            None
        }
    }

    /// Returns the underlying bytes.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// Returns true if this is the zero address.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 20]
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x")?;
        for byte in &self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x")?;
        for byte in &self.0[..4] {
            write!(f, "{byte:02x}")?;
        }
        write!(f, "...")?;
        for byte in &self.0[18..] {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

impl From<[u8; 20]> for Address {
    fn from(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }
}

impl From<Address> for [u8; 20] {
    fn from(addr: Address) -> Self {
        addr.0
    }
}

// =============================================================================
// CONTRACT NAMES
// =============================================================================

/// Names under which collaborators are registered in the contract registry.
///
/// The registry maps each name to the address of its current authoritative
/// implementation. Upgrading a collaborator means re-pointing its name.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ContractName {
    /// This subsystem.
    DepositPool,
    /// Custodial ledger holding all pooled ETH.
    Vault,
    /// Claim token minted to contributors.
    ClaimToken,
    /// Capacity-ordered queue of minipools awaiting capital.
    MinipoolQueue,
    /// Deposit policy provider.
    DepositSettings,
    /// Collaborator that returns capital from withdrawn minipools.
    NetworkWithdrawal,
}

impl ContractName {
    /// All registry names, in declaration order.
    pub const ALL: [Self; 6] = [
        Self::DepositPool,
        Self::Vault,
        Self::ClaimToken,
        Self::MinipoolQueue,
        Self::DepositSettings,
        Self::NetworkWithdrawal,
    ];

    /// Registry key for this contract.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::DepositPool => "rocketDepositPool",
            Self::Vault => "rocketVault",
            Self::ClaimToken => "rocketTokenRETH",
            Self::MinipoolQueue => "rocketMinipoolQueue",
            Self::DepositSettings => "rocketDAOProtocolSettingsDeposit",
            Self::NetworkWithdrawal => "rocketNetworkWithdrawal",
        }
    }
}

impl fmt::Display for ContractName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// UNITS
// =============================================================================

/// Wei denominations.
pub mod units {
    use super::U256;

    /// Wei per ether (1e18).
    pub const WEI_PER_ETHER: u64 = 1_000_000_000_000_000_000;

    /// Wei per milliether (1e15).
    pub const WEI_PER_MILLIETHER: u64 = 1_000_000_000_000_000;

    /// `value` ether expressed in wei.
    #[must_use]
    pub fn ether(value: u64) -> U256 {
        U256::from(value) * U256::from(WEI_PER_ETHER)
    }

    /// `value` milliether (0.001 ETH) expressed in wei.
    #[must_use]
    pub fn milliether(value: u64) -> U256 {
        U256::from(value) * U256::from(WEI_PER_MILLIETHER)
    }
}

// =============================================================================
// TESTS
// =============================================================================
